//! Friendly names for sensor addresses.
//!
//! Topics normally carry the sensor address. An alias table maps addresses to
//! names like `Bedroom` so topics read `govee/Bedroom/temperature` instead.

use crate::mac_address::MacAddress;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Address-to-name lookup table, keyed by the textual address.
pub type AliasMap = BTreeMap<String, String>;

/// A parsed alias mapping an address to a human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The address (e.g., "A4:C1:38:12:34:56")
    pub address: String,
    /// The human-readable name (e.g., "Bedroom")
    pub name: String,
}

/// Parse an alias from a string in the format "MAC=NAME".
///
/// # Example
/// ```
/// use govee_mqtt_bridge::alias::parse_alias;
///
/// let alias = parse_alias("A4:C1:38:12:34:56=Bedroom").unwrap();
/// assert_eq!(alias.address, "A4:C1:38:12:34:56");
/// assert_eq!(alias.name, "Bedroom");
/// ```
pub fn parse_alias(src: &str) -> Result<Alias, String> {
    src.split_once('=')
        .map(|(address, name)| Alias {
            address: address.into(),
            name: name.into(),
        })
        .ok_or_else(|| format!("invalid alias '{src}': expected format MAC=NAME"))
}

/// Parse a semicolon-separated alias table such as `AA:..:01=Kitchen;AA:..:02=Attic`.
///
/// Empty entries are skipped, so trailing separators and an empty table are fine.
pub fn parse_alias_list(src: &str) -> Result<Vec<Alias>, String> {
    src.split(';')
        .filter(|entry| !entry.is_empty())
        .map(parse_alias)
        .collect()
}

/// Convert a slice of Alias values into an AliasMap. Later entries win.
///
/// Addresses that parse as a MAC are stored in canonical uppercase form so
/// `a4:c1:38:...` in the configuration still matches.
pub fn to_map(aliases: &[Alias]) -> AliasMap {
    aliases
        .iter()
        .map(|a| {
            let key = a
                .address
                .parse::<MacAddress>()
                .map_or_else(|_| a.address.clone(), |mac| mac.to_string());
            (key, a.name.clone())
        })
        .collect()
}

/// Parse a semicolon-separated alias table straight into an [`AliasMap`].
pub fn parse_alias_table(src: &str) -> Result<AliasMap, String> {
    parse_alias_list(src).map(|aliases| to_map(&aliases))
}

/// Resolve the display name for `address`, falling back to the address itself.
pub fn resolve_name<'a>(address: &MacAddress, aliases: &'a AliasMap) -> Cow<'a, str> {
    match aliases.get(&address.to_string()) {
        Some(name) => Cow::Borrowed(name.as_str()),
        None => Cow::Owned(address.to_string()),
    }
}
