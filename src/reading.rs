//! Decoded Govee sensor reading.

use crate::mac_address::MacAddress;

/// One reading decoded from a Govee advertisement.
///
/// Values are passed through exactly as the packed wire format yields them;
/// nothing is clamped or range-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Address of the sensor that sent the advertisement
    pub address: MacAddress,
    /// The advertised local name the model was matched on (e.g. `GVH5075_1A2B`)
    pub device_name: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Battery level, raw byte divided by 100
    pub battery: f64,
}
