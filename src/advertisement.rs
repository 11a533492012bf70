//! A single observed BLE advertisement, as handed over by a scanner backend.

use crate::mac_address::MacAddress;

/// Raw advertisement record.
///
/// `manufacturer_data` is the whole manufacturer-specific AD payload, including
/// the two little-endian company identifier bytes at the front. Device layouts
/// in [`crate::decoder`] index into it with those bytes counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Address of the advertising device
    pub address: MacAddress,
    /// Advertised local name (complete or shortened), if any
    pub local_name: Option<String>,
    /// Manufacturer-specific data including the company identifier, if any
    pub manufacturer_data: Option<Vec<u8>>,
}

impl Advertisement {
    pub fn new(address: MacAddress) -> Self {
        Self {
            address,
            local_name: None,
            manufacturer_data: None,
        }
    }

    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = Some(name.into());
        self
    }

    pub fn with_manufacturer_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.manufacturer_data = Some(data.into());
        self
    }

    /// Build the framed manufacturer payload from a company identifier and the
    /// data that follows it, as BlueZ reports them separately.
    pub fn frame_manufacturer_data(company_id: u16, data: &[u8]) -> Vec<u8> {
        let mut framed = Vec::with_capacity(2 + data.len());
        framed.extend_from_slice(&company_id.to_le_bytes());
        framed.extend_from_slice(data);
        framed
    }
}
