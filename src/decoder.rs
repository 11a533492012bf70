//! Govee advertisement decoding.
//!
//! Govee thermo-hygrometers broadcast their current reading in the
//! manufacturer-specific data of every advertisement. The payload packs
//! temperature and humidity into a single 24-bit big-endian integer followed by
//! a battery byte; models differ only in where that block starts.
//!
//! Models are recognised by the prefix of the advertised local name. The
//! [`DEVICE_MODELS`] table is scanned in order and the first matching prefix
//! wins, so a more specific prefix must be registered before a shorter one it
//! extends.

use crate::advertisement::Advertisement;
use crate::reading::Reading;
use thiserror::Error;

/// Reasons an advertisement produced no reading.
///
/// None of these are failures of the bridge: most advertisements in range come
/// from devices that are not Govee sensors at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no manufacturer data")]
    MissingManufacturerData,
    #[error("no local name")]
    MissingName,
    #[error("unsupported device '{0}'")]
    UnknownModel(String),
    #[error("{model}: manufacturer data too short ({actual} bytes, need {needed})")]
    TooShort {
        model: &'static str,
        needed: usize,
        actual: usize,
    },
}

/// Byte positions of the reading inside the manufacturer data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Offset of the 3-byte packed temperature/humidity value
    pub packed_offset: usize,
    /// Offset of the battery byte
    pub battery_offset: usize,
}

impl Layout {
    /// Number of bytes the manufacturer data must hold to cover every field.
    pub const fn required_len(&self) -> usize {
        let packed_end = self.packed_offset + 3;
        let battery_end = self.battery_offset + 1;
        if packed_end > battery_end {
            packed_end
        } else {
            battery_end
        }
    }

    /// Decode the fields at this layout's offsets, or `None` if `data` is too short.
    fn read(&self, data: &[u8]) -> Option<(f64, f64, f64)> {
        let packed = data.get(self.packed_offset..self.packed_offset + 3)?;
        let battery = *data.get(self.battery_offset)?;

        let value = u32::from_be_bytes([0, packed[0], packed[1], packed[2]]);
        let temperature = f64::from(value) / 10000.0;
        let humidity = f64::from(value % 1000) / 10.0;
        let battery = f64::from(battery) / 100.0;

        Some((temperature, humidity, battery))
    }
}

/// A supported sensor model, identified by its local-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceModel {
    pub prefix: &'static str,
    pub layout: Layout,
}

/// Supported models, in match order.
pub const DEVICE_MODELS: &[DeviceModel] = &[
    DeviceModel {
        prefix: "GVH5075",
        layout: Layout {
            packed_offset: 3,
            battery_offset: 6,
        },
    },
    DeviceModel {
        prefix: "GVH5104",
        layout: Layout {
            packed_offset: 4,
            battery_offset: 7,
        },
    },
];

/// Find the first model in `models` whose prefix starts `local_name`.
pub fn match_model<'a>(models: &'a [DeviceModel], local_name: &str) -> Option<&'a DeviceModel> {
    models.iter().find(|m| local_name.starts_with(m.prefix))
}

/// Decode an advertisement against the built-in model table.
///
/// Returns `None` for anything that is not a complete reading from a supported
/// model. Use [`try_decode`] to find out why.
pub fn decode(advertisement: &Advertisement) -> Option<Reading> {
    try_decode(advertisement).ok()
}

/// Decode an advertisement, reporting the reason when no reading is produced.
pub fn try_decode(advertisement: &Advertisement) -> Result<Reading, DecodeError> {
    decode_with(DEVICE_MODELS, advertisement)
}

/// Decode an advertisement against an explicit model table.
pub fn decode_with(
    models: &[DeviceModel],
    advertisement: &Advertisement,
) -> Result<Reading, DecodeError> {
    let data = advertisement
        .manufacturer_data
        .as_deref()
        .ok_or(DecodeError::MissingManufacturerData)?;
    let name = advertisement
        .local_name
        .as_deref()
        .ok_or(DecodeError::MissingName)?;

    let model =
        match_model(models, name).ok_or_else(|| DecodeError::UnknownModel(name.to_string()))?;

    let (temperature, humidity, battery) =
        model.layout.read(data).ok_or(DecodeError::TooShort {
            model: model.prefix,
            needed: model.layout.required_len(),
            actual: data.len(),
        })?;

    Ok(Reading {
        address: advertisement.address,
        device_name: name.to_string(),
        temperature,
        humidity,
        battery,
    })
}
