//! `govee-mqtt-bridge` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logging setup and
//! process exit codes. The decode, route and publish pipeline lives here:
//! [`decoder`] turns advertisements into readings, [`dispatch`] fans readings
//! out to topics built by [`topic`], and [`app`] ties it to a scanner.

pub mod advertisement;
pub mod alias;
pub mod app;
pub mod decoder;
pub mod dispatch;
pub mod mac_address;
pub mod publish;
pub mod reading;
pub mod scanner;
pub mod topic;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use advertisement::Advertisement;
pub use alias::{Alias, AliasMap, parse_alias, parse_alias_table, resolve_name, to_map};
pub use decoder::{DEVICE_MODELS, DecodeError, DeviceModel, Layout, decode, try_decode};
pub use dispatch::{AttributeSet, DispatchConfig, Dispatcher, TopicKey};
pub use mac_address::MacAddress;
pub use publish::{Payload, PublishError, Publisher, QoS};
pub use reading::Reading;
pub use scanner::ScanError;
pub use topic::{TopicTemplate, build_topic};
