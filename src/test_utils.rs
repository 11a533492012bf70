use crate::advertisement::Advertisement;
use crate::mac_address::MacAddress;
use crate::publish::{Payload, PublishError, Publisher, QoS};
use std::sync::Mutex;

/// A stable sensor address for unit tests.
pub const TEST_MAC: MacAddress = MacAddress([0xA4, 0xC1, 0x38, 0x12, 0x34, 0x56]);

/// H5075 manufacturer data: company ID 0xEC88, packed 234567 at offset 3, battery 55.
pub fn h5075_payload() -> Vec<u8> {
    vec![0x88, 0xEC, 0x00, 0x03, 0x94, 0x47, 55]
}

/// H5104 manufacturer data: packed 185000 at offset 4, battery 80.
pub fn h5104_payload() -> Vec<u8> {
    vec![0x01, 0x00, 0x01, 0x01, 0x02, 0xD2, 0xA8, 80]
}

/// A complete H5075 advertisement from `mac`.
pub fn h5075_advertisement(mac: MacAddress) -> Advertisement {
    Advertisement::new(mac)
        .with_local_name("GVH5075_ABCD")
        .with_manufacturer_data(h5075_payload())
}

/// One call recorded by [`RecordingPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: Payload,
    pub qos: QoS,
    pub retain: bool,
}

/// A [`Publisher`] that records accepted calls, optionally rejecting topics
/// with a given suffix.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    attempted: Mutex<Vec<String>>,
    reject_suffix: Option<&'static str>,
}

impl RecordingPublisher {
    /// Reject every topic ending in `suffix` and accept the rest.
    pub fn rejecting(suffix: &'static str) -> Self {
        Self {
            reject_suffix: Some(suffix),
            ..Self::default()
        }
    }

    /// Drain the accepted calls.
    pub fn take(&self) -> Vec<Published> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }

    /// Topics of every call, accepted or not, in call order.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: &Payload,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        self.attempted.lock().unwrap().push(topic.to_string());
        if self.reject_suffix.is_some_and(|suffix| topic.ends_with(suffix)) {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                reason: "request queue full".to_string(),
            });
        }
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload: payload.clone(),
            qos,
            retain,
        });
        Ok(())
    }
}
