//! Publishing readings to a message bus.
//!
//! The [`Publisher`] trait is the seam between the dispatch logic and the
//! MQTT client, so the pipeline can be tested against a recording fake.
//! [`mqtt::MqttPublisher`] is the production implementation.

pub mod mqtt;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// MQTT delivery guarantee for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl FromStr for QoS {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(QoS::AtMostOnce),
            "1" => Ok(QoS::AtLeastOnce),
            "2" => Ok(QoS::ExactlyOnce),
            other => Err(format!("invalid QoS '{other}': expected 0, 1 or 2")),
        }
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// Value carried by a single publish.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Number(f64),
    Text(String),
}

impl fmt::Display for Payload {
    /// Numbers use the shortest round-trip form, keeping one decimal for whole
    /// values (`18.5`, `0.0`). Text is written verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Payload::Number(n) => write!(f, "{n}"),
            Payload::Text(s) => f.write_str(s),
        }
    }
}

/// Errors reported by a publish client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The client refused to queue the message (request queue full or closed)
    #[error("publish to '{topic}' rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

/// A connected message-bus client.
///
/// Implementations must be callable from any task and must not wait for the
/// broker to acknowledge the message.
pub trait Publisher: Send + Sync {
    fn publish(
        &self,
        topic: &str,
        payload: &Payload,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(
        &self,
        topic: &str,
        payload: &Payload,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        (**self).publish(topic, payload, qos, retain)
    }
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn publish(
        &self,
        topic: &str,
        payload: &Payload,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        (**self).publish(topic, payload, qos, retain)
    }
}
