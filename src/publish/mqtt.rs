//! MQTT publisher backed by `rumqttc`.
//!
//! The client handle only queues requests; a background task owns the
//! [`rumqttc::EventLoop`] and keeps polling it, which is what actually talks to
//! the broker and reconnects after failures.

use super::{Payload, PublishError, Publisher, QoS};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

/// Capacity of the client's outgoing request queue.
pub const REQUEST_CHANNEL_CAPACITY: usize = 100;

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: Duration,
}

/// Publishes through a shared `rumqttc` client handle.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Create the client and spawn the task driving its event loop.
    ///
    /// The connection is established lazily by the event loop; publishes made
    /// before it is up are queued.
    pub fn connect(config: &MqttConfig) -> (Self, JoinHandle<()>) {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        let handle = tokio::spawn(drive(eventloop, format!("{}:{}", config.host, config.port)));

        (Self { client }, handle)
    }
}

async fn drive(mut eventloop: EventLoop, broker: String) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!(%broker, "connected to MQTT broker");
            }
            Ok(event) => trace!(?event, "MQTT event"),
            Err(error) => {
                warn!(%broker, %error, "MQTT connection error");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

impl Publisher for MqttPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: &Payload,
        qos: QoS,
        retain: bool,
    ) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, qos.into(), retain, payload.to_string())
            .map_err(|e| PublishError::Rejected {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}
