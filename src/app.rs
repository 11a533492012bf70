//! Core application runner (business logic) for `govee-mqtt-bridge`.
//!
//! This module is decoupled from process setup so the scan, decode and publish
//! loop can be driven by a fake scanner and a recording publisher in tests.

use crate::advertisement::Advertisement;
use crate::alias::{Alias, AliasMap};
use crate::decoder;
use crate::dispatch::{AttributeSet, DispatchConfig, Dispatcher, TopicKey};
use crate::publish::mqtt::MqttConfig;
use crate::publish::{Publisher, QoS};
use crate::scanner::ScanError;
use crate::topic::TopicTemplate;
use clap::Parser;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Bridge configuration.
///
/// Every broker and topic setting can also come from the environment, using
/// the same variable names as the container deployment.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// MQTT broker host name or address
    #[arg(long, env = "MQTT_BROKER_ADDRESS", default_value = "localhost")]
    pub broker_address: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_BROKER_PORT", default_value_t = 1883)]
    pub broker_port: u16,

    /// MQTT client identifier
    #[arg(long, env = "MQTT_CLIENT_ID", default_value = "govee-mqtt-bridge")]
    pub client_id: String,

    /// MQTT keep-alive interval in seconds
    #[arg(long, default_value_t = 60)]
    pub keep_alive: u64,

    /// Topic template; {device} and {attribute} are substituted per value
    #[arg(long, env = "MQTT_TOPIC_FORMAT", default_value = crate::topic::DEFAULT_TOPIC_FORMAT)]
    pub topic_format: TopicTemplate,

    /// Quality of service for every publish (0, 1 or 2)
    #[arg(long, env = "MQTT_QOS", default_value = "0")]
    pub qos: QoS,

    /// Retain published values; only the literal `true` enables it
    #[arg(long, env = "MQTT_RETAIN", default_value = "true", value_parser = parse_retain, action = clap::ArgAction::Set)]
    pub retain: bool,

    /// Friendly names as a table.
    /// Format: --names A4:C1:38:12:34:56=Kitchen;A4:C1:38:AA:BB:CC=Attic
    #[arg(long, env = "MAC_NAMES", value_parser = crate::alias::parse_alias_table)]
    pub names: Option<AliasMap>,

    /// Specify a friendly name for one sensor; overrides --names.
    /// Format: --alias A4:C1:38:12:34:56=Kitchen
    #[arg(long = "alias", value_parser = crate::alias::parse_alias, value_name = "ALIAS")]
    pub aliases: Vec<Alias>,

    /// Attributes published for each reading
    #[arg(long, env = "GOVEE_ATTRIBUTES", default_value_t, value_enum)]
    pub attributes: AttributeSet,

    /// What identifies a sensor in topics
    #[arg(long, env = "GOVEE_TOPIC_KEY", default_value_t, value_enum)]
    pub topic_key: TopicKey,

    /// Verbose output, log why advertisements were skipped
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

fn parse_retain(src: &str) -> Result<bool, String> {
    Ok(src == "true")
}

impl Options {
    /// Broker connection settings.
    pub fn mqtt_config(&self) -> MqttConfig {
        MqttConfig {
            host: self.broker_address.clone(),
            port: self.broker_port,
            client_id: self.client_id.clone(),
            keep_alive: Duration::from_secs(self.keep_alive),
        }
    }

    /// Dispatch settings, with `--alias` entries layered over `--names`.
    pub fn dispatch_config(&self) -> DispatchConfig {
        let mut aliases = self.names.clone().unwrap_or_default();
        aliases.extend(crate::alias::to_map(&self.aliases));

        DispatchConfig {
            template: self.topic_format.clone(),
            aliases,
            attributes: self.attributes,
            topic_key: self.topic_key,
            qos: self.qos,
            retain: self.retain,
        }
    }

    /// Log the effective configuration once at startup.
    pub fn log_settings(&self) {
        info!(
            broker = %format!("{}:{}", self.broker_address, self.broker_port),
            client_id = %self.client_id,
            topic_format = %self.topic_format,
            qos = %self.qos,
            retain = self.retain,
            attributes = ?self.attributes,
            topic_key = ?self.topic_key,
            "starting bridge"
        );
        let aliases = self.dispatch_config().aliases;
        for (address, name) in &aliases {
            info!(%address, %name, "alias");
        }
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Scanner abstraction to enable deterministic unit tests without Bluetooth hardware.
pub trait Scanner: Send + Sync {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>;
}

/// Real scanner implementation that delegates to the compiled-in backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealScanner;

impl Scanner for RealScanner {
    fn start_scan(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>
    {
        Box::pin(crate::scanner::start_scan())
    }
}

/// Handle one advertisement: decode it and, if it is a reading, publish it.
///
/// Publish failures are logged and swallowed so the scan loop keeps running.
pub fn on_advertisement<P: Publisher>(
    dispatcher: &Dispatcher<P>,
    advertisement: &Advertisement,
    verbose: bool,
) {
    match decoder::try_decode(advertisement) {
        Ok(reading) => {
            debug!(
                address = %reading.address,
                name = %reading.device_name,
                temperature = reading.temperature,
                humidity = reading.humidity,
                battery = reading.battery,
                "reading"
            );
            if let Err(error) = dispatcher.dispatch(&reading) {
                warn!(%error, "failed to publish reading");
            }
        }
        Err(reason) => {
            if verbose {
                debug!(address = %advertisement.address, %reason, "skipped advertisement");
            }
        }
    }
}

/// Run the bridge until the scanner stops delivering advertisements.
pub async fn run<P: Publisher>(
    scanner: &dyn Scanner,
    dispatcher: &Dispatcher<P>,
    verbose: bool,
) -> Result<(), RunError> {
    let mut advertisements = scanner.start_scan().await?;

    while let Some(advertisement) = advertisements.recv().await {
        on_advertisement(dispatcher, &advertisement, verbose);
    }

    Ok(())
}
