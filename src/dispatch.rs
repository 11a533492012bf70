//! Fan a decoded reading out into one publish per attribute.

use crate::alias::{AliasMap, resolve_name};
use crate::publish::{Payload, PublishError, Publisher, QoS};
use crate::reading::Reading;
use crate::topic::TopicTemplate;
use std::borrow::Cow;

/// Which attributes are published for each reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AttributeSet {
    /// `temperature` and `humidity`
    #[default]
    Minimal,
    /// `name`, `temperature`, `humidity` and `battery`
    Full,
}

impl AttributeSet {
    pub fn attributes(self) -> &'static [Attribute] {
        match self {
            AttributeSet::Minimal => &[Attribute::Temperature, Attribute::Humidity],
            AttributeSet::Full => &[
                Attribute::Name,
                Attribute::Temperature,
                Attribute::Humidity,
                Attribute::Battery,
            ],
        }
    }
}

/// What fills the `{device}` placeholder of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TopicKey {
    /// The alias for the address, or the address when there is none
    #[default]
    Name,
    /// Always the raw address
    Address,
}

/// A published attribute of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Name,
    Temperature,
    Humidity,
    Battery,
}

impl Attribute {
    /// Name used in the `{attribute}` placeholder.
    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Temperature => "temperature",
            Attribute::Humidity => "humidity",
            Attribute::Battery => "battery",
        }
    }

    fn payload(self, reading: &Reading) -> Payload {
        match self {
            Attribute::Name => Payload::Text(reading.device_name.clone()),
            Attribute::Temperature => Payload::Number(reading.temperature),
            Attribute::Humidity => Payload::Number(reading.humidity),
            Attribute::Battery => Payload::Number(reading.battery),
        }
    }
}

/// Settings shared by every publish.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub template: TopicTemplate,
    pub aliases: AliasMap,
    pub attributes: AttributeSet,
    pub topic_key: TopicKey,
    pub qos: QoS,
    pub retain: bool,
}

/// Publishes readings through an injected, already-connected client.
pub struct Dispatcher<P> {
    publisher: P,
    config: DispatchConfig,
}

impl<P: Publisher> Dispatcher<P> {
    pub fn new(publisher: P, config: DispatchConfig) -> Self {
        Self { publisher, config }
    }

    /// The identifier that goes into the topic for `reading`.
    pub fn identifier<'a>(&'a self, reading: &Reading) -> Cow<'a, str> {
        match self.config.topic_key {
            TopicKey::Name => resolve_name(&reading.address, &self.config.aliases),
            TopicKey::Address => Cow::Owned(reading.address.to_string()),
        }
    }

    /// Publish every configured attribute of `reading`.
    ///
    /// A rejected publish does not stop the rest of the fan-out; every
    /// attribute is attempted and the first error is returned afterwards.
    pub fn dispatch(&self, reading: &Reading) -> Result<(), PublishError> {
        let identifier = self.identifier(reading);
        let mut first_error = None;

        for attribute in self.config.attributes.attributes() {
            let topic = self.config.template.build(&identifier, attribute.as_str());
            if let Err(error) = self.publisher.publish(
                &topic,
                &attribute.payload(reading),
                self.config.qos,
                self.config.retain,
            ) {
                first_error.get_or_insert(error);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{parse_alias, to_map};
    use crate::test_utils::{RecordingPublisher, TEST_MAC};

    fn reading() -> Reading {
        Reading {
            address: TEST_MAC,
            device_name: "GVH5075_ABCD".to_string(),
            temperature: 23.4567,
            humidity: 56.7,
            battery: 0.55,
        }
    }

    fn config(attributes: AttributeSet, topic_key: TopicKey) -> DispatchConfig {
        DispatchConfig {
            template: TopicTemplate::default(),
            aliases: to_map(&[parse_alias("A4:C1:38:12:34:56=Bedroom").unwrap()]),
            attributes,
            topic_key,
            qos: QoS::AtLeastOnce,
            retain: true,
        }
    }

    #[test]
    fn test_full_set_publishes_four_attributes() {
        let publisher = RecordingPublisher::default();
        let dispatcher = Dispatcher::new(&publisher, config(AttributeSet::Full, TopicKey::Name));

        dispatcher.dispatch(&reading()).unwrap();

        let published = publisher.take();
        let topics: Vec<&str> = published.iter().map(|p| p.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "govee/Bedroom/name",
                "govee/Bedroom/temperature",
                "govee/Bedroom/humidity",
                "govee/Bedroom/battery",
            ]
        );
        assert_eq!(published[0].payload, Payload::Text("GVH5075_ABCD".into()));
        assert_eq!(published[1].payload, Payload::Number(23.4567));
        assert_eq!(published[2].payload, Payload::Number(56.7));
        assert_eq!(published[3].payload, Payload::Number(0.55));
        assert!(published.iter().all(|p| p.qos == QoS::AtLeastOnce && p.retain));
    }

    #[test]
    fn test_minimal_set_publishes_temperature_and_humidity() {
        let publisher = RecordingPublisher::default();
        let dispatcher =
            Dispatcher::new(&publisher, config(AttributeSet::Minimal, TopicKey::Name));

        dispatcher.dispatch(&reading()).unwrap();

        let topics: Vec<String> = publisher.take().into_iter().map(|p| p.topic).collect();
        assert_eq!(
            topics,
            vec!["govee/Bedroom/temperature", "govee/Bedroom/humidity"]
        );
    }

    #[test]
    fn test_alias_with_placeholder_is_not_expanded() {
        let publisher = RecordingPublisher::default();
        let mut config = config(AttributeSet::Minimal, TopicKey::Name);
        config.aliases = to_map(&[parse_alias("A4:C1:38:12:34:56=room-{attribute}").unwrap()]);
        let dispatcher = Dispatcher::new(&publisher, config);

        dispatcher.dispatch(&reading()).unwrap();

        let topics: Vec<String> = publisher.take().into_iter().map(|p| p.topic).collect();
        assert_eq!(
            topics,
            vec![
                "govee/room-{attribute}/temperature",
                "govee/room-{attribute}/humidity",
            ]
        );
    }

    #[test]
    fn test_unknown_address_falls_back_to_raw_address() {
        let publisher = RecordingPublisher::default();
        let mut config = config(AttributeSet::Minimal, TopicKey::Name);
        config.aliases.clear();
        let dispatcher = Dispatcher::new(&publisher, config);

        assert_eq!(dispatcher.identifier(&reading()), "A4:C1:38:12:34:56");
        dispatcher.dispatch(&reading()).unwrap();
        assert_eq!(
            publisher.take()[0].topic,
            "govee/A4:C1:38:12:34:56/temperature"
        );
    }

    #[test]
    fn test_address_key_ignores_aliases() {
        let publisher = RecordingPublisher::default();
        let dispatcher =
            Dispatcher::new(&publisher, config(AttributeSet::Full, TopicKey::Address));

        dispatcher.dispatch(&reading()).unwrap();

        let published = publisher.take();
        assert!(
            published
                .iter()
                .all(|p| p.topic.starts_with("govee/A4:C1:38:12:34:56/"))
        );
        // The name attribute is the advertised name, never the alias.
        assert_eq!(published[0].payload, Payload::Text("GVH5075_ABCD".into()));
    }

    #[test]
    fn test_rejected_attribute_does_not_stop_fan_out() {
        let publisher = RecordingPublisher::rejecting("/temperature");
        let dispatcher =
            Dispatcher::new(&publisher, config(AttributeSet::Full, TopicKey::Name));

        let result = dispatcher.dispatch(&reading());

        assert!(matches!(result, Err(PublishError::Rejected { ref topic, .. }) if topic == "govee/Bedroom/temperature"));
        assert_eq!(
            publisher.attempted(),
            [
                "govee/Bedroom/name",
                "govee/Bedroom/temperature",
                "govee/Bedroom/humidity",
                "govee/Bedroom/battery",
            ]
        );
        let accepted: Vec<String> = publisher.take().into_iter().map(|p| p.topic).collect();
        assert_eq!(
            accepted,
            [
                "govee/Bedroom/name",
                "govee/Bedroom/humidity",
                "govee/Bedroom/battery",
            ]
        );
    }

    #[test]
    fn test_attribute_names() {
        let names: Vec<&str> = AttributeSet::Full
            .attributes()
            .iter()
            .map(|a| a.as_str())
            .collect();
        assert_eq!(names, vec!["name", "temperature", "humidity", "battery"]);
    }
}
