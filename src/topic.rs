//! MQTT topic templates.
//!
//! A template such as `govee/{device}/{attribute}` is filled in once per
//! published value. Substitution is literal and single-pass, which differs
//! from chaining `replace("{device}", ..).replace("{attribute}", ..)`: there,
//! a device alias containing `{attribute}` would have the attribute name
//! expanded into it as well. Here it is inserted as-is and never rescanned.
//! Whether the result is a legal topic is left to the MQTT client.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder replaced by the device identifier.
pub const DEVICE_PLACEHOLDER: &str = "{device}";
/// Placeholder replaced by the attribute name.
pub const ATTRIBUTE_PLACEHOLDER: &str = "{attribute}";

/// Default topic layout.
pub const DEFAULT_TOPIC_FORMAT: &str = "govee/{device}/{attribute}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicTemplateError {
    #[error("topic template '{template}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },
}

/// A validated topic template containing both placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTemplate(String);

impl TopicTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, TopicTemplateError> {
        let template = template.into();
        for placeholder in [DEVICE_PLACEHOLDER, ATTRIBUTE_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(TopicTemplateError::MissingPlaceholder {
                    template,
                    placeholder,
                });
            }
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the topic for `identifier` and `attribute`.
    pub fn build(&self, identifier: &str, attribute: &str) -> String {
        build_topic(&self.0, identifier, attribute)
    }
}

impl Default for TopicTemplate {
    fn default() -> Self {
        Self(DEFAULT_TOPIC_FORMAT.to_string())
    }
}

impl FromStr for TopicTemplate {
    type Err = TopicTemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TopicTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace every `{device}` in `template` with `identifier` and every
/// `{attribute}` with `attribute`. Everything else is copied unchanged.
pub fn build_topic(template: &str, identifier: &str, attribute: &str) -> String {
    let mut topic = String::with_capacity(template.len() + identifier.len() + attribute.len());
    let mut rest = template;

    loop {
        let device = rest.find(DEVICE_PLACEHOLDER);
        let attr = rest.find(ATTRIBUTE_PLACEHOLDER);

        let (at, placeholder, value) = match (device, attr) {
            (Some(d), Some(a)) if a < d => (a, ATTRIBUTE_PLACEHOLDER, attribute),
            (Some(d), _) => (d, DEVICE_PLACEHOLDER, identifier),
            (None, Some(a)) => (a, ATTRIBUTE_PLACEHOLDER, attribute),
            (None, None) => break,
        };

        topic.push_str(&rest[..at]);
        topic.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }

    topic.push_str(rest);
    topic
}
