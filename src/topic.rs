// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic layout: building outbound topics and parsing inbound ones.
//!
//! Topics follow a fixed positional layout under a configurable root:
//!
//! ```text
//! {root}/{device_type}/{id}/{data_kind}          outbound state
//! {root}/{device_type}/{id}/{data_kind}/{action} inbound command
//! ```
//!
//! An optional environment prefix (e.g. `dev`) is prepended uniformly to
//! every topic; it applies to the publish and subscribe paths alike, since
//! a one-sided prefix would break routing.

use crate::error::ParseError;

/// Kind of device a topic addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// A light.
    Light,
    /// A sensor.
    Sensor,
}

impl DeviceType {
    /// Returns the lowercase topic segment for this device type.
    #[must_use]
    pub fn as_segment(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Sensor => "sensor",
        }
    }

    /// Parses an uppercase-normalized topic segment.
    fn from_segment(segment: &str) -> Result<Self, ParseError> {
        match segment.to_ascii_uppercase().as_str() {
            "LIGHT" => Ok(Self::Light),
            "SENSOR" => Ok(Self::Sensor),
            _ => Err(ParseError::UnknownDeviceType(segment.to_string())),
        }
    }
}

/// Action requested by an inbound command topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicAction {
    /// Apply a partial state update.
    Set,
}

impl TopicAction {
    /// Parses an uppercase-normalized topic segment.
    fn from_segment(segment: &str) -> Result<Self, ParseError> {
        match segment.to_ascii_uppercase().as_str() {
            "SET" => Ok(Self::Set),
            _ => Err(ParseError::UnknownAction(segment.to_string())),
        }
    }
}

/// A parsed inbound command topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandIntent {
    /// The addressed device type.
    pub device_type: DeviceType,
    /// The addressed device id, verbatim from the topic.
    pub id: String,
    /// The data kind segment (currently always `state`).
    pub data_kind: String,
    /// The requested action.
    pub action: TopicAction,
}

/// Handler a command intent resolves to.
///
/// The table is keyed by `(action, device_type)`; adding a device type or
/// action means adding a variant here, not touching the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward the payload as a partial state update for a light.
    SetLightState,
}

impl CommandIntent {
    /// Resolves this intent against the routing table.
    ///
    /// Returns `None` for combinations that are valid topics but have no
    /// handler yet (e.g. `set` on a sensor).
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        match (self.action, self.device_type) {
            (TopicAction::Set, DeviceType::Light) => Some(Route::SetLightState),
            (TopicAction::Set, DeviceType::Sensor) => None,
        }
    }
}

/// Deterministic mapping between domain events and topic strings.
///
/// # Examples
///
/// ```
/// use hue2mqtt::{DeviceType, TopicScheme};
///
/// let scheme = TopicScheme::new("hue", None);
/// assert_eq!(scheme.state_topic(DeviceType::Light, "5"), "hue/light/5/state");
/// assert_eq!(scheme.set_topic("5"), "hue/light/5/state/set");
///
/// let intent = scheme.parse("hue/light/5/state/set").unwrap();
/// assert_eq!(intent.id, "5");
/// ```
#[derive(Debug, Clone)]
pub struct TopicScheme {
    /// Root plus optional environment prefix, without trailing slash.
    base: String,
}

/// Data-kind segment for device state topics.
const DATA_KIND_STATE: &str = "state";

/// Action segment for set-state command topics.
const ACTION_SET: &str = "set";

impl TopicScheme {
    /// Creates a scheme for the given root topic and optional environment
    /// prefix.
    #[must_use]
    pub fn new(root_topic: &str, prefix: Option<&str>) -> Self {
        let base = match prefix {
            Some(p) if !p.is_empty() => format!("{}/{}", p.to_lowercase(), root_topic.to_lowercase()),
            _ => root_topic.to_lowercase(),
        };
        Self { base }
    }

    /// Returns the base under which all topics live.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Builds the state topic for a device.
    #[must_use]
    pub fn state_topic(&self, device_type: DeviceType, id: &str) -> String {
        format!(
            "{}/{}/{}/{DATA_KIND_STATE}",
            self.base,
            device_type.as_segment(),
            id.to_lowercase()
        )
    }

    /// Builds the set-state command topic for a light.
    #[must_use]
    pub fn set_topic(&self, id: &str) -> String {
        format!(
            "{}/{}/{}/{DATA_KIND_STATE}/{ACTION_SET}",
            self.base,
            DeviceType::Light.as_segment(),
            id.to_lowercase()
        )
    }

    /// Parses an inbound command topic.
    ///
    /// The topic must live under this scheme's base and carry exactly the
    /// `{device_type}/{id}/{data_kind}/{action}` segments after it. Segment
    /// values are uppercase-normalized only for matching; the id is kept
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedTopic`] when the topic is outside the
    /// base or has the wrong segment count, and
    /// [`ParseError::UnknownDeviceType`] / [`ParseError::UnknownAction`]
    /// when a segment is outside the routable enumeration.
    pub fn parse(&self, topic: &str) -> Result<CommandIntent, ParseError> {
        let rest = topic
            .strip_prefix(self.base.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| ParseError::MalformedTopic(topic.to_string()))?;

        let segments: Vec<&str> = rest.split('/').collect();
        let [device_type, id, data_kind, action] = segments.as_slice() else {
            return Err(ParseError::MalformedTopic(topic.to_string()));
        };

        Ok(CommandIntent {
            device_type: DeviceType::from_segment(device_type)?,
            id: (*id).to_string(),
            data_kind: (*data_kind).to_string(),
            action: TopicAction::from_segment(action)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_topic_layout() {
        let scheme = TopicScheme::new("hue", None);
        assert_eq!(
            scheme.state_topic(DeviceType::Light, "5"),
            "hue/light/5/state"
        );
        assert_eq!(
            scheme.state_topic(DeviceType::Sensor, "12"),
            "hue/sensor/12/state"
        );
    }

    #[test]
    fn set_topic_layout() {
        let scheme = TopicScheme::new("hue", None);
        assert_eq!(scheme.set_topic("1"), "hue/light/1/state/set");
    }

    #[test]
    fn prefix_applies_to_all_topics() {
        let scheme = TopicScheme::new("hue", Some("dev"));
        assert_eq!(
            scheme.state_topic(DeviceType::Light, "1"),
            "dev/hue/light/1/state"
        );
        assert_eq!(scheme.set_topic("1"), "dev/hue/light/1/state/set");
        assert!(scheme.parse("dev/hue/light/1/state/set").is_ok());
        assert!(scheme.parse("hue/light/1/state/set").is_err());
    }

    #[test]
    fn segments_are_lowercased() {
        let scheme = TopicScheme::new("Hue", None);
        assert_eq!(
            scheme.state_topic(DeviceType::Light, "AB12"),
            "hue/light/ab12/state"
        );
    }

    #[test]
    fn round_trip_recovers_type_and_id() {
        let scheme = TopicScheme::new("hue", None);
        let topic = format!("{}/{ACTION_SET}", scheme.state_topic(DeviceType::Light, "5"));
        let intent = scheme.parse(&topic).unwrap();
        assert_eq!(intent.device_type, DeviceType::Light);
        assert_eq!(intent.id, "5");
        assert_eq!(intent.data_kind, "state");
        assert_eq!(intent.action, TopicAction::Set);
    }

    #[test]
    fn parse_matches_case_insensitively() {
        let scheme = TopicScheme::new("hue", None);
        let intent = scheme.parse("hue/LIGHT/1/state/SET").unwrap();
        assert_eq!(intent.device_type, DeviceType::Light);
        assert_eq!(intent.action, TopicAction::Set);
    }

    #[test]
    fn parse_rejects_short_topics() {
        let scheme = TopicScheme::new("hue", None);
        assert!(matches!(
            scheme.parse("hue/light/1/state"),
            Err(ParseError::MalformedTopic(_))
        ));
        assert!(matches!(
            scheme.parse("hue"),
            Err(ParseError::MalformedTopic(_))
        ));
        assert!(matches!(
            scheme.parse("other/light/1/state/set"),
            Err(ParseError::MalformedTopic(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_segments() {
        let scheme = TopicScheme::new("hue", None);
        assert!(matches!(
            scheme.parse("hue/group/1/state/set"),
            Err(ParseError::UnknownDeviceType(_))
        ));
        assert!(matches!(
            scheme.parse("hue/light/1/state/delete"),
            Err(ParseError::UnknownAction(_))
        ));
    }

    #[test]
    fn multi_segment_root() {
        let scheme = TopicScheme::new("home/hue", None);
        assert_eq!(
            scheme.state_topic(DeviceType::Light, "1"),
            "home/hue/light/1/state"
        );
        let intent = scheme.parse("home/hue/light/1/state/set").unwrap();
        assert_eq!(intent.id, "1");
    }

    #[test]
    fn routing_table() {
        let scheme = TopicScheme::new("hue", None);
        let light = scheme.parse("hue/light/1/state/set").unwrap();
        assert_eq!(light.route(), Some(Route::SetLightState));

        let sensor = scheme.parse("hue/sensor/1/state/set").unwrap();
        assert_eq!(sensor.route(), None);
    }
}
