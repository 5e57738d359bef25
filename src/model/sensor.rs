// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor device and its state.
//!
//! Sensor payloads vary wildly between sensor kinds (presence, temperature,
//! switches), so the state keeps its measurement fields opaque and only
//! types the `Lastupdated` timestamp, which is the single field used for
//! change detection.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A sensor known to the Hue bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    /// Stable identifier assigned by the bridge.
    pub id: String,
    /// Current state as last reported by the bridge.
    pub state: SensorState,
}

impl Sensor {
    /// Creates a sensor with the given id and state.
    #[must_use]
    pub fn new(id: impl Into<String>, state: SensorState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }
}

/// State of a sensor.
///
/// `last_updated` is authoritative for change detection: the bridge bumps
/// it whenever the sensor reports, so two states with equal timestamps are
/// considered identical regardless of the measurement fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Timestamp of the last sensor report.
    #[serde(rename = "Lastupdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<SensorTimestamp>,

    /// Sensor-kind specific measurement fields, passed through verbatim.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Timestamp attached to a sensor state.
///
/// The bridge reports either an ISO 8601 datetime without timezone or the
/// literal string `"none"` for sensors that have never reported.
///
/// # Examples
///
/// ```
/// use hue2mqtt::SensorTimestamp;
///
/// let ts: SensorTimestamp = "2024-01-15T10:30:00".parse().unwrap();
/// assert!(ts.datetime().is_some());
///
/// let never: SensorTimestamp = "none".parse().unwrap();
/// assert!(never.datetime().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorTimestamp {
    /// The sensor has never reported.
    Never,
    /// The sensor last reported at this bridge-local time.
    At(NaiveDateTime),
}

impl SensorTimestamp {
    /// Returns the datetime, or `None` for a sensor that never reported.
    #[must_use]
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Never => None,
            Self::At(dt) => Some(*dt),
        }
    }
}

/// Error returned when a sensor timestamp string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorTimestampParseError {
    input: String,
}

impl std::fmt::Display for SensorTimestampParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to parse sensor timestamp: '{}' (expected ISO 8601 or 'none')",
            self.input
        )
    }
}

impl std::error::Error for SensorTimestampParseError {}

impl FromStr for SensorTimestamp {
    type Err = SensorTimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::Never);
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Self::At)
            .map_err(|_| SensorTimestampParseError {
                input: s.to_string(),
            })
    }
}

impl std::fmt::Display for SensorTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => f.write_str("none"),
            Self::At(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl Serialize for SensorTimestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SensorTimestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
