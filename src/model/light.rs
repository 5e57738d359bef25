// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light device and its state.

use serde::{Deserialize, Serialize};

/// A light known to the Hue bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Stable identifier assigned by the bridge.
    pub id: String,
    /// Current state as last reported by the bridge.
    pub state: LightState,
}

impl Light {
    /// Creates a light with the given id and state.
    #[must_use]
    pub fn new(id: impl Into<String>, state: LightState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }
}

/// State of a light.
///
/// Serializes to the broker payload format. All fields are optional; a
/// field that is `None` is omitted from the payload, which is what gives
/// inbound command payloads their merge semantics.
///
/// # Examples
///
/// ```
/// use hue2mqtt::LightState;
///
/// let state: LightState = serde_json::from_str(r#"{"On":true,"Brightness":128}"#).unwrap();
/// assert_eq!(state.on, Some(true));
/// assert_eq!(state.brightness, Some(128));
/// assert!(state.hue.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    /// Whether the light is on.
    #[serde(rename = "On", skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,

    /// Alert effect (`none`, `select`, `lselect`).
    #[serde(rename = "Alert", skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,

    /// Brightness (1-254).
    #[serde(rename = "Brightness", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,

    /// CIE xy color coordinates.
    #[serde(rename = "ColorCoordinates", skip_serializing_if = "Option::is_none")]
    pub color_coordinates: Option<[f64; 2]>,

    /// Mired color temperature (153-500).
    #[serde(rename = "ColorTemperature", skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u16>,

    /// Dynamic effect (`none`, `colorloop`).
    #[serde(rename = "Effect", skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Hue (0-65535).
    #[serde(rename = "Hue", skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,

    /// Saturation (0-254).
    #[serde(rename = "Saturation", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,

    /// Transition time in 100 ms steps.
    #[serde(rename = "TransitionTime", skip_serializing_if = "Option::is_none")]
    pub transition_time: Option<u16>,

    /// Whether the bridge can currently reach the light. Read-only.
    #[serde(rename = "IsReachable", skip_serializing_if = "Option::is_none")]
    pub is_reachable: Option<bool>,

    /// Device mode reported by the bridge. Read-only.
    #[serde(rename = "Mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Color mode in effect (`hs`, `xy`, `ct`). Read-only.
    #[serde(rename = "ColorMode", skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
}
