// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light commands sent to the bridge.

use serde::Serialize;

use super::LightState;

/// A partial state update for a single light.
///
/// Serializes to the bridge's native lowercase field names for the
/// `PUT /api/{username}/lights/{id}/state` endpoint. Fields left at `None`
/// are omitted, so the light keeps its current value for them (merge
/// semantics, not replace).
///
/// # Examples
///
/// ```
/// use hue2mqtt::LightCommand;
///
/// let cmd = LightCommand::default().with_on(true);
/// assert_eq!(serde_json::to_string(&cmd).unwrap(), r#"{"on":true}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightCommand {
    /// Switch the light on or off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,

    /// Alert effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,

    /// Brightness (1-254).
    #[serde(rename = "bri", skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,

    /// CIE xy color coordinates.
    #[serde(rename = "xy", skip_serializing_if = "Option::is_none")]
    pub color_coordinates: Option<[f64; 2]>,

    /// Mired color temperature.
    #[serde(rename = "ct", skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u16>,

    /// Dynamic effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Hue (0-65535).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,

    /// Saturation (0-254).
    #[serde(rename = "sat", skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u8>,

    /// Transition time in 100 ms steps.
    #[serde(rename = "transitiontime", skip_serializing_if = "Option::is_none")]
    pub transition_time: Option<u16>,
}

impl LightCommand {
    /// Builds a command from a (possibly partial) light state.
    ///
    /// Copies the settable fields; read-only fields of the state
    /// (reachability, mode, color mode) have no command counterpart.
    #[must_use]
    pub fn from_state(state: &LightState) -> Self {
        Self {
            on: state.on,
            alert: state.alert.clone(),
            brightness: state.brightness,
            color_coordinates: state.color_coordinates,
            color_temperature: state.color_temperature,
            effect: state.effect.clone(),
            hue: state.hue,
            saturation: state.saturation,
            transition_time: state.transition_time,
        }
    }

    /// Sets the on/off field.
    #[must_use]
    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets the brightness field.
    #[must_use]
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_state_copies_settable_fields() {
        let state = LightState {
            on: Some(true),
            alert: Some("select".to_string()),
            brightness: Some(128),
            color_coordinates: Some([0.3, 0.3]),
            color_temperature: Some(366),
            effect: Some("none".to_string()),
            hue: Some(8402),
            saturation: Some(140),
            transition_time: Some(4),
            is_reachable: Some(true),
            mode: Some("homeautomation".to_string()),
            color_mode: Some("ct".to_string()),
        };

        let cmd = LightCommand::from_state(&state);
        assert_eq!(cmd.on, Some(true));
        assert_eq!(cmd.alert.as_deref(), Some("select"));
        assert_eq!(cmd.brightness, Some(128));
        assert_eq!(cmd.color_coordinates, Some([0.3, 0.3]));
        assert_eq!(cmd.color_temperature, Some(366));
        assert_eq!(cmd.effect.as_deref(), Some("none"));
        assert_eq!(cmd.hue, Some(8402));
        assert_eq!(cmd.saturation, Some(140));
        assert_eq!(cmd.transition_time, Some(4));
    }

    #[test]
    fn from_partial_state_leaves_rest_unset() {
        let state = LightState {
            on: Some(true),
            ..LightState::default()
        };
        let cmd = LightCommand::from_state(&state);
        assert_eq!(cmd.on, Some(true));
        assert!(cmd.brightness.is_none());
        assert!(cmd.hue.is_none());
        assert!(cmd.transition_time.is_none());
    }

    #[test]
    fn serializes_to_bridge_field_names() {
        let cmd = LightCommand {
            on: Some(false),
            brightness: Some(200),
            saturation: Some(100),
            transition_time: Some(10),
            ..LightCommand::default()
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"on":false,"bri":200,"sat":100,"transitiontime":10}"#
        );
    }

    #[test]
    fn empty_command() {
        assert!(LightCommand::default().is_empty());
        assert!(!LightCommand::default().with_on(true).is_empty());
    }
}
