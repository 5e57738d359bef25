// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change detection between polled device states.
//!
//! Comparing full serialized payloads would flap: the bridge reports some
//! fields (notably the floating-point color coordinates) with jitter that
//! carries no real change. The differ therefore enumerates exactly the
//! fields that constitute a meaningful change.

use crate::model::{LightState, SensorState};

/// Options controlling which fields participate in the light diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Include the CIE xy color coordinates in the comparison.
    ///
    /// Off by default: the coordinates drift between polls without a
    /// genuine state change.
    pub compare_color_coordinates: bool,
}

/// Decides whether a polled state differs meaningfully from its snapshot.
///
/// # Examples
///
/// ```
/// use hue2mqtt::{DiffOptions, LightState, StateDiffer};
///
/// let differ = StateDiffer::new(DiffOptions::default());
/// let previous = LightState { on: Some(false), ..LightState::default() };
/// let current = LightState { on: Some(true), ..LightState::default() };
/// assert!(differ.light_changed(Some(&previous), &current));
/// assert!(!differ.light_changed(Some(&current), &current.clone()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StateDiffer {
    options: DiffOptions,
}

impl StateDiffer {
    /// Creates a differ with the given options.
    #[must_use]
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Returns `true` if the light state changed relative to the snapshot.
    ///
    /// A device with no snapshot entry (newly appeared) always counts as
    /// changed.
    #[must_use]
    pub fn light_changed(&self, previous: Option<&LightState>, current: &LightState) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        !self.light_states_equal(previous, current)
    }

    /// Returns `true` if the sensor state changed relative to the snapshot.
    ///
    /// Sensors use a cheaper check: the bridge bumps `Lastupdated` on
    /// every report, so only the timestamp is compared.
    #[must_use]
    pub fn sensor_changed(&self, previous: Option<&SensorState>, current: &SensorState) -> bool {
        let Some(previous) = previous else {
            return true;
        };
        previous.last_updated != current.last_updated
    }

    fn light_states_equal(&self, a: &LightState, b: &LightState) -> bool {
        a.on == b.on
            && a.alert == b.alert
            && a.brightness == b.brightness
            && a.color_mode == b.color_mode
            && a.color_temperature == b.color_temperature
            && a.effect == b.effect
            && a.hue == b.hue
            && a.is_reachable == b.is_reachable
            && a.mode == b.mode
            && a.saturation == b.saturation
            && a.transition_time == b.transition_time
            && (!self.options.compare_color_coordinates
                || a.color_coordinates == b.color_coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SensorTimestamp;

    fn full_state() -> LightState {
        LightState {
            on: Some(true),
            alert: Some("none".to_string()),
            brightness: Some(254),
            color_coordinates: Some([0.4573, 0.41]),
            color_temperature: Some(366),
            effect: Some("none".to_string()),
            hue: Some(8402),
            saturation: Some(140),
            transition_time: Some(4),
            is_reachable: Some(true),
            mode: Some("homeautomation".to_string()),
            color_mode: Some("ct".to_string()),
        }
    }

    #[test]
    fn identical_states_are_equal() {
        let differ = StateDiffer::default();
        let state = full_state();
        assert!(!differ.light_changed(Some(&state), &state.clone()));
    }

    #[test]
    fn each_compared_field_triggers_change() {
        let differ = StateDiffer::default();
        let base = full_state();

        let variations: Vec<LightState> = vec![
            LightState { on: Some(false), ..base.clone() },
            LightState { alert: Some("select".to_string()), ..base.clone() },
            LightState { brightness: Some(100), ..base.clone() },
            LightState { color_mode: Some("xy".to_string()), ..base.clone() },
            LightState { color_temperature: Some(250), ..base.clone() },
            LightState { effect: Some("colorloop".to_string()), ..base.clone() },
            LightState { hue: Some(0), ..base.clone() },
            LightState { is_reachable: Some(false), ..base.clone() },
            LightState { mode: Some("streaming".to_string()), ..base.clone() },
            LightState { saturation: Some(0), ..base.clone() },
            LightState { transition_time: None, ..base.clone() },
        ];

        for changed in variations {
            assert!(
                differ.light_changed(Some(&base), &changed),
                "expected change for {changed:?}"
            );
        }
    }

    #[test]
    fn color_coordinates_ignored_by_default() {
        let differ = StateDiffer::default();
        let base = full_state();
        let drifted = LightState {
            color_coordinates: Some([0.4574, 0.4101]),
            ..base.clone()
        };
        assert!(!differ.light_changed(Some(&base), &drifted));
    }

    #[test]
    fn color_coordinates_compared_when_enabled() {
        let differ = StateDiffer::new(DiffOptions {
            compare_color_coordinates: true,
        });
        let base = full_state();
        let drifted = LightState {
            color_coordinates: Some([0.4574, 0.4101]),
            ..base.clone()
        };
        assert!(differ.light_changed(Some(&base), &drifted));
        assert!(!differ.light_changed(Some(&base), &base.clone()));
    }

    #[test]
    fn missing_snapshot_entry_is_changed() {
        let differ = StateDiffer::default();
        assert!(differ.light_changed(None, &full_state()));
        assert!(differ.sensor_changed(None, &SensorState::default()));
    }

    #[test]
    fn sensor_compares_timestamp_only() {
        let differ = StateDiffer::default();

        let at = |s: &str| Some(s.parse::<SensorTimestamp>().unwrap());
        let previous = SensorState {
            last_updated: at("2024-01-15T10:30:00"),
            fields: serde_json::from_str(r#"{"presence":false}"#).unwrap(),
        };

        // Same timestamp, different measurement: unchanged.
        let same_time = SensorState {
            last_updated: at("2024-01-15T10:30:00"),
            fields: serde_json::from_str(r#"{"presence":true}"#).unwrap(),
        };
        assert!(!differ.sensor_changed(Some(&previous), &same_time));

        // Newer timestamp, same measurement: changed.
        let newer = SensorState {
            last_updated: at("2024-01-15T10:31:00"),
            fields: previous.fields.clone(),
        };
        assert!(differ.sensor_changed(Some(&previous), &newer));
    }
}
