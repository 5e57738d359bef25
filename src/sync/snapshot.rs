// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-published device state, used as the diff baseline.

use std::collections::HashMap;

use crate::model::{Light, LightState, Sensor, SensorState};

/// Snapshot of the last-observed state of every device, partitioned by
/// device type.
///
/// The poller replaces the snapshot wholesale after each cycle so that a
/// single poll always produces one atomic before/after pair; individual
/// entries are never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    lights: HashMap<String, LightState>,
    sensors: HashMap<String, SensorState>,
}

impl DeviceSnapshot {
    /// Creates an empty snapshot. Every device diffs as changed against it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from full device listings.
    #[must_use]
    pub fn from_devices(lights: &[Light], sensors: &[Sensor]) -> Self {
        Self {
            lights: lights
                .iter()
                .map(|l| (l.id.clone(), l.state.clone()))
                .collect(),
            sensors: sensors
                .iter()
                .map(|s| (s.id.clone(), s.state.clone()))
                .collect(),
        }
    }

    /// Returns the stored state for a light.
    #[must_use]
    pub fn light(&self, id: &str) -> Option<&LightState> {
        self.lights.get(id)
    }

    /// Returns the stored state for a sensor.
    #[must_use]
    pub fn sensor(&self, id: &str) -> Option<&SensorState> {
        self.sensors.get(id)
    }

    /// Returns the number of lights in the snapshot.
    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Returns the number of sensors in the snapshot.
    #[must_use]
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Returns the light ids present here but absent from `other`.
    pub fn missing_lights<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a str> {
        self.lights
            .keys()
            .filter(|id| !other.lights.contains_key(*id))
            .map(String::as_str)
    }

    /// Returns the sensor ids present here but absent from `other`.
    pub fn missing_sensors<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a str> {
        self.sensors
            .keys()
            .filter(|id| !other.sensors.contains_key(*id))
            .map(String::as_str)
    }
}
