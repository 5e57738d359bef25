// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling of the bridge and change detection.

use std::sync::Arc;

use crate::bridge::BridgeClient;
use crate::error::ProtocolError;
use crate::model::{Light, Sensor};
use crate::topic::DeviceType;

use super::{DeviceSnapshot, StateDiffer};

/// A device whose state changed since the last poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceUpdate {
    /// A light changed.
    Light(Light),
    /// A sensor changed.
    Sensor(Sensor),
}

impl DeviceUpdate {
    /// Returns the device type of this update.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Light(_) => DeviceType::Light,
            Self::Sensor(_) => DeviceType::Sensor,
        }
    }

    /// Returns the device id of this update.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Light(light) => &light.id,
            Self::Sensor(sensor) => &sensor.id,
        }
    }

    /// Serializes the new state to the broker payload format.
    ///
    /// # Errors
    ///
    /// Returns error if the state cannot be serialized.
    pub fn payload(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Light(light) => serde_json::to_string(&light.state),
            Self::Sensor(sensor) => serde_json::to_string(&sensor.state),
        }
    }
}

/// Polls the bridge and emits an update per meaningfully changed device.
///
/// The poller is the sole owner of the [`DeviceSnapshot`]; cycles are
/// serialized by construction because [`poll`](Self::poll) takes `&mut
/// self` and the caller awaits each cycle before starting the next. A
/// slow fetch therefore delays subsequent ticks instead of overlapping
/// them.
pub struct BridgePoller<C> {
    client: Arc<C>,
    differ: StateDiffer,
    snapshot: DeviceSnapshot,
}

impl<C: BridgeClient> BridgePoller<C> {
    /// Creates a poller with an empty snapshot.
    ///
    /// The first cycle reports every device as changed.
    #[must_use]
    pub fn new(client: Arc<C>, differ: StateDiffer) -> Self {
        Self {
            client,
            differ,
            snapshot: DeviceSnapshot::new(),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &DeviceSnapshot {
        &self.snapshot
    }

    /// Runs the initial full fetch, propagating failures.
    ///
    /// Used at engine start so that a bridge that is down at startup
    /// surfaces as an error while the caller can still react to it.
    ///
    /// # Errors
    ///
    /// Returns error if either device listing cannot be fetched.
    pub async fn initial(&mut self) -> Result<Vec<DeviceUpdate>, ProtocolError> {
        self.cycle().await
    }

    /// Runs one poll cycle.
    ///
    /// A failed fetch skips the cycle: the snapshot is retained, no
    /// updates are emitted, and the next tick polls again.
    pub async fn poll(&mut self) -> Vec<DeviceUpdate> {
        match self.cycle().await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "Poll cycle failed, keeping previous snapshot");
                Vec::new()
            }
        }
    }

    /// Fetches both device listings, diffs them against the snapshot, and
    /// replaces the snapshot wholesale.
    async fn cycle(&mut self) -> Result<Vec<DeviceUpdate>, ProtocolError> {
        let sensors = self.client.list_sensors().await?;
        let lights = self.client.list_lights().await?;

        let mut updates = Vec::new();
        for sensor in &sensors {
            if self
                .differ
                .sensor_changed(self.snapshot.sensor(&sensor.id), &sensor.state)
            {
                updates.push(DeviceUpdate::Sensor(sensor.clone()));
            }
        }
        for light in &lights {
            if self
                .differ
                .light_changed(self.snapshot.light(&light.id), &light.state)
            {
                updates.push(DeviceUpdate::Light(light.clone()));
            }
        }

        let next = DeviceSnapshot::from_devices(&lights, &sensors);
        for id in self.snapshot.missing_lights(&next) {
            tracing::debug!(id = %id, "Light disappeared from bridge");
        }
        for id in self.snapshot.missing_sensors(&next) {
            tracing::debug!(id = %id, "Sensor disappeared from bridge");
        }
        self.snapshot = next;

        if !updates.is_empty() {
            tracing::debug!(count = updates.len(), "Detected device changes");
        }
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::model::{LightCommand, LightState, SensorState};

    use parking_lot::Mutex;

    /// In-memory bridge whose listings can be swapped between polls.
    struct FakeBridge {
        lights: Mutex<Result<Vec<Light>, ()>>,
        sensors: Mutex<Result<Vec<Sensor>, ()>>,
    }

    impl FakeBridge {
        fn new(lights: Vec<Light>, sensors: Vec<Sensor>) -> Self {
            Self {
                lights: Mutex::new(Ok(lights)),
                sensors: Mutex::new(Ok(sensors)),
            }
        }

        fn set_lights(&self, lights: Vec<Light>) {
            *self.lights.lock() = Ok(lights);
        }

        fn fail(&self) {
            *self.lights.lock() = Err(());
            *self.sensors.lock() = Err(());
        }
    }

    impl BridgeClient for FakeBridge {
        async fn list_lights(&self) -> Result<Vec<Light>, ProtocolError> {
            self.lights
                .lock()
                .clone()
                .map_err(|()| ProtocolError::ConnectionFailed("bridge down".to_string()))
        }

        async fn list_sensors(&self) -> Result<Vec<Sensor>, ProtocolError> {
            self.sensors
                .lock()
                .clone()
                .map_err(|()| ProtocolError::ConnectionFailed("bridge down".to_string()))
        }

        async fn set_light_state(
            &self,
            _id: &str,
            _command: &LightCommand,
        ) -> Result<(), ProtocolError> {
            Ok(())
        }
    }

    fn light(id: &str, on: bool) -> Light {
        Light::new(
            id,
            LightState {
                on: Some(on),
                ..LightState::default()
            },
        )
    }

    #[tokio::test]
    async fn first_cycle_reports_everything() {
        let bridge = Arc::new(FakeBridge::new(
            vec![light("1", false)],
            vec![Sensor::new("7", SensorState::default())],
        ));
        let mut poller = BridgePoller::new(bridge, StateDiffer::default());

        let updates = poller.initial().await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(poller.snapshot().light_count(), 1);
        assert_eq!(poller.snapshot().sensor_count(), 1);
    }

    #[tokio::test]
    async fn unchanged_state_emits_nothing() {
        let bridge = Arc::new(FakeBridge::new(vec![light("1", false)], vec![]));
        let mut poller = BridgePoller::new(bridge, StateDiffer::default());

        poller.initial().await.unwrap();
        let updates = poller.poll().await;
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn changed_light_is_reported() {
        let bridge = Arc::new(FakeBridge::new(vec![light("1", false)], vec![]));
        let mut poller = BridgePoller::new(Arc::clone(&bridge), StateDiffer::default());
        poller.initial().await.unwrap();

        bridge.set_lights(vec![light("1", true)]);
        let updates = poller.poll().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id(), "1");
        assert_eq!(updates[0].device_type(), DeviceType::Light);
    }

    #[tokio::test]
    async fn new_light_is_reported() {
        let bridge = Arc::new(FakeBridge::new(vec![light("1", false)], vec![]));
        let mut poller = BridgePoller::new(Arc::clone(&bridge), StateDiffer::default());
        poller.initial().await.unwrap();

        bridge.set_lights(vec![light("1", false), light("2", true)]);
        let updates = poller.poll().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id(), "2");
    }

    #[tokio::test]
    async fn disappeared_light_is_dropped_silently() {
        let bridge = Arc::new(FakeBridge::new(
            vec![light("1", false), light("2", true)],
            vec![],
        ));
        let mut poller = BridgePoller::new(Arc::clone(&bridge), StateDiffer::default());
        poller.initial().await.unwrap();

        bridge.set_lights(vec![light("1", false)]);
        let updates = poller.poll().await;
        assert!(updates.is_empty());
        assert_eq!(poller.snapshot().light_count(), 1);
        assert!(poller.snapshot().light("2").is_none());
    }

    #[tokio::test]
    async fn failed_fetch_skips_cycle_and_keeps_snapshot() {
        let bridge = Arc::new(FakeBridge::new(vec![light("1", false)], vec![]));
        let mut poller = BridgePoller::new(Arc::clone(&bridge), StateDiffer::default());
        poller.initial().await.unwrap();

        bridge.fail();
        let updates = poller.poll().await;
        assert!(updates.is_empty());
        assert_eq!(poller.snapshot().light_count(), 1);

        // Bridge recovers with a change: next tick picks it up.
        bridge.set_lights(vec![light("1", true)]);
        *bridge.sensors.lock() = Ok(vec![]);
        let updates = poller.poll().await;
        assert_eq!(updates.len(), 1);
    }

    #[tokio::test]
    async fn initial_propagates_fetch_failure() {
        let bridge = Arc::new(FakeBridge::new(vec![], vec![]));
        bridge.fail();
        let mut poller = BridgePoller::new(bridge, StateDiffer::default());
        assert!(poller.initial().await.is_err());
    }

    #[test]
    fn update_payload_uses_broker_field_names() {
        let update = DeviceUpdate::Light(light("1", false));
        let payload = update.payload().unwrap();
        assert!(payload.contains("\"On\":false"));
    }
}
