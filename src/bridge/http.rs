// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP implementation of [`BridgeClient`] against the Hue local API.
//!
//! The bridge speaks lowercase JSON (`on`, `bri`, `xy`, ...); this module
//! owns those wire structs and converts them into the model types, which
//! use the broker payload naming.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::ProtocolError;
use crate::model::{Light, LightCommand, LightState, Sensor, SensorState, SensorTimestamp};

use super::BridgeClient;

/// Client for a Hue bridge's local HTTP API.
///
/// # Examples
///
/// ```no_run
/// use hue2mqtt::{BridgeClient, HueHttpClient};
///
/// # async fn example() -> hue2mqtt::Result<()> {
/// let client = HueHttpClient::new("192.168.1.2", "bridge-user")?;
/// let lights = client.list_lights().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HueHttpClient {
    base_url: String,
    client: Client,
}

impl HueHttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the bridge at the given address.
    ///
    /// # Arguments
    ///
    /// * `address` - Hostname or IP of the bridge, with or without scheme
    /// * `username` - Whitelisted username on the bridge
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        address: impl Into<String>,
        username: impl AsRef<str>,
    ) -> Result<Self, ProtocolError> {
        Self::with_timeout(address, username, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(
        address: impl Into<String>,
        username: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self, ProtocolError> {
        let address = address.into();
        let origin = if address.starts_with("http://") || address.starts_with("https://") {
            address
        } else {
            format!("http://{address}")
        };
        let base_url = format!(
            "{origin}/api/{}",
            urlencoding::encode(username.as_ref())
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ProtocolError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(url = %url, "Fetching from bridge");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::BridgeRejected {
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(ProtocolError::Http)
    }
}

impl BridgeClient for HueHttpClient {
    async fn list_lights(&self) -> Result<Vec<Light>, ProtocolError> {
        let wire: BTreeMap<String, WireLight> = self.get_json("lights").await?;
        Ok(wire
            .into_iter()
            .map(|(id, light)| Light::new(id, light.state.into_state()))
            .collect())
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>, ProtocolError> {
        let wire: BTreeMap<String, WireSensor> = self.get_json("sensors").await?;
        Ok(wire
            .into_iter()
            .map(|(id, sensor)| Sensor::new(id, sensor.into_state()))
            .collect())
    }

    async fn set_light_state(
        &self,
        id: &str,
        command: &LightCommand,
    ) -> Result<(), ProtocolError> {
        let url = format!("{}/lights/{id}/state", self.base_url);
        tracing::debug!(url = %url, ?command, "Sending light command");

        let response = self
            .client
            .put(&url)
            .json(command)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::BridgeRejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// A light as the bridge reports it.
#[derive(Debug, Deserialize)]
struct WireLight {
    state: WireLightState,
}

/// Light state in the bridge's native field naming.
#[derive(Debug, Default, Deserialize)]
struct WireLightState {
    #[serde(default)]
    on: Option<bool>,
    #[serde(default)]
    bri: Option<u8>,
    #[serde(default)]
    hue: Option<u16>,
    #[serde(default)]
    sat: Option<u8>,
    #[serde(default)]
    xy: Option<[f64; 2]>,
    #[serde(default)]
    ct: Option<u16>,
    #[serde(default)]
    alert: Option<String>,
    #[serde(default)]
    effect: Option<String>,
    #[serde(default)]
    colormode: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    reachable: Option<bool>,
    #[serde(default)]
    transitiontime: Option<u16>,
}

impl WireLightState {
    fn into_state(self) -> LightState {
        LightState {
            on: self.on,
            alert: self.alert,
            brightness: self.bri,
            color_coordinates: self.xy,
            color_temperature: self.ct,
            effect: self.effect,
            hue: self.hue,
            saturation: self.sat,
            transition_time: self.transitiontime,
            is_reachable: self.reachable,
            mode: self.mode,
            color_mode: self.colormode,
        }
    }
}

/// A sensor as the bridge reports it.
#[derive(Debug, Deserialize)]
struct WireSensor {
    state: serde_json::Map<String, serde_json::Value>,
}

impl WireSensor {
    fn into_state(self) -> SensorState {
        let mut fields = self.state;
        let last_updated = fields
            .remove("lastupdated")
            .and_then(|v| v.as_str().and_then(|s| s.parse::<SensorTimestamp>().ok()));
        SensorState {
            last_updated,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_without_scheme() {
        let client = HueHttpClient::new("192.168.1.2", "user").unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.2/api/user");
    }

    #[test]
    fn base_url_with_scheme() {
        let client = HueHttpClient::new("https://bridge.local", "user").unwrap();
        assert_eq!(client.base_url(), "https://bridge.local/api/user");
    }

    #[test]
    fn username_is_encoded() {
        let client = HueHttpClient::new("bridge", "user with space").unwrap();
        assert_eq!(client.base_url(), "http://bridge/api/user%20with%20space");
    }

    #[test]
    fn wire_light_state_converts() {
        let json = r#"{
            "on": true,
            "bri": 254,
            "hue": 8402,
            "sat": 140,
            "xy": [0.4573, 0.41],
            "ct": 366,
            "alert": "none",
            "effect": "none",
            "colormode": "ct",
            "mode": "homeautomation",
            "reachable": true
        }"#;
        let wire: WireLightState = serde_json::from_str(json).unwrap();
        let state = wire.into_state();
        assert_eq!(state.on, Some(true));
        assert_eq!(state.brightness, Some(254));
        assert_eq!(state.hue, Some(8402));
        assert_eq!(state.saturation, Some(140));
        assert_eq!(state.color_coordinates, Some([0.4573, 0.41]));
        assert_eq!(state.color_temperature, Some(366));
        assert_eq!(state.is_reachable, Some(true));
        assert_eq!(state.color_mode.as_deref(), Some("ct"));
        assert!(state.transition_time.is_none());
    }

    #[test]
    fn wire_sensor_extracts_timestamp() {
        let json = r#"{"state":{"lastupdated":"2024-01-15T10:30:00","presence":false}}"#;
        let wire: WireSensor = serde_json::from_str(json).unwrap();
        let state = wire.into_state();
        assert!(state.last_updated.is_some());
        assert_eq!(state.fields["presence"], serde_json::json!(false));
        assert!(!state.fields.contains_key("lastupdated"));
    }

    #[test]
    fn wire_sensor_never_updated() {
        let json = r#"{"state":{"lastupdated":"none","buttonevent":null}}"#;
        let wire: WireSensor = serde_json::from_str(json).unwrap();
        let state = wire.into_state();
        assert_eq!(state.last_updated, Some(SensorTimestamp::Never));
    }
}
