// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the Hue bridge's local HTTP API.

mod http;

pub use http::HueHttpClient;

use std::future::Future;

use crate::error::ProtocolError;
use crate::model::{Light, LightCommand, Sensor};

/// Operations the sync engine needs from a lighting bridge.
///
/// The engine is generic over this trait so tests can drive it with an
/// in-memory bridge. Failures surface as [`ProtocolError`], never as
/// silent empty results.
pub trait BridgeClient: Send + Sync {
    /// Fetches the full current list of lights.
    fn list_lights(&self)
    -> impl Future<Output = Result<Vec<Light>, ProtocolError>> + Send;

    /// Fetches the full current list of sensors.
    fn list_sensors(&self)
    -> impl Future<Output = Result<Vec<Sensor>, ProtocolError>> + Send;

    /// Submits a partial state update for one light.
    fn set_light_state(
        &self,
        id: &str,
        command: &LightCommand,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}
