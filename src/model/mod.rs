// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain model: devices, their states, and light commands.
//!
//! The state structs double as the broker payload format. Every mutable
//! field is optional so that a partially filled state can express a partial
//! update (merge semantics).

mod command;
mod light;
mod sensor;

pub use command::LightCommand;
pub use light::{Light, LightState};
pub use sensor::{Sensor, SensorState, SensorTimestamp};
