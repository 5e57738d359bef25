// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hue2mqtt` - A Rust library bridging Philips Hue devices to MQTT.
//!
//! This library polls a Hue bridge over its local HTTP API, republishes
//! meaningful device state changes as retained MQTT messages, and routes
//! inbound `set` messages back into light commands.
//!
//! # Topic Layout
//!
//! ```text
//! {root}/light/{id}/state       retained light state (published)
//! {root}/sensor/{id}/state      retained sensor state (published)
//! {root}/light/{id}/state/set   partial state commands (subscribed)
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use hue2mqtt::{SyncConfig, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() -> hue2mqtt::Result<()> {
//!     let config = SyncConfig::new("192.168.1.50", "192.168.1.2", "bridge-user")
//!         .with_broker_port(1883)
//!         .with_root_topic("hue");
//!
//!     let engine = SyncEngine::from_config(config)?;
//!     engine.start().await?;
//!
//!     // ... runs until told to stop ...
//!     tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
//!
//!     engine.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Custom Bridge Client
//!
//! The engine is generic over [`BridgeClient`], so anything that can list
//! lights and sensors and accept light commands can stand in for the Hue
//! bridge:
//!
//! ```no_run
//! use hue2mqtt::{HueHttpClient, SyncConfig, SyncEngine};
//!
//! # async fn example() -> hue2mqtt::Result<()> {
//! let bridge = HueHttpClient::new("192.168.1.2", "bridge-user")?;
//! let engine = SyncEngine::new(SyncConfig::new("192.168.1.50", "192.168.1.2", "bridge-user"), bridge);
//! engine.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod broker;
mod config;
pub mod error;
pub mod model;
pub mod sync;
pub mod topic;

pub use bridge::{BridgeClient, HueHttpClient};
pub use broker::{BrokerConfig, BrokerConnection, ConnectionState, InboundMessage};
pub use config::SyncConfig;
pub use error::{Error, ParseError, ProtocolError, Result};
pub use model::{Light, LightCommand, LightState, Sensor, SensorState, SensorTimestamp};
pub use sync::{
    BridgePoller, CommandTranslator, DeviceSnapshot, DeviceUpdate, DiffOptions, StateDiffer,
    SyncEngine,
};
pub use topic::{CommandIntent, DeviceType, Route, TopicAction, TopicScheme};
