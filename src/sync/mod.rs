// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The state-synchronization and command-routing engine.
//!
//! [`SyncEngine`] wires the pieces together: the [`BridgePoller`] feeds
//! changed device states to the broker, and inbound broker messages flow
//! through the topic parser into the [`CommandTranslator`].

mod differ;
mod engine;
mod poller;
mod snapshot;
mod translator;

pub use differ::{DiffOptions, StateDiffer};
pub use engine::SyncEngine;
pub use poller::{BridgePoller, DeviceUpdate};
pub use snapshot::DeviceSnapshot;
pub use translator::CommandTranslator;
