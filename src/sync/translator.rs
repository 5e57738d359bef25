// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of inbound set-state messages into bridge commands.

use std::sync::Arc;

use crate::bridge::BridgeClient;
use crate::error::{Error, ParseError};
use crate::model::{LightCommand, LightState};

/// Converts an inbound state payload into a light command and submits it.
///
/// Submission is fire-and-forget from the router's perspective: the
/// translator reports failures to its caller for logging, but nothing
/// retries them.
pub struct CommandTranslator<C> {
    client: Arc<C>,
}

impl<C: BridgeClient> CommandTranslator<C> {
    /// Creates a translator submitting through the given bridge client.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Applies a set-state payload to the addressed light.
    ///
    /// The payload is a (possibly partial) state object; absent fields are
    /// left unset in the command so the light keeps its current values.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not a valid state object or the
    /// bridge rejects the command.
    pub async fn apply(&self, id: &str, payload: &str) -> Result<(), Error> {
        let state: LightState = serde_json::from_str(payload).map_err(ParseError::Json)?;
        let command = LightCommand::from_state(&state);

        tracing::debug!(id = %id, ?command, "Submitting light command");
        self.client.set_light_state(id, &command).await?;
        Ok(())
    }
}
