// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `hue2mqtt` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! protocol communication with the Hue bridge and the MQTT broker, JSON and
//! topic parsing, and engine lifecycle operations.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a payload or topic.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The engine is already running.
    #[error("engine is already started")]
    AlreadyStarted,
}

/// Errors related to protocol communication (HTTP bridge, MQTT broker).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request against the Hue bridge failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The bridge rejected the request.
    #[error("bridge rejected request: HTTP {status}")]
    BridgeRejected {
        /// The HTTP status code returned by the bridge.
        status: u16,
    },
}

/// Errors related to parsing payloads and topics.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A topic does not match the routable segment layout.
    #[error("unroutable topic: {0}")]
    MalformedTopic(String),

    /// A topic names a device type outside the routable set.
    #[error("unknown device type in topic: {0}")]
    UnknownDeviceType(String),

    /// A topic names an action outside the routable set.
    #[error("unknown action in topic: {0}")]
    UnknownAction(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::MalformedTopic("hue/light".to_string());
        assert_eq!(err.to_string(), "unroutable topic: hue/light");
    }

    #[test]
    fn error_from_parse_error() {
        let parse_err = ParseError::UnknownAction("DELETE".to_string());
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Parse(ParseError::UnknownAction(_))));
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::BridgeRejected { status: 503 };
        assert_eq!(err.to_string(), "bridge rejected request: HTTP 503");
    }

    #[test]
    fn connection_failed_display() {
        let err = ProtocolError::ConnectionFailed("broker session already exists".to_string());
        assert_eq!(
            err.to_string(),
            "connection failed: broker session already exists"
        );
    }
}
