// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for a [`SyncEngine`](crate::SyncEngine).
///
/// Holds the broker connection parameters, the Hue bridge address and
/// credential, the topic layout, and the timing knobs of the poll and
/// reconnect loops.
///
/// # Examples
///
/// ```
/// use hue2mqtt::SyncConfig;
/// use std::time::Duration;
///
/// let config = SyncConfig::new("192.168.1.50", "192.168.1.2", "bridge-user")
///     .with_broker_port(1883)
///     .with_root_topic("home/hue")
///     .with_poll_interval(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    broker_host: String,
    broker_port: u16,
    root_topic: String,
    topic_prefix: Option<String>,
    bridge_address: String,
    bridge_username: String,
    poll_interval: Duration,
    reconnect_delay: Duration,
    compare_color_coordinates: bool,
}

impl SyncConfig {
    /// Broker port used when none is configured, kept from the original
    /// deployment's configuration fallback.
    pub const DEFAULT_BROKER_PORT: u16 = 1833;
    /// Root topic used when none is configured.
    pub const DEFAULT_ROOT_TOPIC: &'static str = "hue";
    /// Default interval between bridge poll cycles.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Default delay before a broker reconnection attempt.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(15);

    /// Creates a configuration with the required connection parameters.
    ///
    /// # Arguments
    ///
    /// * `broker_host` - Hostname or IP of the MQTT broker
    /// * `bridge_address` - Hostname or IP of the Hue bridge
    /// * `bridge_username` - Whitelisted username on the bridge
    #[must_use]
    pub fn new(
        broker_host: impl Into<String>,
        bridge_address: impl Into<String>,
        bridge_username: impl Into<String>,
    ) -> Self {
        Self {
            broker_host: broker_host.into(),
            broker_port: Self::DEFAULT_BROKER_PORT,
            root_topic: Self::DEFAULT_ROOT_TOPIC.to_string(),
            topic_prefix: None,
            bridge_address: bridge_address.into(),
            bridge_username: bridge_username.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
            compare_color_coordinates: false,
        }
    }

    /// Sets the broker port.
    #[must_use]
    pub fn with_broker_port(mut self, port: u16) -> Self {
        self.broker_port = port;
        self
    }

    /// Sets the root topic under which all device topics live.
    ///
    /// Empty values fall back to [`Self::DEFAULT_ROOT_TOPIC`].
    #[must_use]
    pub fn with_root_topic(mut self, root: impl Into<String>) -> Self {
        let root = root.into();
        self.root_topic = if root.is_empty() {
            Self::DEFAULT_ROOT_TOPIC.to_string()
        } else {
            root
        };
        self
    }

    /// Sets an environment prefix prepended to every topic.
    ///
    /// Used to namespace a non-production deployment (e.g. `"dev"`). The
    /// prefix applies to both publish and subscribe paths.
    #[must_use]
    pub fn with_topic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.topic_prefix = Some(prefix.into());
        self
    }

    /// Sets the interval between bridge poll cycles.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the delay before a broker reconnection attempt.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Enables or disables comparison of the light color coordinates when
    /// diffing states.
    ///
    /// Disabled by default: the bridge reports the coordinates as floats
    /// that drift without a genuine state change, which would produce
    /// redundant publishes on most poll cycles.
    #[must_use]
    pub fn with_compare_color_coordinates(mut self, compare: bool) -> Self {
        self.compare_color_coordinates = compare;
        self
    }

    /// Returns the broker host.
    #[must_use]
    pub fn broker_host(&self) -> &str {
        &self.broker_host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn broker_port(&self) -> u16 {
        self.broker_port
    }

    /// Returns the root topic.
    #[must_use]
    pub fn root_topic(&self) -> &str {
        &self.root_topic
    }

    /// Returns the environment prefix, if any.
    #[must_use]
    pub fn topic_prefix(&self) -> Option<&str> {
        self.topic_prefix.as_deref()
    }

    /// Returns the Hue bridge address.
    #[must_use]
    pub fn bridge_address(&self) -> &str {
        &self.bridge_address
    }

    /// Returns the Hue bridge username.
    #[must_use]
    pub fn bridge_username(&self) -> &str {
        &self.bridge_username
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    /// Returns whether color coordinates participate in state diffing.
    #[must_use]
    pub fn compare_color_coordinates(&self) -> bool {
        self.compare_color_coordinates
    }
}
