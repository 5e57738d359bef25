// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT broker connection with automatic reconnection.
//!
//! [`BrokerConnection`] owns one logical session to the broker and shields
//! the rest of the system from connection churn: an unexpected loss parks
//! the session in `Reconnecting`, waits the configured delay, dials again,
//! and re-issues every registered subscription. Only a deliberate
//! [`disconnect`](BrokerConnection::disconnect) ends the session for good.
//!
//! All publishes are retained at QoS exactly-once, so the broker keeps the
//! last state per topic for late subscribers. Publishing while not
//! connected is a silent no-op rather than an error.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::{mpsc, oneshot};

use crate::error::ProtocolError;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the inbound message channel.
const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// Configuration for a broker connection.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
    reconnect_delay: Duration,
}

impl BrokerConfig {
    /// Default delay before a reconnection attempt.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(15);

    /// Creates a configuration for the broker at the given host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn with_keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn with_connection_timeout(mut self, duration: Duration) -> Self {
        self.connection_timeout = duration;
        self
    }

    /// Sets the delay before a reconnection attempt (default: 15 seconds).
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Connection lifecycle state.
///
/// `Connected → Disconnected` happens only on a deliberate stop; an
/// unexpected loss goes through `Reconnecting` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session, and none being attempted.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Session established.
    Connected,
    /// Session lost; waiting out the reconnect delay.
    Reconnecting,
}

impl ConnectionState {
    /// Returns `true` if the session is established.
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A message received from the broker on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The topic the message arrived on.
    pub topic: String,
    /// The UTF-8 payload.
    pub payload: String,
}

/// A connection to the MQTT broker.
///
/// Cheaply cloneable (via `Arc`); the poll path and the inbound path share
/// one instance.
///
/// # Examples
///
/// ```no_run
/// use hue2mqtt::{BrokerConfig, BrokerConnection};
///
/// # async fn example() -> hue2mqtt::Result<()> {
/// let broker = BrokerConnection::new(BrokerConfig::new("192.168.1.50", 1883));
/// let inbound = broker.connect().await?;
/// broker.subscribe("hue/light/1/state/set").await?;
/// broker.publish("hue/light/1/state", r#"{"On":true}"#).await?;
/// broker.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrokerConnection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    config: BrokerConfig,
    /// Client of the current session, if one was ever established.
    client: RwLock<Option<AsyncClient>>,
    state: Mutex<ConnectionState>,
    /// Topics to (re-)subscribe; survives the session that registered them.
    subscriptions: Mutex<BTreeSet<String>>,
    /// Set by `disconnect` so the event task does not arm a reconnect.
    deliberate_disconnect: AtomicBool,
}

impl BrokerConnection {
    /// Creates a connection handle in the `Disconnected` state.
    ///
    /// No network activity happens until [`connect`](Self::connect).
    #[must_use]
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            inner: Arc::new(ConnectionInner {
                config,
                client: RwLock::new(None),
                state: Mutex::new(ConnectionState::Disconnected),
                subscriptions: Mutex::new(BTreeSet::new()),
                deliberate_disconnect: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.lock()
    }

    /// Returns whether the session is currently established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the number of registered subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }

    /// Returns the registered subscription topics, sorted.
    #[must_use]
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.inner.subscriptions.lock().iter().cloned().collect()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.inner.state.lock() = state;
    }

    /// Connects to the broker and returns the inbound message stream.
    ///
    /// Spawns the event task that drives the session, including the
    /// reconnect loop. Messages on subscribed topics are delivered through
    /// the returned receiver for the whole lifetime of the connection,
    /// across reconnects.
    ///
    /// # Errors
    ///
    /// Returns error if a session already exists, if the connection fails,
    /// or if the broker does not acknowledge within the configured timeout.
    pub async fn connect(&self) -> Result<mpsc::Receiver<InboundMessage>, ProtocolError> {
        if self.state() != ConnectionState::Disconnected {
            return Err(ProtocolError::ConnectionFailed(
                "broker session already exists".to_string(),
            ));
        }
        self.set_state(ConnectionState::Connecting);
        self.inner.deliberate_disconnect.store(false, Ordering::Release);

        let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let client_id = format!("hue2mqtt_{}_{}", std::process::id(), counter);

        let config = &self.inner.config;
        let mut options = MqttOptions::new(&client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(true);
        if let Some((ref username, ref password)) = config.credentials {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, 10);
        *self.inner.client.write() = Some(client);

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let (connack_tx, connack_rx) = oneshot::channel();

        let connection = self.clone();
        tokio::spawn(async move {
            run_event_loop(event_loop, connection, inbound_tx, connack_tx).await;
        });

        let timeout = config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %config.host,
                    port = %config.port,
                    "Connected to MQTT broker"
                );
                Ok(inbound_rx)
            }
            Ok(Err(_)) => {
                self.set_state(ConnectionState::Disconnected);
                Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ))
            }
            Err(_) => {
                self.set_state(ConnectionState::Disconnected);
                Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }

    /// Publishes a retained message at QoS exactly-once.
    ///
    /// A publish while not connected is skipped silently: the next poll
    /// cycle will republish current state once the session is back.
    ///
    /// # Errors
    ///
    /// Returns error if the connected client rejects the publish.
    pub async fn publish(
        &self,
        topic: &str,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), ProtocolError> {
        if !self.is_connected() {
            tracing::debug!(topic = %topic, "Skipping publish while disconnected");
            return Ok(());
        }
        let Some(client) = self.inner.client.read().clone() else {
            return Ok(());
        };
        client
            .publish(topic, QoS::ExactlyOnce, true, payload.into())
            .await
            .map_err(ProtocolError::Mqtt)
    }

    /// Registers interest in a topic at QoS exactly-once.
    ///
    /// Registration is idempotent: a topic already registered is not
    /// re-issued to the broker. Registered topics are re-subscribed
    /// automatically after every reconnect, and a subscription made while
    /// disconnected is issued when the session is next established.
    ///
    /// # Errors
    ///
    /// Returns error if the connected client rejects the subscription.
    pub async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        let newly_registered = self.inner.subscriptions.lock().insert(topic.to_string());
        if !newly_registered {
            return Ok(());
        }
        if !self.is_connected() {
            tracing::debug!(topic = %topic, "Deferring subscription until connected");
            return Ok(());
        }
        let Some(client) = self.inner.client.read().clone() else {
            return Ok(());
        };
        tracing::debug!(topic = %topic, "Subscribing");
        client
            .subscribe(topic, QoS::ExactlyOnce)
            .await
            .map_err(ProtocolError::Mqtt)
    }

    /// Disconnects from the broker deliberately.
    ///
    /// Unlike a connection loss, this transitions straight to
    /// `Disconnected` and the event task does not attempt to reconnect.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect packet cannot be sent.
    pub async fn disconnect(&self) -> Result<(), ProtocolError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );
        self.inner.deliberate_disconnect.store(true, Ordering::Release);

        let client = self.inner.client.write().take();
        if let Some(client) = client {
            client.disconnect().await.map_err(ProtocolError::Mqtt)?;
        }
        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }
}

impl std::fmt::Debug for BrokerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConnection")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("state", &self.state())
            .finish()
    }
}

/// Drives the rumqttc event loop for the lifetime of the session.
///
/// On an unexpected error the loop waits out the reconnect delay and polls
/// again, which makes rumqttc dial a fresh connection; the ConnAck of that
/// fresh connection triggers re-subscription of every registered topic.
async fn run_event_loop(
    mut event_loop: EventLoop,
    connection: BrokerConnection,
    inbound_tx: mpsc::Sender<InboundMessage>,
    connack_tx: oneshot::Sender<()>,
) {
    let reconnect_delay = connection.inner.config.reconnect_delay;
    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                tracing::debug!(?ack, "MQTT session established");
                connection.set_state(ConnectionState::Connected);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
                resubscribe_registered(&connection);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(payload) => {
                        tracing::debug!(
                            topic = %publish.topic,
                            payload = %payload,
                            "MQTT message received"
                        );
                        let message = InboundMessage {
                            topic: publish.topic,
                            payload,
                        };
                        if inbound_tx.send(message).await.is_err() {
                            // Receiver dropped: nobody left to dispatch to.
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::warn!(topic = %publish.topic, "Dropping non-UTF-8 payload");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                if connection
                    .inner
                    .deliberate_disconnect
                    .load(Ordering::Acquire)
                {
                    tracing::debug!("MQTT session closed");
                    connection.set_state(ConnectionState::Disconnected);
                    break;
                }
                if let Some(tx) = connack_tx.take() {
                    // Never got a session: report the failed connect and
                    // leave reconnection to the caller.
                    tracing::warn!(error = %e, "MQTT connection failed");
                    drop(tx);
                    connection.set_state(ConnectionState::Disconnected);
                    break;
                }
                tracing::warn!(
                    error = %e,
                    delay_secs = reconnect_delay.as_secs(),
                    "MQTT connection lost, reconnecting after delay"
                );
                connection.set_state(ConnectionState::Reconnecting);
                tokio::time::sleep(reconnect_delay).await;
                if connection
                    .inner
                    .deliberate_disconnect
                    .load(Ordering::Acquire)
                {
                    connection.set_state(ConnectionState::Disconnected);
                    break;
                }
                connection.set_state(ConnectionState::Connecting);
            }
        }
    }
}

/// Re-issues every registered subscription on a fresh session.
///
/// Runs in its own task: the event loop must keep polling while the
/// subscribe requests flow through the client's request channel.
fn resubscribe_registered(connection: &BrokerConnection) {
    let topics: Vec<String> = connection
        .inner
        .subscriptions
        .lock()
        .iter()
        .cloned()
        .collect();
    if topics.is_empty() {
        return;
    }
    let Some(client) = connection.inner.client.read().clone() else {
        return;
    };
    tokio::spawn(async move {
        for topic in topics {
            tracing::debug!(topic = %topic, "Re-issuing subscription");
            if let Err(e) = client.subscribe(&topic, QoS::ExactlyOnce).await {
                tracing::warn!(topic = %topic, error = %e, "Failed to re-subscribe");
            }
        }
    });
}
