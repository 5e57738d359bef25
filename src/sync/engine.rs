// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle orchestration of the bridge-to-broker sync.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::bridge::{BridgeClient, HueHttpClient};
use crate::broker::{BrokerConfig, BrokerConnection, ConnectionState, InboundMessage};
use crate::config::SyncConfig;
use crate::error::Error;
use crate::topic::{DeviceType, Route, TopicScheme};

use super::{BridgePoller, CommandTranslator, DeviceUpdate, DiffOptions, StateDiffer};

/// Orchestrates polling, publishing, and inbound command routing.
///
/// `start` connects the broker, publishes the full current device state
/// (so subscribers see every device immediately, independent of the poll
/// cycle), subscribes to every light's set topic, and spawns the poll and
/// inbound-dispatch loops. `stop` winds the tasks down and disconnects.
/// Both survive being called at the wrong time: a second `start` is an
/// error, a second `stop` is a no-op.
///
/// # Examples
///
/// ```no_run
/// use hue2mqtt::{SyncConfig, SyncEngine};
///
/// # async fn example() -> hue2mqtt::Result<()> {
/// let config = SyncConfig::new("192.168.1.50", "192.168.1.2", "bridge-user")
///     .with_broker_port(1883);
/// let engine = SyncEngine::from_config(config)?;
/// engine.start().await?;
/// // ... runs until ...
/// engine.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct SyncEngine<C> {
    config: SyncConfig,
    bridge: Arc<C>,
    broker: BrokerConnection,
    topics: TopicScheme,
    running: Mutex<Option<EngineTasks>>,
}

struct EngineTasks {
    shutdown: watch::Sender<bool>,
    poll_task: JoinHandle<()>,
    inbound_task: JoinHandle<()>,
}

impl SyncEngine<HueHttpClient> {
    /// Creates an engine talking to the Hue bridge named in the config.
    ///
    /// # Errors
    ///
    /// Returns error if the bridge HTTP client cannot be created.
    pub fn from_config(config: SyncConfig) -> Result<Self, Error> {
        let bridge = HueHttpClient::new(config.bridge_address(), config.bridge_username())
            .map_err(Error::Protocol)?;
        Ok(Self::new(config, bridge))
    }
}

impl<C: BridgeClient + 'static> SyncEngine<C> {
    /// Creates an engine with a custom bridge client.
    #[must_use]
    pub fn new(config: SyncConfig, bridge: C) -> Self {
        let broker = BrokerConnection::new(
            BrokerConfig::new(config.broker_host(), config.broker_port())
                .with_reconnect_delay(config.reconnect_delay()),
        );
        let topics = TopicScheme::new(config.root_topic(), config.topic_prefix());
        Self {
            config,
            bridge: Arc::new(bridge),
            broker,
            topics,
            running: Mutex::new(None),
        }
    }

    /// Returns the broker connection.
    #[must_use]
    pub fn broker(&self) -> &BrokerConnection {
        &self.broker
    }

    /// Returns the topic scheme in effect.
    #[must_use]
    pub fn topics(&self) -> &TopicScheme {
        &self.topics
    }

    /// Returns whether the engine has been started and not yet stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Starts the engine.
    ///
    /// # Errors
    ///
    /// Returns error if the engine is already running, the broker cannot
    /// be reached, or the initial bridge fetch fails. Bridge failures
    /// after a successful start are recovered by skipping poll cycles, and
    /// broker losses by the connection's reconnect loop.
    pub async fn start(&self) -> Result<(), Error> {
        if self.is_running() {
            return Err(Error::AlreadyStarted);
        }

        let inbound_rx = self.broker.connect().await.map_err(Error::Protocol)?;

        let differ = StateDiffer::new(DiffOptions {
            compare_color_coordinates: self.config.compare_color_coordinates(),
        });
        let mut poller = BridgePoller::new(Arc::clone(&self.bridge), differ);

        let updates = match poller.initial().await {
            Ok(updates) => updates,
            Err(e) => {
                let _ = self.broker.disconnect().await;
                return Err(Error::Protocol(e));
            }
        };
        for update in &updates {
            publish_update(&self.broker, &self.topics, update).await;
        }
        tracing::info!(devices = updates.len(), "Published initial device states");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poll_task = tokio::spawn(poll_loop(
            poller,
            self.broker.clone(),
            self.topics.clone(),
            self.config.poll_interval(),
            shutdown_rx.clone(),
        ));
        let inbound_task = tokio::spawn(inbound_loop(
            inbound_rx,
            self.topics.clone(),
            CommandTranslator::new(Arc::clone(&self.bridge)),
            shutdown_rx,
        ));

        *self.running.lock() = Some(EngineTasks {
            shutdown: shutdown_tx,
            poll_task,
            inbound_task,
        });
        tracing::info!("Sync engine started");
        Ok(())
    }

    /// Stops the engine.
    ///
    /// Waits for the in-flight poll cycle to finish, then disconnects the
    /// broker if a session exists. Calling `stop` again (or before
    /// `start`) does nothing.
    ///
    /// # Errors
    ///
    /// Returns error if the broker disconnect fails.
    pub async fn stop(&self) -> Result<(), Error> {
        let tasks = self.running.lock().take();
        if let Some(tasks) = tasks {
            let _ = tasks.shutdown.send(true);
            let _ = tasks.poll_task.await;
            let _ = tasks.inbound_task.await;
            tracing::info!("Sync engine stopped");
        }
        if self.broker.is_connected() {
            self.broker.disconnect().await.map_err(Error::Protocol)?;
        }
        Ok(())
    }

    /// Returns the broker connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.broker.state()
    }
}

/// Publishes one device update and keeps the set-topic subscription for
/// lights current.
///
/// Subscribing here (rather than only at start) covers lights that first
/// appear in a later poll; the subscription registry makes the repeat
/// calls free.
async fn publish_update(broker: &BrokerConnection, topics: &TopicScheme, update: &DeviceUpdate) {
    let topic = topics.state_topic(update.device_type(), update.id());
    match update.payload() {
        Ok(payload) => {
            if let Err(e) = broker.publish(&topic, payload).await {
                tracing::warn!(topic = %topic, error = %e, "Publish failed");
            }
        }
        Err(e) => {
            tracing::warn!(id = %update.id(), error = %e, "Could not serialize device state");
            return;
        }
    }
    if update.device_type() == DeviceType::Light {
        let set_topic = topics.set_topic(update.id());
        if let Err(e) = broker.subscribe(&set_topic).await {
            tracing::warn!(topic = %set_topic, error = %e, "Subscribe failed");
        }
    }
}

/// Polls the bridge on a fixed interval until shutdown.
///
/// The sleep restarts only after the cycle (fetch, diff, publish) has run
/// to completion, so cycles never overlap.
async fn poll_loop<C: BridgeClient>(
    mut poller: BridgePoller<C>,
    broker: BrokerConnection,
    topics: TopicScheme,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(interval) => {}
        }
        let updates = poller.poll().await;
        for update in &updates {
            publish_update(&broker, &topics, update).await;
        }
    }
}

/// Dispatches inbound broker messages until shutdown.
async fn inbound_loop<C: BridgeClient>(
    mut inbound_rx: mpsc::Receiver<InboundMessage>,
    topics: TopicScheme,
    translator: CommandTranslator<C>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            message = inbound_rx.recv() => {
                let Some(message) = message else { break };
                dispatch_inbound(&topics, &translator, &message).await;
            }
        }
    }
}

/// Routes one inbound message.
///
/// Unroutable messages are discarded with a log line; nothing in this
/// path is allowed to take the dispatch loop down.
async fn dispatch_inbound<C: BridgeClient>(
    topics: &TopicScheme,
    translator: &CommandTranslator<C>,
    message: &InboundMessage,
) {
    let intent = match topics.parse(&message.topic) {
        Ok(intent) => intent,
        Err(e) => {
            tracing::debug!(topic = %message.topic, error = %e, "Ignoring unroutable message");
            return;
        }
    };
    match intent.route() {
        Some(Route::SetLightState) => {
            if let Err(e) = translator.apply(&intent.id, &message.payload).await {
                tracing::warn!(id = %intent.id, error = %e, "Light command failed");
            }
        }
        None => {
            tracing::trace!(topic = %message.topic, "No handler for topic");
        }
    }
}
