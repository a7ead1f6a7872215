//! MQTT remote control bridge
//!
//! Presents the panel as a single Home-Assistant-style JSON light:
//! state on `<base>/state`, commands on `<base>/set`, availability on
//! `<base>/availability` (with an `offline` last will). Incoming commands
//! are arbitrated against recent DMX activity inside the shared lock; the
//! resulting state publish happens outside it.
//!
//! Broker trouble is never fatal. The event loop retries with a fixed
//! backoff forever and only this task waits for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dimflow_core::{SetPayload, StatePayload};
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::MqttConfig;
use crate::context::BridgeContext;

/// Delay between reconnect attempts after an event-loop error.
const BROKER_RETRY: Duration = Duration::from_secs(5);

fn state_topic(base: &str) -> String {
    format!("{base}/state")
}

fn set_topic(base: &str) -> String {
    format!("{base}/set")
}

fn availability_topic(base: &str) -> String {
    format!("{base}/availability")
}

/// Build the MQTT client and its event loop from config.
pub fn connect(cfg: &MqttConfig) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(cfg.client_id.clone(), cfg.host.clone(), cfg.port);
    options.set_keep_alive(Duration::from_secs(30));
    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        options.set_credentials(user.clone(), pass.clone());
    }
    options.set_last_will(LastWill::new(
        availability_topic(&cfg.base_topic),
        "offline",
        QoS::AtLeastOnce,
        true,
    ));
    AsyncClient::new(options, 16)
}

/// Handle through which any task publishes light state.
#[derive(Clone)]
pub struct StatePublisher {
    client: AsyncClient,
    topic: String,
}

impl StatePublisher {
    /// Create a publisher for the given base topic.
    pub fn new(client: AsyncClient, base_topic: &str) -> Self {
        Self {
            client,
            topic: state_topic(base_topic),
        }
    }

    /// Publish one state payload (retained). Failures are logged, not
    /// escalated; the next state change publishes again anyway.
    pub async fn publish(&self, payload: &StatePayload) {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                warn!("failed to encode state payload: {e}");
                return;
            }
        };
        if let Err(e) = self
            .client
            .publish(&self.topic, QoS::AtLeastOnce, true, body)
            .await
        {
            warn!("failed to publish state: {e}");
        }
    }
}

/// Apply one `set` payload to the shared state. Returns the state to
/// publish, already deduplicated. Malformed payloads are dropped.
pub fn handle_set(ctx: &BridgeContext, payload: &[u8]) -> Option<StatePayload> {
    let cmd: SetPayload = match serde_json::from_slice(payload) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!("dropping malformed remote payload: {e}");
            return None;
        }
    };
    debug!(?cmd, "remote set");
    let mut light = ctx.light.lock();
    light.apply_remote_set(cmd, Instant::now());
    light.take_publish()
}

/// Bridge task: drives the MQTT event loop until shutdown.
pub async fn run_remote_bridge(
    ctx: Arc<BridgeContext>,
    cfg: MqttConfig,
    client: AsyncClient,
    mut event_loop: EventLoop,
    mut shutdown: watch::Receiver<bool>,
) {
    let set_topic = set_topic(&cfg.base_topic);
    let availability_topic = availability_topic(&cfg.base_topic);
    let publisher = StatePublisher::new(client.clone(), &cfg.base_topic);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("connected to MQTT broker at {}:{}", cfg.host, cfg.port);
                    if let Err(e) = client.subscribe(&set_topic, QoS::AtLeastOnce).await {
                        warn!("failed to subscribe to {set_topic}: {e}");
                    }
                    if let Err(e) = client
                        .publish(&availability_topic, QoS::AtLeastOnce, true, "online")
                        .await
                    {
                        warn!("failed to publish availability: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic == set_topic {
                        if let Some(payload) = handle_set(&ctx, &publish.payload) {
                            publisher.publish(&payload).await;
                        }
                    } else {
                        debug!(topic = %publish.topic, "ignoring message on unexpected topic");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        "MQTT connection error: {e}, retrying in {}s",
                        BROKER_RETRY.as_secs()
                    );
                    tokio::time::sleep(BROKER_RETRY).await;
                }
            }
        }
    }
    info!("remote bridge stopped");
}
