//! Best-effort product event publishing.
//!
//! The service hands events to [`EventPublisher`], which serializes them and
//! enqueues without waiting. A dispatcher task drains the queue into an
//! [`EventSink`]; failures there are logged and never reach the caller.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::DaprConfig;

/// Announced once a product has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub sku_code: String,
    pub event_id: String,
    pub occurred_at_epoch_ms: i64,
}

impl ProductCreated {
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku_code: sku.into(),
            event_id: Uuid::new_v4().to_string(),
            occurred_at_epoch_ms: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to reach event sink: {0}")]
    Transport(String),

    #[error("Event sink rejected event with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Publish-only channel keyed by partition key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// Dapr HTTP pub/sub sink.
#[derive(Clone)]
pub struct DaprEventSink {
    client: reqwest::Client,
    base_url: String,
    pubsub_name: String,
}

impl DaprEventSink {
    pub fn new(config: &DaprConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url(),
            pubsub_name: config.pubsub_name.clone(),
        }
    }

    fn publish_url(&self, topic: &str) -> String {
        format!(
            "{}/v1.0/publish/{}/{}",
            self.base_url, self.pubsub_name, topic
        )
    }
}

#[async_trait]
impl EventSink for DaprEventSink {
    #[instrument(skip(self, payload), fields(topic = %topic))]
    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.publish_url(topic))
            .query(&[("metadata.partitionKey", key)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected { status, body });
        }

        Ok(())
    }
}

struct Envelope {
    topic: String,
    key: String,
    payload: Vec<u8>,
}

/// Non-blocking handle onto the dispatcher queue.
///
/// Dropping every clone closes the queue; the dispatcher then drains what is
/// left and its task finishes.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<Envelope>,
}

impl EventPublisher {
    /// Start the dispatcher task for `sink` with room for `capacity` queued events.
    pub fn spawn(sink: Arc<dyn EventSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(dispatch(sink, rx));
        (Self { tx }, handle)
    }

    /// Serialize and enqueue. Never waits on the sink and never fails the caller.
    pub fn publish<E: Serialize>(&self, topic: &str, key: &str, event: &E) {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(topic, key, error = %PublishError::from(e), "Dropping event");
                return;
            }
        };

        let envelope = Envelope {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };

        match self.tx.try_send(envelope) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(topic = %dropped.topic, key = %dropped.key, "Event queue full, dropping event");
            }
            Err(TrySendError::Closed(dropped)) => {
                warn!(topic = %dropped.topic, key = %dropped.key, "Event dispatcher stopped, dropping event");
            }
        }
    }
}

async fn dispatch(sink: Arc<dyn EventSink>, mut rx: mpsc::Receiver<Envelope>) {
    while let Some(envelope) = rx.recv().await {
        match sink
            .send(&envelope.topic, &envelope.key, envelope.payload)
            .await
        {
            Ok(()) => info!(topic = %envelope.topic, key = %envelope.key, "Event published"),
            Err(e) => warn!(
                topic = %envelope.topic,
                key = %envelope.key,
                error = %e,
                "Failed to publish event"
            ),
        }
    }

    info!("Event dispatcher stopped");
}
