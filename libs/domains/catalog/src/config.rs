#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_or_default, env_parse};

/// Settings injected into [`CatalogService`](crate::service::CatalogService).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Topic that receives `ProductCreated` events
    pub product_registered_topic: String,

    /// When false the service runs without an event publisher
    pub events_enabled: bool,

    /// Events buffered ahead of the sink before new ones are dropped
    pub event_queue_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            product_registered_topic: "product-registered".to_string(),
            events_enabled: true,
            event_queue_capacity: 1024,
        }
    }
}

/// Dapr sidecar used as the event sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaprConfig {
    pub host: String,
    pub http_port: u16,
    pub pubsub_name: String,
}

impl DaprConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.http_port)
    }
}

impl Default for DaprConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            http_port: 3500,
            pubsub_name: "catalog-pubsub".to_string(),
        }
    }
}

/// Environment variables:
/// - `CATALOG_PRODUCT_REGISTERED_TOPIC` (default: product-registered)
/// - `CATALOG_EVENTS_ENABLED` (default: true)
/// - `CATALOG_EVENT_QUEUE_CAPACITY` (default: 1024)
#[cfg(feature = "config")]
impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            product_registered_topic: env_or_default(
                "CATALOG_PRODUCT_REGISTERED_TOPIC",
                &defaults.product_registered_topic,
            ),
            events_enabled: env_parse("CATALOG_EVENTS_ENABLED", defaults.events_enabled)?,
            event_queue_capacity: env_parse(
                "CATALOG_EVENT_QUEUE_CAPACITY",
                defaults.event_queue_capacity,
            )?,
        })
    }
}

/// Environment variables:
/// - `DAPR_HTTP_HOST` (default: localhost)
/// - `DAPR_HTTP_PORT` (default: 3500)
/// - `DAPR_PUBSUB_NAME` (default: catalog-pubsub)
#[cfg(feature = "config")]
impl FromEnv for DaprConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: env_or_default("DAPR_HTTP_HOST", &defaults.host),
            http_port: env_parse("DAPR_HTTP_PORT", defaults.http_port)?,
            pubsub_name: env_or_default("DAPR_PUBSUB_NAME", &defaults.pubsub_name),
        })
    }
}
