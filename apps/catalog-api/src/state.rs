//! Application state management

use domain_catalog::EventPublisher;
use mongodb::{Client, Database};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    /// `None` when product announcements are disabled
    pub publisher: Option<EventPublisher>,
}
