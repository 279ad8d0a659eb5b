//! Logging bootstrap shared by the service binaries.

use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre so `eyre::Report`s returned from `main` print with
/// source locations. Repeated calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Directives used when `RUST_LOG` is unset.
///
/// The Mongo driver logs every command at debug, so it is kept quieter than
/// the application crates.
pub fn default_directives(environment: &Environment) -> &'static str {
    match environment {
        Environment::Production => "info,tower_http=info,mongodb=warn,reqwest=warn",
        Environment::Development => "debug,hyper=info,hyper_util=info,mongodb=info",
    }
}

/// Initialize the global subscriber.
///
/// - **Production** (`APP_ENV=production`): flattened JSON lines without targets
/// - **Development**: pretty multi-line output with targets
///
/// Both modes carry a `tracing_error::ErrorLayer` so color-eyre reports include
/// the active span trace. `RUST_LOG` overrides [`default_directives`].
///
/// A second call is a no-op, which keeps tests that share a process happy.
///
/// ```ignore
/// #[instrument(skip(collection), fields(sku = %sku))]
/// async fn find_by_sku(collection: &Collection<Document>, sku: &str) -> eyre::Result<Option<Document>> {
///     collection
///         .find_one(doc! { "sku": sku })
///         .await
///         .wrap_err("Failed to fetch product")
/// }
/// ```
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(environment)));

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(()) => info!(?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_directives_quiet_the_driver() {
        let directives = default_directives(&Environment::Production);
        assert!(directives.starts_with("info"));
        assert!(directives.contains("mongodb=warn"));
    }

    #[test]
    fn test_development_directives_are_verbose() {
        assert!(default_directives(&Environment::Development).starts_with("debug"));
    }

    #[test]
    fn test_default_directives_parse() {
        for env in [Environment::Development, Environment::Production] {
            assert!(EnvFilter::try_new(default_directives(&env)).is_ok());
        }
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(&Environment::Development);
        init_tracing(&Environment::Production);
    }

    #[test]
    fn test_init_tracing_honours_rust_log() {
        temp_env::with_var("RUST_LOG", Some("domain_catalog=trace"), || {
            init_tracing(&Environment::Production);
        });
    }
}
