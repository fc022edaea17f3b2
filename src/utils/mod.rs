pub mod persistence;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "obligation_core=info";

/// Initializes the global tracing subscriber. `RUST_LOG` directives are read first,
/// then `directive` is layered on top; an unparsable directive falls back to `info`.
pub fn init_tracing(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{
            filter::{Directive, LevelFilter},
            fmt, EnvFilter,
        };

        let filter = EnvFilter::from_default_env();
        let filter = match directive.parse::<Directive>() {
            Ok(parsed) => filter.add_directive(parsed),
            Err(_) => filter.add_directive(LevelFilter::INFO.into()),
        };

        // The host application may already own the global subscriber.
        if let Err(err) = fmt().with_env_filter(filter).try_init() {
            tracing::debug!(error = %err, "tracing subscriber already installed; keeping it");
        }
    });
}
