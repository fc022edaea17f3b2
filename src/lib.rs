#![doc(test(attr(deny(warnings))))]

//! Obligation Core computes schedule and ledger facts for recurring obligations:
//! expected due dates, paid versus missing periods, running balances with loan
//! interest, and the next due date. The engine is pure; persistence sits behind
//! the [`storage::ObligationSource`] boundary.

pub mod batch;
pub mod config;
pub mod errors;
pub mod obligation;
pub mod storage;
pub mod utils;

pub use errors::{EngineError, EngineResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup info log.
pub fn init() {
    init_with(&config::EngineConfig::default());
}

/// Same as [`init`], using the log filter of a loaded configuration.
pub fn init_with(config: &config::EngineConfig) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(&config.log_filter);
        tracing::info!("Obligation Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
