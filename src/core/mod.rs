//! Core infrastructure module for StreamBoost.
//!
//! - [`types`]: Fundamental data types and enumerations
//! - [`constants`]: Numeric constants and configuration defaults
//! - [`error`]: Error type and result alias
//! - [`traits`]: The weak learner capability trait

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Result, StreamBoostError};
pub use traits::*;
pub use types::*;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initialize logging for the library.
///
/// Installs `env_logger`, defaulting to the `info` level when `RUST_LOG` is
/// unset. Safe to call any number of times.
pub fn initialize_core() -> Result<()> {
    LOGGING_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        // A logger installed by the host application takes precedence.
        let _ = env_logger::Builder::from_env(env).try_init();
        log::debug!("StreamBoost core initialized");
    });
    Ok(())
}

/// Check if the core has been initialized
pub fn is_core_initialized() -> bool {
    LOGGING_INIT.is_completed()
}
