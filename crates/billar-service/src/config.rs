//! # Service Configuration
//!
//! Runtime settings loaded from environment variables with sensible
//! defaults, so a bare `demo` run works without any setup.
//!
//! ## Environment Variables
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────┐
//! │ Variable                     │ Default                              │
//! ├──────────────────────────────┼──────────────────────────────────────┤
//! │ BILLAR_DATABASE_PATH         │ ./billar.db                          │
//! │ BILLAR_BUSINESS_NAME         │ Club de Billar                       │
//! │ BILLAR_BOOTSTRAP_USER        │ admin                                │
//! │ BILLAR_BOOTSTRAP_PASSWORD    │ billar-dev-change-in-production      │
//! │ BILLAR_PBKDF2_ITERATIONS     │ 260000 (also the enforced minimum)   │
//! └──────────────────────────────┴──────────────────────────────────────┘
//! ```

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Floor for the PBKDF2 iteration count. `load` rejects anything lower;
/// accounts hashed earlier under a higher count keep their own.
pub const MIN_PBKDF2_ITERATIONS: u32 = 260_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("BILLAR_PBKDF2_ITERATIONS must be at least {minimum}")]
    IterationsTooLow { minimum: u32 },
}

/// Service runtime configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file path.
    pub database_path: PathBuf,

    /// Business name printed on receipts and report headers.
    pub business_name: String,

    /// Bootstrap username. This pair logs in even on an empty users
    /// table, so a fresh install can always be administered.
    pub bootstrap_user: String,

    /// Bootstrap password. The default is for development only; set
    /// `BILLAR_BOOTSTRAP_PASSWORD` in production.
    pub bootstrap_password: String,

    /// PBKDF2-HMAC-SHA256 iteration count for newly hashed passwords.
    pub pbkdf2_iterations: u32,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// ## Errors
    /// Returns `ConfigError` if a numeric variable fails to parse or the
    /// iteration count is below [`MIN_PBKDF2_ITERATIONS`].
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServiceConfig {
            database_path: env::var("BILLAR_DATABASE_PATH")
                .unwrap_or_else(|_| "./billar.db".to_string())
                .into(),
            business_name: env::var("BILLAR_BUSINESS_NAME")
                .unwrap_or_else(|_| "Club de Billar".to_string()),
            bootstrap_user: env::var("BILLAR_BOOTSTRAP_USER")
                .unwrap_or_else(|_| "admin".to_string()),
            bootstrap_password: env::var("BILLAR_BOOTSTRAP_PASSWORD")
                .unwrap_or_else(|_| "billar-dev-change-in-production".to_string()),
            pbkdf2_iterations: env::var("BILLAR_PBKDF2_ITERATIONS")
                .unwrap_or_else(|_| MIN_PBKDF2_ITERATIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BILLAR_PBKDF2_ITERATIONS".to_string()))?,
        };

        if config.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(ConfigError::IterationsTooLow {
                minimum: MIN_PBKDF2_ITERATIONS,
            });
        }

        Ok(config)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./billar.db"),
            business_name: "Club de Billar".to_string(),
            bootstrap_user: "admin".to_string(),
            bootstrap_password: "billar-dev-change-in-production".to_string(),
            pbkdf2_iterations: MIN_PBKDF2_ITERATIONS,
        }
    }
}
