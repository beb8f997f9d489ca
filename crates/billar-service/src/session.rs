//! # Operator Session
//!
//! Proof of a successful login, passed explicitly into the operations that
//! stamp an acting user on ledger rows. There is no global "current user".

use chrono::{DateTime, Utc};

/// A logged-in operator.
#[derive(Debug, Clone)]
pub struct Session {
    /// Normalized (trimmed, lowercased) username.
    pub username: String,

    /// Whether the account has administrative rights.
    pub is_admin: bool,

    /// When the login happened.
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Session {
            username: username.into(),
            is_admin,
            logged_in_at: Utc::now(),
        }
    }
}
