//! # Authentication and Operator Accounts
//!
//! Login, account creation, and the PBKDF2-HMAC-SHA256 password hasher.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          login(username, password)                      │
//! │                                                                         │
//! │  1. Normalize username (trim + lowercase)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Bootstrap pair? ──yes──► admin Session (users table not touched)    │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  3. Look up account ──missing──► AuthFailed                             │
//! │       │ found                                                           │
//! │       ▼                                                                 │
//! │  4. PBKDF2(password, salt, row's iterations), constant-time compare     │
//! │       │                                                                 │
//! │       ├──match──► Session { username, is_admin }                        │
//! │       └──else───► AuthFailed (same message as step 3)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Credential Storage
//!
//! Each account row stores three columns: hex derived key, hex salt, and the
//! iteration count the key was derived with. Verification always uses the
//! row's own count, so raising the configured count only affects new hashes
//! and existing accounts keep working.

use billar_core::validation::{validate_password, validate_username};
use billar_core::User;
use billar_db::{Database, DbError, UserRepository};
use chrono::{DateTime, Utc};
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::{Feedback, ServiceError, ServiceResult};
use crate::session::Session;

/// Derived key length in bytes (SHA-256 output size).
const KEY_LEN: usize = 32;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

// =============================================================================
// Password Hasher
// =============================================================================

/// Freshly derived credential material for one account.
#[derive(Debug, Clone)]
pub struct PasswordCredential {
    /// Hex-encoded 32-byte derived key.
    pub hash_hex: String,
    /// Hex-encoded 16-byte random salt.
    pub salt_hex: String,
    /// Iteration count the key was derived with.
    pub iterations: u32,
}

/// PBKDF2-HMAC-SHA256 hasher with a configured iteration count.
///
/// ## Example
/// ```
/// use billar_service::PasswordHasher;
///
/// let hasher = PasswordHasher::new(260_000);
/// let cred = hasher.hash("1234");
/// assert!(hasher.verify("1234", &cred.hash_hex, &cred.salt_hex, cred.iterations));
/// assert!(!hasher.verify("4321", &cred.hash_hex, &cred.salt_hex, cred.iterations));
/// ```
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        PasswordHasher { iterations }
    }

    /// Hashes a password under a fresh random salt.
    pub fn hash(&self, password: &str) -> PasswordCredential {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let key = pbkdf2_hmac_array::<Sha256, KEY_LEN>(password.as_bytes(), &salt, self.iterations);

        PasswordCredential {
            hash_hex: hex::encode(key),
            salt_hex: hex::encode(salt),
            iterations: self.iterations,
        }
    }

    /// Verifies a password against stored credential columns.
    ///
    /// Derives with the stored row's iteration count, not the configured
    /// one, and compares in constant time. Malformed hex never panics; it
    /// just fails verification.
    pub fn verify(&self, password: &str, hash_hex: &str, salt_hex: &str, iterations: u32) -> bool {
        let salt = match hex::decode(salt_hex) {
            Ok(salt) => salt,
            Err(_) => return false,
        };
        let stored = match hex::decode(hash_hex) {
            Ok(stored) => stored,
            Err(_) => return false,
        };

        let key = pbkdf2_hmac_array::<Sha256, KEY_LEN>(password.as_bytes(), &salt, iterations);

        stored.ct_eq(&key).into()
    }
}

// =============================================================================
// Account Summary
// =============================================================================

/// An account row with the credential columns stripped off.
///
/// This is the only user shape operations hand back; hashes and salts
/// never leave this module.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

impl From<UserSummary> for Feedback {
    fn from(summary: UserSummary) -> Self {
        Feedback::success(format!("Account '{}' created", summary.username))
    }
}

// =============================================================================
// Auth Service
// =============================================================================

/// Login and operator account management.
pub struct AuthService {
    db: Database,
    hasher: PasswordHasher,
    bootstrap_user: String,
    bootstrap_password: String,
}

impl AuthService {
    pub fn new(db: Database, config: &ServiceConfig) -> Self {
        AuthService {
            db,
            hasher: PasswordHasher::new(config.pbkdf2_iterations),
            bootstrap_user: config.bootstrap_user.clone(),
            bootstrap_password: config.bootstrap_password.clone(),
        }
    }

    /// Logs an operator in and returns their session.
    ///
    /// The configured bootstrap pair is checked before the users table, so
    /// it works on an empty database (and survives every account being
    /// deleted). Bootstrap sessions are always admin.
    ///
    /// ## Errors
    /// `AuthFailed` for a wrong username or a wrong password; the message
    /// never says which.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Session> {
        // Normalize only. Login must not reject on charset, otherwise an
        // oddly named legacy account could never sign in.
        let username = username.trim().to_lowercase();

        if username == self.bootstrap_user && password == self.bootstrap_password {
            info!(username = %username, "Bootstrap login");
            return Ok(Session::new(username, true));
        }

        match self.db.users().find_by_username(&username).await? {
            Some(user)
                if self.hasher.verify(
                    password,
                    &user.password_hash,
                    &user.password_salt,
                    user.iterations,
                ) =>
            {
                info!(username = %user.username, "Login");
                Ok(Session::new(user.username, user.is_admin))
            }
            _ => {
                warn!(username = %username, "Login rejected");
                Err(ServiceError::AuthFailed)
            }
        }
    }

    /// Creates an operator account.
    ///
    /// The username is normalized to lowercase before hashing and storage,
    /// so lookups are case-insensitive.
    ///
    /// ## Errors
    /// - `Validation` for a malformed username or a password under 4 chars
    /// - `Duplicate` if the normalized username is already taken
    pub async fn create_user(
        &self,
        session: &Session,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> ServiceResult<UserSummary> {
        let username = validate_username(username)?;
        validate_password(password)?;

        let credential = self.hasher.hash(password);
        let user = User {
            id: UserRepository::generate_user_id(),
            username,
            password_hash: credential.hash_hex,
            password_salt: credential.salt_hex,
            iterations: credential.iterations,
            is_admin,
            created_at: Utc::now(),
        };

        match self.db.users().insert(&user).await {
            Ok(()) => {}
            Err(DbError::UniqueViolation { .. }) => {
                return Err(ServiceError::Duplicate {
                    field: "username".to_string(),
                    value: user.username,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            username = %user.username,
            is_admin = user.is_admin,
            created_by = %session.username,
            "Account created"
        );
        Ok(UserSummary::from(&user))
    }

    /// Lists all accounts, oldest username first, without credentials.
    pub async fn list_users(&self) -> ServiceResult<Vec<UserSummary>> {
        let users = self.db.users().list().await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Deletes an account by id.
    ///
    /// ## Errors
    /// - `NotFound` if no account has that id
    /// - `SelfDeletion` if it is the calling session's own account
    pub async fn delete_user(&self, session: &Session, id: &str) -> ServiceResult<()> {
        let user = self
            .db
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "User".to_string(),
                id: id.to_string(),
            })?;

        if user.username == session.username {
            return Err(ServiceError::SelfDeletion);
        }

        self.db.users().delete(&user.username).await?;
        info!(
            username = %user.username,
            deleted_by = %session.username,
            "Account deleted"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use billar_db::DbConfig;
    use std::path::PathBuf;

    /// Test config with a deliberately low iteration count so the async
    /// tests stay fast; `ServiceConfig::load` would reject this value.
    fn test_config() -> ServiceConfig {
        ServiceConfig {
            database_path: PathBuf::from(":memory:"),
            business_name: "Club de Billar".to_string(),
            bootstrap_user: "admin".to_string(),
            bootstrap_password: "billar-dev-change-in-production".to_string(),
            pbkdf2_iterations: 1_000,
        }
    }

    async fn test_auth() -> AuthService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AuthService::new(db, &test_config())
    }

    // -------------------------------------------------------------------------
    // Hasher
    // -------------------------------------------------------------------------

    #[test]
    fn test_verify_rfc6070_vectors() {
        // RFC 6070-style PBKDF2-HMAC-SHA256 vectors: P="password", S="salt".
        let hasher = PasswordHasher::new(1);
        let salt_hex = hex::encode(b"salt");

        assert!(hasher.verify(
            "password",
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b",
            &salt_hex,
            1,
        ));
        assert!(hasher.verify(
            "password",
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a",
            &salt_hex,
            4096,
        ));
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(1_000);
        let cred = hasher.hash("1234");

        assert_eq!(cred.iterations, 1_000);
        assert_eq!(cred.hash_hex.len(), KEY_LEN * 2);
        assert_eq!(cred.salt_hex.len(), SALT_LEN * 2);

        assert!(hasher.verify("1234", &cred.hash_hex, &cred.salt_hex, cred.iterations));
        assert!(!hasher.verify("4321", &cred.hash_hex, &cred.salt_hex, cred.iterations));
        // Wrong iteration count derives a different key.
        assert!(!hasher.verify("1234", &cred.hash_hex, &cred.salt_hex, 999));
    }

    #[test]
    fn test_each_hash_gets_a_fresh_salt() {
        let hasher = PasswordHasher::new(1_000);
        let a = hasher.hash("same password");
        let b = hasher.hash("same password");

        assert_ne!(a.salt_hex, b.salt_hex);
        assert_ne!(a.hash_hex, b.hash_hex);
    }

    #[test]
    fn test_verify_rejects_malformed_hex() {
        let hasher = PasswordHasher::new(1_000);
        assert!(!hasher.verify("1234", "not hex at all", "73616c74", 1_000));
        assert!(!hasher.verify("1234", "abcd", "zz-bad-salt", 1_000));
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_bootstrap_login_on_empty_database() {
        let auth = test_auth().await;

        let session = auth
            .login("admin", "billar-dev-change-in-production")
            .await
            .unwrap();
        assert_eq!(session.username, "admin");
        assert!(session.is_admin);
    }

    #[tokio::test]
    async fn test_bootstrap_login_wrong_password_fails() {
        let auth = test_auth().await;

        let err = auth.login("admin", "guess").await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthFailed));
    }

    #[tokio::test]
    async fn test_create_user_then_login() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);

        let summary = auth.create_user(&admin, "Caro", "1234", false).await.unwrap();
        assert_eq!(summary.username, "caro");
        assert!(!summary.is_admin);

        // Login normalizes case and whitespace the same way.
        let session = auth.login("  CARO  ", "1234").await.unwrap();
        assert_eq!(session.username, "caro");
        assert!(!session.is_admin);

        let err = auth.login("caro", "9999").await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthFailed));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_identical() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);
        auth.create_user(&admin, "caro", "1234", false).await.unwrap();

        let unknown = auth.login("nobody", "1234").await.unwrap_err();
        let wrong = auth.login("caro", "9999").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates_case_insensitively() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);

        auth.create_user(&admin, "caro", "1234", false).await.unwrap();
        let err = auth
            .create_user(&admin, "CARO", "5678", true)
            .await
            .unwrap_err();

        match err {
            ServiceError::Duplicate { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "caro");
            }
            other => panic!("expected Duplicate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_user_validates_input() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);

        let err = auth
            .create_user(&admin, "has space", "1234", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = auth.create_user(&admin, "ok", "123", false).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    // -------------------------------------------------------------------------
    // Account management
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_users_hides_credentials() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);
        auth.create_user(&admin, "caro", "1234", false).await.unwrap();
        auth.create_user(&admin, "berta", "5678", true).await.unwrap();

        let users = auth.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        // ORDER BY username
        assert_eq!(users[0].username, "berta");
        assert_eq!(users[1].username, "caro");
        assert!(users[0].is_admin);
        assert!(!users[1].is_admin);
    }

    #[tokio::test]
    async fn test_delete_user_by_id() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);
        let caro = auth.create_user(&admin, "caro", "1234", false).await.unwrap();

        auth.delete_user(&admin, &caro.id).await.unwrap();
        assert!(auth.list_users().await.unwrap().is_empty());

        // Deleted accounts can no longer log in.
        let err = auth.login("caro", "1234").await.unwrap_err();
        assert!(matches!(err, ServiceError::AuthFailed));
    }

    #[tokio::test]
    async fn test_delete_own_account_is_refused() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);
        let caro = auth.create_user(&admin, "caro", "1234", false).await.unwrap();

        let session = auth.login("caro", "1234").await.unwrap();
        let err = auth.delete_user(&session, &caro.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::SelfDeletion));

        // Still there, still able to log in.
        assert_eq!(auth.list_users().await.unwrap().len(), 1);
        assert!(auth.login("caro", "1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let auth = test_auth().await;
        let admin = Session::new("admin", true);

        let err = auth.delete_user(&admin, "user-missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
