//! Credential store: email / password-hash pairs in the `users` collection.
//!
//! Passwords are hashed with Argon2id (default parameters, random 16-byte
//! salt) and stored as PHC strings. Existing bcrypt hashes (`$2a$`, `$2b$`,
//! `$2y$`) in the same field are still verified, so older accounts keep
//! working; new signups always get Argon2id. Hashing and verification are
//! CPU-bound and run on tokio's blocking pool.
//!
//! Registration does not look for an existing account with the same email:
//! a second signup creates a second, independent record, and login checks
//! the first record found.
use std::sync::Arc;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use tracing::{debug, info};

use crate::backend::{from_document, to_document, DocumentBackend};
use crate::models::User;
use crate::StoreError;

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    NotFound,
    InvalidCredentials,
}

#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn DocumentBackend>,
}

impl CredentialStore {
    pub const COLLECTION: &'static str = "users";

    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Hash `password` and store `{email, password}`. Returns the stored user.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let password_hash = hash_password(password.to_owned()).await?;
        let mut user = User {
            id: None,
            email: email.to_owned(),
            password_hash,
        };
        let id = self
            .backend
            .insert_one(Self::COLLECTION, to_document(&user)?)
            .await?;
        info!(user_id = %id, "user registered");
        user.id = Some(id);
        Ok(user)
    }

    /// Look up `email` and check `password` against the stored hash.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthOutcome, StoreError> {
        let Some(document) = self
            .backend
            .find_one(Self::COLLECTION, "email", email)
            .await?
        else {
            debug!("login for unknown email");
            return Ok(AuthOutcome::NotFound);
        };
        let user: User = from_document(document)?;

        if verify_password(password.to_owned(), user.password_hash).await? {
            Ok(AuthOutcome::Authenticated)
        } else {
            debug!(user_id = ?user.id, "password mismatch");
            Ok(AuthOutcome::InvalidCredentials)
        }
    }
}

async fn hash_password(password: String) -> Result<String, StoreError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(StoreError::hashing)
    })
    .await
    .map_err(StoreError::hashing)?
}

/// `Ok(false)` on a mismatch; a stored hash that cannot be parsed is an error.
async fn verify_password(password: String, stored: String) -> Result<bool, StoreError> {
    tokio::task::spawn_blocking(move || {
        if is_bcrypt(&stored) {
            return bcrypt::verify(password.as_bytes(), &stored).map_err(StoreError::hashing);
        }
        let parsed = PasswordHash::new(&stored).map_err(StoreError::hashing)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(StoreError::hashing(err)),
        }
    })
    .await
    .map_err(StoreError::hashing)?
}

fn is_bcrypt(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| stored.starts_with(prefix))
}
