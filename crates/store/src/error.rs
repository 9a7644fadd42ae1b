use thiserror::Error;

/// Errors surfaced by the document stores.
///
/// Every variant is an internal fault from the caller's point of view: a
/// login with the wrong password is an [`AuthOutcome`](crate::AuthOutcome),
/// not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn serialization<E: std::fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    pub fn hashing<E: std::fmt::Display>(err: E) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
