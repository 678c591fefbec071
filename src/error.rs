use thiserror::Error;

/// Rejected input or a missing/stale session. Never retried; no store write
/// has happened when one of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("user id must be non-empty")]
    EmptyUserId,
    #[error("no live session for user `{0}`")]
    StaleSession(String),
    #[error("entry name must be non-empty")]
    EmptyName,
    #[error("quantity must be a positive number, got {0}")]
    InvalidQuantity(f64),
    #[error("entry timestamp is not representable as RFC 3339")]
    UnrepresentableTimestamp,
    #[error("profile field `{0}` must be non-empty")]
    EmptyProfileField(&'static str),
    #[error("profile field `{0}` must be a positive number")]
    InvalidProfileField(&'static str),
}

/// Local persistence failure. Non-fatal to `log_item`; surfaced through
/// `LogResult::local_write_ok`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("recent items payload corrupt: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure talking to the authoritative remote store. Kept distinct from
/// validation errors so callers can tell "bad input" from "write pending".
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("remote rejected credentials (status {0})")]
    Auth(u16),
    #[error("remote api error (status {0})")]
    Api(u16),
}

/// Combined error for operations that touch more than one collaborator
/// (resync, profile reads/writes).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
