//! Error types for the horas ecosystem.

use thiserror::Error;

/// Errors that can occur during calendar ingestion and tag resolution.
///
/// The sync-relevant classes are kept distinct so callers can branch on them:
/// `SyncTokenExpired` is recovered once by the engine (clear state, full
/// resync), `Provider` is transient and propagates uncaught, and
/// `MissingGenericTask` is a fatal startup condition.
#[derive(Error, Debug)]
pub enum HorasError {
    #[error("Sync token no longer valid, full resync required")]
    SyncTokenExpired,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid calendar time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Fallback task '{0}' not found. Create it before starting ingestion.")]
    MissingGenericTask(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for horas operations.
pub type HorasResult<T> = Result<T, HorasError>;
