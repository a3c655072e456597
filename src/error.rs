//! Error types for bloom-bot.

use uuid::Uuid;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Engine(#[from] EngineError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Wizard engine errors.
///
/// `Validation` and `StaleInput` are recoverable: the dispatcher re-prompts
/// the current step without touching session state.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No wizard is active for this session")]
    NoActiveWizard,

    #[error("Stale input: step {got} no longer matches current step {expected}")]
    StaleInput { expected: String, got: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unknown step {step} in wizard {wizard}")]
    UnknownStep { wizard: String, step: String },
}

/// Cart and order lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("No delivery address set")]
    MissingAddress,

    #[error("Cart index {index} out of range (cart has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Order {id} cannot transition from {from} to {to}")]
    InvalidTransition { id: Uuid, from: String, to: String },

    #[error("Order {id} not found")]
    OrderNotFound { id: Uuid },
}

/// Failures from external collaborators (AI, payment, geocoding).
///
/// Always recovered locally with a fallback path; never crashes an event.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Recommendation service failed: {0}")]
    Recommendation(String),

    #[error("Payment provider failed for order {order_id}: {reason}")]
    Payment { order_id: Uuid, reason: String },

    #[error("Geocoder failed: {0}")]
    Geocode(String),
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open storage: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Channel (presentation layer) errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
