//! Error types and failure classification for the lookup crate.
//!
//! This module provides:
//! - [`LookupError`]: Terminal per-identifier errors raised inside a worker
//! - [`FailureReason`]: The closed failure taxonomy written to the failure sink
//! - [`PipelineError`]: Setup and I/O errors that can fail a whole run

mod reason;

pub use reason::FailureReason;

use thiserror::Error;

/// Errors that end the lookup of a single identifier.
///
/// Every variant is terminal for its identifier and is converted into a
/// `LookupOutcome::Failed` by the worker. None of them abort the pipeline.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The request could not be sent or did not complete in time.
    /// Never retried.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider being called
        provider: String,
        /// The underlying client error
        message: String,
    },

    /// The provider kept answering "too many requests" after the single retry.
    #[error("Throttled: {provider} - {status}")]
    Throttled {
        /// The provider that throttled the request
        provider: String,
        /// Status text of the last response
        status: String,
    },

    /// Non-success status, empty item list, or a body that could not be parsed.
    #[error("Provider error: {provider} - {message}")]
    Provider {
        /// The provider that returned the error
        provider: String,
        /// Status and message reported by the provider
        message: String,
    },

    /// The response was usable but no allow-listed offer produced a positive
    /// price and no fallback applied.
    #[error("No approved offer: {message}")]
    NoApprovedOffer {
        /// Description of what was seen
        message: String,
    },
}

impl LookupError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelfprice_lookup::errors::{FailureReason, LookupError};
    ///
    /// let error = LookupError::Throttled {
    ///     provider: "UPCITEMDB".to_string(),
    ///     status: "429 Too Many Requests".to_string(),
    /// };
    /// assert_eq!(error.reason(), FailureReason::ThrottledThenFailed);
    /// ```
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Transport { .. } => FailureReason::Transport,
            Self::Throttled { .. } => FailureReason::ThrottledThenFailed,
            Self::Provider { .. } => FailureReason::ProviderError,
            Self::NoApprovedOffer { .. } => FailureReason::NoApprovedOffer,
        }
    }

    /// Free-form provider status text carried into the failure record.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Transport { message, .. } => message.clone(),
            Self::Throttled { status, .. } => status.clone(),
            Self::Provider { message, .. } => message.clone(),
            Self::NoApprovedOffer { message } => message.clone(),
        }
    }
}

/// Errors that prevent a pipeline run from starting or completing.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the identifier source or opening a sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The shared HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configuration value is missing or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A sink could not be written or flushed.
    #[error("Sink error: {0}")]
    Sink(String),
}
