//! Synthesis binding error types.

use std::ffi::NulError;
use std::path::PathBuf;

use crate::property::PropertyKey;

/// Errors that can occur at the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// Engine construction failed in every candidate voice directory.
    ///
    /// Not retryable without a different language or directory.
    #[error("could not initialize TTS engine for language '{language}' (searched {searched:?})")]
    Initialization {
        language: String,
        searched: Vec<PathBuf>,
    },

    /// The handle no longer refers to a live engine instance.
    #[error("engine handle does not refer to a live engine instance")]
    InvalidHandle,

    /// Unknown property key, or a write to a read-only property.
    #[error("unsupported engine property '{0}'")]
    UnsupportedProperty(String),

    /// A strict setter observed the engine clamping the requested value.
    #[error("requested {property} {requested} is outside the accepted range (engine applied {applied})")]
    PropertyOutOfRange {
        property: PropertyKey,
        requested: i32,
        applied: i32,
    },

    /// The text cannot cross the engine boundary (interior NUL byte).
    ///
    /// Detected before any engine interaction begins.
    #[error("text cannot cross the engine boundary: {0}")]
    InvalidText(#[from] NulError),

    /// The engine's speak entry point reported failure.
    ///
    /// Any audio already delivered to the handler stands; there is no
    /// rollback.
    #[error("speech synthesis failed in the engine")]
    Synthesis,
}
