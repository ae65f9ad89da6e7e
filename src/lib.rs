//! SVOX Pico text-to-speech bindings with a streaming synthesis bridge.
//!
//! This crate exposes a native synthesis engine to an embedding scripting
//! host through a narrow binding layer: an owned engine handle, typed
//! get/set over a small property set, and a blocking
//! [`speak`](TtsEngine::speak) call that streams PCM chunks to a
//! caller-supplied handler.
//!
//! The heart of the crate is the handoff between the engine and the host's
//! single interpreter lock. `speak` releases the [`HostLock`] for the
//! duration of the blocking engine call so other host threads keep running,
//! and re-acquires it transiently around each handler invocation:
//!
//! ```text
//! host code (lock held)
//!   └─ speak ── lock released ──► engine synthesizes
//!                                   │ chunk ready
//!                                   ▼
//!                  lock re-acquired for one handler call
//!                                   │ Decision::{Continue, Stop}
//!                                   ▼
//!                  lock released ──► engine continues / ceases
//!   ◄── lock re-acquired ── speak returns
//! ```
//!
//! Handlers answer each chunk with anything convertible [`IntoDecision`];
//! returning no explicit signal means continue. The engine itself is an
//! external collaborator behind the [`backend::EngineBackend`] trait — the
//! `pico` feature provides the native FFI adapter, and tests drive the
//! bridge with scripted mocks.

#![deny(unused_crate_dependencies)]

pub mod audio;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod property;

mod bridge;

// Re-export key types for convenience
pub use audio::{AudioChunk, AudioFormat, Decision, IntoDecision, PICO_NATIVE_FORMAT, TtsAudio};
pub use backend::{ChunkFn, EngineBackend};
pub use config::{EngineConfig, KNOWN_LANGUAGES, SYSTEM_LANG_DIR};
pub use engine::{SpeakOutcome, TtsEngine};
pub use error::TtsError;
pub use host::{Handoff, HostGuard, HostLock};
pub use property::{PropertyKey, PropertyValue};
