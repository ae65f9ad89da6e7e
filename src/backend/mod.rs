//! Engine backend trait — the consumed synthesis-engine contract.
//!
//! This module defines [`EngineBackend`], the engine-agnostic mirror of the
//! native engine's C-style interface. [`TtsEngine`](crate::TtsEngine)
//! operates on `Arc<dyn EngineBackend>` so that the bridge and lock-handoff
//! logic can be exercised against mock engines, and so alternative native
//! engines can be slotted in without touching the bridge.
//!
//! ## Backend implementations
//!
//! | Feature | Module   | Engine          |
//! |---------|----------|-----------------|
//! | `pico`  | [`pico`] | SVOX Pico (FFI) |

#[cfg(feature = "pico")]
pub mod pico;

use crate::audio::{AudioChunk, Decision};

/// Per-chunk delivery callback handed to [`EngineBackend::speak`].
///
/// The backend calls it once per produced chunk and must honor the returned
/// [`Decision`]: on [`Decision::Stop`] it should cease production and let
/// `speak` return. The chunk's buffer only needs to stay valid for the
/// duration of the call.
pub type ChunkFn<'a> = &'a mut dyn FnMut(AudioChunk<'_>) -> Decision;

/// The narrow contract a synthesis engine exposes to the binding layer.
///
/// Implementations must be `Send + Sync`; a handle may be cloned across
/// threads and [`stop`](Self::stop) is expected to be callable while a
/// `speak` is in flight on another thread. The engine serializes synthesis
/// internally — concurrent `speak` calls on one instance are not a supported
/// configuration.
pub trait EngineBackend: Send + Sync {
    /// Current pitch.
    fn pitch(&self) -> i32;

    /// Set pitch; returns the value the engine actually applied (engines
    /// may clamp).
    fn set_pitch(&self, value: i32) -> i32;

    /// Current speech rate.
    fn rate(&self) -> i32;

    /// Set speech rate; returns the applied value.
    fn set_rate(&self, value: i32) -> i32;

    /// Current volume.
    fn volume(&self) -> i32;

    /// Set volume; returns the applied value.
    fn set_volume(&self, value: i32) -> i32;

    /// Synthesize `text`, blocking until the utterance completes, the
    /// handler stops it, or the engine fails.
    ///
    /// `deliver` is invoked zero or more times, in production order, with
    /// exactly one final chunk in a completed utterance. Returns overall
    /// success; an abort requested through `deliver` still counts as a
    /// normal return for the caller to interpret.
    fn speak(&self, text: &str, deliver: ChunkFn<'_>) -> bool;

    /// Advisory request to end an in-flight `speak` early.
    ///
    /// No immediacy is guaranteed; the engine checks for the signal between
    /// chunks.
    fn stop(&self);
}
