//! The engine handle — creation, properties, the speak bridge, teardown.

use std::ffi::CString;
use std::panic::resume_unwind;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::audio::{AudioChunk, IntoDecision, PICO_NATIVE_FORMAT, TtsAudio};
use crate::backend::EngineBackend;
use crate::bridge::ChunkBridge;
use crate::error::TtsError;
use crate::host::HostGuard;
use crate::property::{PropertyKey, PropertyValue};

#[cfg(feature = "pico")]
use crate::backend::pico::PicoBackend;
#[cfg(feature = "pico")]
use crate::config::EngineConfig;

/// How a [`speak`](TtsEngine::speak) call ended. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// The engine synthesized the whole utterance and signalled the final
    /// chunk.
    Completed,

    /// The handler requested an early stop; the engine ceased production.
    Stopped,
}

/// A handle to a live synthesis engine instance.
///
/// Cloning is cheap and clones refer to the same engine. The underlying
/// engine is destroyed exactly once — either through [`close`](Self::close)
/// or when the last clone drops — and never while a `speak` call is in
/// flight, which holds its own reference for the duration of the call.
///
/// A single handle supports one `speak` at a time; the interleaving of
/// concurrent `speak` calls on the same handle is undefined. Property
/// accessors are meant to be used between `speak` calls, and
/// [`stop`](Self::stop) may be called from another thread while a `speak`
/// is in flight.
#[derive(Clone)]
pub struct TtsEngine {
    shared: Arc<EngineShared>,
}

struct EngineShared {
    /// `None` once the handle has been closed. The `Arc` inside is the
    /// lifetime guard: an in-flight `speak` clones it, so the engine's
    /// destructor runs only after the call has returned.
    backend: Mutex<Option<Arc<dyn EngineBackend>>>,
}

impl TtsEngine {
    /// Create an engine from the native SVOX Pico library.
    ///
    /// Tries each voice-data directory from
    /// [`EngineConfig::candidate_dirs`] in order and keeps the first engine
    /// that initializes. Fails with [`TtsError::Initialization`] when no
    /// candidate accepts the requested language.
    #[cfg(feature = "pico")]
    pub fn create(config: &EngineConfig) -> Result<Self, TtsError> {
        let mut searched = Vec::new();
        for dir in config.candidate_dirs() {
            match PicoBackend::create(&dir, &config.language) {
                Ok(backend) => {
                    tracing::info!(
                        language = %config.language,
                        lang_dir = %dir.display(),
                        "TTS engine initialized"
                    );
                    return Ok(Self::from_backend(backend));
                }
                Err(TtsError::Initialization { .. }) => {
                    tracing::warn!(
                        language = %config.language,
                        lang_dir = %dir.display(),
                        "no usable voice data, trying next directory"
                    );
                    searched.push(dir);
                }
                Err(other) => return Err(other),
            }
        }
        Err(TtsError::Initialization {
            language: config.language.clone(),
            searched,
        })
    }

    /// Wrap an already-constructed engine backend.
    ///
    /// The seam for alternative engines and for mock-driven tests.
    pub fn from_backend(backend: impl EngineBackend + 'static) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                backend: Mutex::new(Some(Arc::new(backend))),
            }),
        }
    }

    /// Release the engine.
    ///
    /// After this, every operation on this handle (and on all clones) fails
    /// with [`TtsError::InvalidHandle`] — including a second `close`. The
    /// native destroy runs when the last outstanding reference drops, so a
    /// `speak` still in flight on another thread finishes safely first.
    pub fn close(&self) -> Result<(), TtsError> {
        match self.shared.backend.lock().take() {
            Some(_backend) => {
                tracing::info!("TTS engine closed");
                Ok(())
            }
            None => Err(TtsError::InvalidHandle),
        }
    }

    fn live(&self) -> Result<Arc<dyn EngineBackend>, TtsError> {
        self.shared
            .backend
            .lock()
            .as_ref()
            .map(Arc::clone)
            .ok_or(TtsError::InvalidHandle)
    }

    /// Read a property by its host-side key.
    ///
    /// `"format"` answers the constant [`PICO_NATIVE_FORMAT`] contract; it is
    /// not queried from the engine.
    pub fn get_property(&self, key: &str) -> Result<PropertyValue, TtsError> {
        let backend = self.live()?;
        let parsed: PropertyKey = key
            .parse()
            .map_err(|_| TtsError::UnsupportedProperty(key.to_string()))?;
        Ok(match parsed {
            PropertyKey::Pitch => PropertyValue::Scalar(backend.pitch()),
            PropertyKey::Rate => PropertyValue::Scalar(backend.rate()),
            PropertyKey::Volume => PropertyValue::Scalar(backend.volume()),
            PropertyKey::Format => PropertyValue::Format(PICO_NATIVE_FORMAT),
        })
    }

    /// Set a property by its host-side key; returns the value the engine
    /// actually applied (engines may clamp).
    ///
    /// `"format"` is read-only and fails with
    /// [`TtsError::UnsupportedProperty`], as do unknown keys.
    pub fn set_property(&self, key: &str, value: i32) -> Result<i32, TtsError> {
        let backend = self.live()?;
        let parsed: PropertyKey = key
            .parse()
            .map_err(|_| TtsError::UnsupportedProperty(key.to_string()))?;
        let applied = apply_scalar(backend.as_ref(), parsed, value)
            .ok_or_else(|| TtsError::UnsupportedProperty(key.to_string()))?;
        tracing::debug!(property = %parsed, requested = value, applied, "engine property set");
        Ok(applied)
    }

    /// Current pitch.
    pub fn pitch(&self) -> Result<i32, TtsError> {
        Ok(self.live()?.pitch())
    }

    /// Current speech rate.
    pub fn rate(&self) -> Result<i32, TtsError> {
        Ok(self.live()?.rate())
    }

    /// Current volume.
    pub fn volume(&self) -> Result<i32, TtsError> {
        Ok(self.live()?.volume())
    }

    /// Set pitch, failing with [`TtsError::PropertyOutOfRange`] if the
    /// engine clamps the requested value.
    pub fn set_pitch(&self, value: i32) -> Result<(), TtsError> {
        self.set_exact(PropertyKey::Pitch, value)
    }

    /// Set speech rate, failing if the engine clamps the requested value.
    pub fn set_rate(&self, value: i32) -> Result<(), TtsError> {
        self.set_exact(PropertyKey::Rate, value)
    }

    /// Set volume, failing if the engine clamps the requested value.
    pub fn set_volume(&self, value: i32) -> Result<(), TtsError> {
        self.set_exact(PropertyKey::Volume, value)
    }

    fn set_exact(&self, property: PropertyKey, requested: i32) -> Result<(), TtsError> {
        let backend = self.live()?;
        let applied = apply_scalar(backend.as_ref(), property, requested)
            .ok_or_else(|| TtsError::UnsupportedProperty(property.to_string()))?;
        if applied == requested {
            Ok(())
        } else {
            Err(TtsError::PropertyOutOfRange {
                property,
                requested,
                applied,
            })
        }
    }

    /// Synthesize `text`, streaming chunks to `handler`.
    ///
    /// Blocks until the utterance completes, the handler stops it, or the
    /// engine fails. The caller's host lock is released for the duration of
    /// the engine call and transiently re-acquired around each handler
    /// invocation, so other host threads make progress while raw synthesis
    /// runs.
    ///
    /// The handler receives each [`AudioChunk`] in production order and
    /// answers with anything convertible [`IntoDecision`]; returning no
    /// explicit signal (`()` or `None`) means continue. After a stop
    /// decision the handler is not invoked again within this call.
    ///
    /// A panic in the handler is caught at the bridge (never unwound into
    /// the engine), the engine is told to stop, and the panic resumes from
    /// here once the lock has been re-acquired.
    pub fn speak<H, D>(
        &self,
        guard: &mut HostGuard<'_>,
        text: &str,
        mut handler: H,
    ) -> Result<SpeakOutcome, TtsError>
    where
        H: FnMut(AudioChunk<'_>) -> D,
        D: IntoDecision,
    {
        let backend = self.live()?;
        // Reject text the engine boundary cannot represent before touching
        // the engine or the lock.
        CString::new(text)?;

        tracing::debug!(text_len = text.len(), "starting synthesis");

        let mut adapted = |chunk: AudioChunk<'_>| handler(chunk).into_decision();
        let mut bridge = ChunkBridge::new(&mut adapted);

        let ok = guard.suspended(|handoff| {
            backend.speak(text, &mut |chunk| bridge.deliver(handoff, chunk))
        });

        if let Some(payload) = bridge.take_panic() {
            resume_unwind(payload);
        }

        let outcome = if bridge.stop_requested() {
            SpeakOutcome::Stopped
        } else if ok {
            SpeakOutcome::Completed
        } else {
            return Err(TtsError::Synthesis);
        };
        tracing::debug!(?outcome, final_seen = bridge.saw_final(), "synthesis finished");
        Ok(outcome)
    }

    /// Synthesize `text` and collect the whole utterance.
    ///
    /// The callback-less convenience: accumulates every chunk and returns
    /// the assembled PCM audio.
    pub fn synthesize(&self, guard: &mut HostGuard<'_>, text: &str) -> Result<TtsAudio, TtsError> {
        let mut data = Vec::new();
        let mut sample_rate = PICO_NATIVE_FORMAT.sample_rate;
        let mut channels = PICO_NATIVE_FORMAT.channels;
        self.speak(guard, text, |chunk: AudioChunk<'_>| {
            sample_rate = chunk.sample_rate;
            channels = chunk.channels;
            data.extend_from_slice(chunk.data);
        })?;
        Ok(TtsAudio {
            data,
            sample_rate,
            channels,
        })
    }

    /// Request early termination of an in-flight `speak` on this engine.
    ///
    /// Advisory: the engine checks for the signal between chunks, so there
    /// is no guaranteed immediacy. Callable from another thread. Whether the
    /// native engine synchronizes `stop` with a chunk callback running at
    /// that instant is undefined upstream; this layer adds no guarantee of
    /// its own.
    pub fn stop(&self) -> Result<(), TtsError> {
        let backend = self.live()?;
        backend.stop();
        Ok(())
    }
}

/// Apply a scalar property write, or `None` for read-only `format`.
fn apply_scalar(backend: &dyn EngineBackend, key: PropertyKey, value: i32) -> Option<i32> {
    match key {
        PropertyKey::Pitch => Some(backend.set_pitch(value)),
        PropertyKey::Rate => Some(backend.set_rate(value)),
        PropertyKey::Volume => Some(backend.set_volume(value)),
        PropertyKey::Format => None,
    }
}
