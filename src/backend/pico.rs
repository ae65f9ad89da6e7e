//! SVOX Pico engine adapter — implements [`EngineBackend`] over the native
//! `tts_engine.h` interface.
//!
//! The native engine pushes chunks through a C callback registered at
//! creation time; each `speak` call threads a user-context pointer through
//! to that callback. [`chunk_trampoline`] unpacks the context back into the
//! Rust delivery closure and translates its [`Decision`] into the `bool` the
//! engine expects. The bridge guarantees the closure never unwinds, so no
//! panic can cross the C frame.

#![allow(unsafe_code)]

use std::ffi::{CString, c_int, c_void};
use std::path::Path;

use crate::audio::{AudioChunk, Decision};
use crate::backend::{ChunkFn, EngineBackend};
use crate::error::TtsError;

#[allow(non_camel_case_types, non_snake_case)]
mod ffi {
    use std::ffi::{c_char, c_int, c_void};

    /// Opaque native engine instance.
    #[repr(C)]
    pub struct TTS_Engine {
        _private: [u8; 0],
    }

    pub type ChunkCallback = unsafe extern "C" fn(
        user: *mut c_void,
        rate: u32,
        format: u32,
        channels: c_int,
        audio: *const u8,
        audio_bytes: u32,
        is_final: bool,
    ) -> bool;

    #[link(name = "ttspico")]
    unsafe extern "C" {
        pub fn TtsEngine_Create(
            lang_dir: *const c_char,
            language: *const c_char,
            callback: ChunkCallback,
        ) -> *mut TTS_Engine;
        pub fn TtsEngine_Destroy(engine: *mut TTS_Engine);
        pub fn TtsEngine_GetPitch(engine: *mut TTS_Engine) -> c_int;
        pub fn TtsEngine_SetPitch(engine: *mut TTS_Engine, pitch: c_int) -> c_int;
        pub fn TtsEngine_GetRate(engine: *mut TTS_Engine) -> c_int;
        pub fn TtsEngine_SetRate(engine: *mut TTS_Engine, rate: c_int) -> c_int;
        pub fn TtsEngine_GetVolume(engine: *mut TTS_Engine) -> c_int;
        pub fn TtsEngine_SetVolume(engine: *mut TTS_Engine, volume: c_int) -> c_int;
        pub fn TtsEngine_Speak(
            engine: *mut TTS_Engine,
            text: *const c_char,
            user: *mut c_void,
        ) -> bool;
        pub fn TtsEngine_Stop(engine: *mut TTS_Engine);
    }
}

/// The chunk callback registered with the native engine.
///
/// `user` is always the `&mut ChunkFn` that [`PicoBackend::speak`] passed to
/// `TtsEngine_Speak`; the buffer is only borrowed for this invocation.
unsafe extern "C" fn chunk_trampoline(
    user: *mut c_void,
    rate: u32,
    format: u32,
    channels: c_int,
    audio: *const u8,
    audio_bytes: u32,
    is_final: bool,
) -> bool {
    let deliver = unsafe { &mut *user.cast::<ChunkFn<'_>>() };
    let data = if audio.is_null() || audio_bytes == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(audio, audio_bytes as usize) }
    };
    let chunk = AudioChunk {
        sample_rate: rate,
        format,
        channels: u16::try_from(channels).unwrap_or(0),
        data,
        is_final,
    };
    (*deliver)(chunk).keep_going()
}

/// A live native Pico engine instance.
pub struct PicoBackend {
    raw: *mut ffi::TTS_Engine,
}

// The engine serializes synthesis internally and the binding layer only runs
// one speak per handle at a time; property and stop entry points are safe to
// call from other threads per the engine contract.
unsafe impl Send for PicoBackend {}
unsafe impl Sync for PicoBackend {}

impl PicoBackend {
    /// Initialize the native engine with voice data from `lang_dir`.
    ///
    /// Fails with [`TtsError::Initialization`] when the engine cannot load
    /// the requested language from that directory; no partial instance is
    /// returned.
    pub fn create(lang_dir: &Path, language: &str) -> Result<Self, TtsError> {
        let lang_dir_c = CString::new(lang_dir.as_os_str().as_encoded_bytes())?;
        let language_c = CString::new(language)?;

        let raw = unsafe {
            ffi::TtsEngine_Create(lang_dir_c.as_ptr(), language_c.as_ptr(), chunk_trampoline)
        };
        if raw.is_null() {
            return Err(TtsError::Initialization {
                language: language.to_string(),
                searched: vec![lang_dir.to_path_buf()],
            });
        }
        Ok(Self { raw })
    }
}

impl EngineBackend for PicoBackend {
    fn pitch(&self) -> i32 {
        unsafe { ffi::TtsEngine_GetPitch(self.raw) }
    }

    fn set_pitch(&self, value: i32) -> i32 {
        unsafe { ffi::TtsEngine_SetPitch(self.raw, value) }
    }

    fn rate(&self) -> i32 {
        unsafe { ffi::TtsEngine_GetRate(self.raw) }
    }

    fn set_rate(&self, value: i32) -> i32 {
        unsafe { ffi::TtsEngine_SetRate(self.raw, value) }
    }

    fn volume(&self) -> i32 {
        unsafe { ffi::TtsEngine_GetVolume(self.raw) }
    }

    fn set_volume(&self, value: i32) -> i32 {
        unsafe { ffi::TtsEngine_SetVolume(self.raw, value) }
    }

    fn speak(&self, text: &str, deliver: ChunkFn<'_>) -> bool {
        // The handle layer validates text before we get here; an interior
        // NUL at this point still must not reach the engine.
        let Ok(text_c) = CString::new(text) else {
            return false;
        };
        let mut deliver = deliver;
        let user = (&raw mut deliver).cast::<c_void>();
        unsafe { ffi::TtsEngine_Speak(self.raw, text_c.as_ptr(), user) }
    }

    fn stop(&self) {
        unsafe { ffi::TtsEngine_Stop(self.raw) }
    }
}

impl Drop for PicoBackend {
    /// The one and only destroy for this instance. The handle layer
    /// guarantees no `speak` is in flight by the time the last reference
    /// drops.
    fn drop(&mut self) {
        unsafe { ffi::TtsEngine_Destroy(self.raw) }
    }
}
