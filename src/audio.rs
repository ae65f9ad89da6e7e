//! Audio and decision types crossing the synthesis bridge.

use serde::{Deserialize, Serialize};

/// PCM output format descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Bits per sample.
    pub bit_depth: u16,

    /// Channel count.
    pub channels: u16,
}

/// The engine's native output format: 16 kHz, 16-bit, mono.
///
/// This is a constant contract of the binding layer — it is not queried from
/// the engine, and property writes never change it.
pub const PICO_NATIVE_FORMAT: AudioFormat = AudioFormat {
    sample_rate: 16_000,
    bit_depth: 16,
    channels: 1,
};

/// One buffer of synthesized PCM audio, delivered during a single
/// [`speak`](crate::TtsEngine::speak) call.
///
/// The buffer is owned by the engine and is only valid for the duration of
/// the handler invocation that receives it; copy out anything that must
/// outlive the call.
#[derive(Debug, Clone, Copy)]
pub struct AudioChunk<'a> {
    /// Sample rate of this chunk in Hz.
    pub sample_rate: u32,

    /// Engine sample-encoding code for the data in this chunk.
    pub format: u32,

    /// Channel count.
    pub channels: u16,

    /// Raw PCM bytes.
    pub data: &'a [u8],

    /// `true` on the last chunk of the utterance.
    pub is_final: bool,
}

/// A handler's verdict after receiving a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    /// Keep synthesizing.
    #[default]
    Continue,

    /// Cease synthesis; no further chunks are wanted.
    Stop,
}

impl Decision {
    /// The boolean the engine contract expects: `true` to keep producing.
    #[must_use]
    pub fn keep_going(self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// Conversion of handler return values into a [`Decision`].
///
/// A handler that yields no explicit signal means *continue*:
/// `()` and `None` both map to [`Decision::Continue`]. Booleans follow the
/// engine contract — `true` continues, `false` stops.
pub trait IntoDecision {
    fn into_decision(self) -> Decision;
}

impl IntoDecision for Decision {
    fn into_decision(self) -> Decision {
        self
    }
}

impl IntoDecision for () {
    fn into_decision(self) -> Decision {
        Decision::Continue
    }
}

impl IntoDecision for bool {
    fn into_decision(self) -> Decision {
        if self { Decision::Continue } else { Decision::Stop }
    }
}

impl IntoDecision for Option<Decision> {
    fn into_decision(self) -> Decision {
        self.unwrap_or(Decision::Continue)
    }
}

/// A whole collected utterance, as returned by
/// [`synthesize`](crate::TtsEngine::synthesize).
#[derive(Debug, Clone)]
pub struct TtsAudio {
    /// Raw PCM bytes of the full utterance.
    pub data: Vec<u8>,

    /// Sample rate of the audio in Hz.
    pub sample_rate: u32,

    /// Channel count.
    pub channels: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_signal_means_continue() {
        assert_eq!(().into_decision(), Decision::Continue);
        assert_eq!(None::<Decision>.into_decision(), Decision::Continue);
    }

    #[test]
    fn booleans_follow_the_engine_contract() {
        assert_eq!(true.into_decision(), Decision::Continue);
        assert_eq!(false.into_decision(), Decision::Stop);
        assert!(Decision::Continue.keep_going());
        assert!(!Decision::Stop.keep_going());
    }

    #[test]
    fn native_format_is_16khz_16bit_mono() {
        assert_eq!(PICO_NATIVE_FORMAT.sample_rate, 16_000);
        assert_eq!(PICO_NATIVE_FORMAT.bit_depth, 16);
        assert_eq!(PICO_NATIVE_FORMAT.channels, 1);
    }
}
