//! Engine property keys and values.

use strum_macros::{Display, EnumString};

use crate::audio::AudioFormat;

/// The properties the engine exposes.
///
/// Host-side callers address these by string (`"pitch"`, `"rate"`,
/// `"volume"`, `"format"`); anything else is an unsupported property.
/// `Format` is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PropertyKey {
    /// Voice pitch.
    Pitch,

    /// Speech rate (speed).
    Rate,

    /// Output volume.
    Volume,

    /// Native output format descriptor (read-only).
    Format,
}

/// A property read result — scalar for pitch/rate/volume, a format
/// descriptor for `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    Scalar(i32),
    Format(AudioFormat),
}

impl PropertyValue {
    /// The scalar value, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<i32> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Format(_) => None,
        }
    }
}
