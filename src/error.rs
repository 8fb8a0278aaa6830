//! Error types. None of these escape `resolve`, `setup` or `shape`; they are
//! recovered where they occur and surface only in logs and tests.

use thiserror::Error;

/// Why a font candidate was skipped.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to fetch font from {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("font '{family}' could not be decoded: {reason}")]
    Decode { family: String, reason: String },

    #[error("font '{family}' was rejected by the document: {reason}")]
    Register { family: String, reason: String },
}

impl FontError {
    pub fn fetch(location: impl Into<String>, reason: impl ToString) -> Self {
        FontError::Fetch {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(family: impl Into<String>, reason: impl ToString) -> Self {
        FontError::Decode {
            family: family.into(),
            reason: reason.to_string(),
        }
    }

    pub fn register(family: impl Into<String>, reason: impl ToString) -> Self {
        FontError::Register {
            family: family.into(),
            reason: reason.to_string(),
        }
    }
}

/// Input the glyph shaper refuses to reshape.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShapingError {
    #[error("replacement character at offset {0}")]
    ReplacementCharacter(usize),

    #[error("control character U+{code:04X} at offset {offset}")]
    ControlCharacter { code: u32, offset: usize },

    #[error("unbalanced directional isolates or embeddings")]
    UnbalancedIsolates,
}
