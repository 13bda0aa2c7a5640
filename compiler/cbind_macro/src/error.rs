//! Macro parse errors.
//!
//! Offsets are byte offsets into the (continuation-folded) macro body.

use thiserror::Error;

/// Why a macro body could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty macro body")]
    Empty,

    #[error("unexpected character `{ch}` at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated literal starting at offset {pos}")]
    Unterminated { pos: usize },

    #[error("malformed literal `{text}` at offset {pos}")]
    InvalidLiteral { text: String, pos: usize },

    #[error("integer literal `{text}` at offset {pos} does not fit any supported type")]
    Overflow { text: String, pos: usize },

    #[error("expected {expected} at offset {pos}")]
    Expected { expected: &'static str, pos: usize },

    #[error("unparsed input remains at offset {pos}")]
    TrailingInput { pos: usize },
}
