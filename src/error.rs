//! Parse failures for chord, key and note labels.
//!
//! The engine's public functions never surface these: an unparsable label
//! simply yields `None` or an empty list.  They exist so the `FromStr`
//! impls can say *why* a label was rejected, which ends up in debug logs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty label")]
    Empty,

    #[error("label '{0}' has no quality part")]
    MissingQuality(String),

    #[error("unknown root name '{0}'")]
    UnknownRoot(String),

    #[error("unknown chord quality '{0}'")]
    UnknownQuality(String),

    #[error("unknown scale '{0}'")]
    UnknownScale(String),

    #[error("invalid note name '{0}'")]
    UnknownNoteName(String),
}
