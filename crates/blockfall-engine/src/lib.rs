pub use self::{config::*, core::*, engine::*, ranking::*};

pub mod config;
pub mod core;
pub mod engine;
pub mod ranking;

/// Error returned when parsing a [`PieceSeed`] from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("invalid hex: expected 32 characters, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid hex: {input:?} contains a non-hexadecimal digit")]
    InvalidDigit { input: String },
}
