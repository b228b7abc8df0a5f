//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::PieceSeed;

/// Strategy used to draw the next piece kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Randomizer {
    /// Independent uniform draw per piece.
    #[default]
    Uniform,
    /// Shuffled bags of all seven kinds.
    SevenBag,
}

/// Settings a session is started with, kept across resets.
///
/// Missing fields fall back to their defaults when loading from JSON, so
/// `{}` is a valid configuration.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Randomizer, SessionConfig};
///
/// let config: SessionConfig = serde_json::from_str(
///     r#"{ "seed": "000000000000000000000000000000ff", "randomizer": "seven-bag" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.randomizer, Randomizer::SevenBag);
/// assert_eq!(config.seed.map(|s| s.to_u128()), Some(0xff));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the piece generator. `None` draws a fresh seed for every
    /// session, including each reset.
    pub seed: Option<PieceSeed>,
    pub randomizer: Randomizer,
}

impl SessionConfig {
    #[must_use]
    pub fn with_seed(self, seed: PieceSeed) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    #[must_use]
    pub fn with_randomizer(self, randomizer: Randomizer) -> Self {
        Self { randomizer, ..self }
    }
}
