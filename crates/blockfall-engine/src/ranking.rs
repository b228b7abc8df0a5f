//! High-score boundary between a finished session and score storage.
//!
//! The engine only produces a [`HighScoreEntry`] when a game ends, stamped
//! with a time the host supplies. Deciding where it ranks and keeping the
//! table is the job of a collaborator that implements [`ScoreRanking`];
//! [`candidate_rank`] is the pure rule such a collaborator applies.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final result of a game, produced by the session once it is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Where an entry landed in a bounded high-score table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// 1-based position in the table.
    Ranked(NonZeroUsize),
    /// The entry did not make the table.
    Unranked,
}

impl Rank {
    /// Returns the 1-based position, if ranked.
    #[must_use]
    pub fn position(self) -> Option<usize> {
        match self {
            Rank::Ranked(position) => Some(position.get()),
            Rank::Unranked => None,
        }
    }
}

/// Computes the rank `score` would take in a table holding `existing` scores.
///
/// A new score ranks after every existing score greater than or equal to it,
/// so ties keep the earlier entry ahead. A rank beyond `capacity` is
/// [`Rank::Unranked`], as is every score when `capacity` is 0.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Rank, candidate_rank};
///
/// let table = [5000, 3000, 3000, 1000];
/// assert_eq!(candidate_rank(table, 3000, 10).position(), Some(4));
/// assert_eq!(candidate_rank(table, 9000, 10).position(), Some(1));
/// assert_eq!(candidate_rank(table, 500, 4), Rank::Unranked);
/// ```
#[must_use]
pub fn candidate_rank<I>(existing: I, score: u32, capacity: usize) -> Rank
where
    I: IntoIterator<Item = u32>,
{
    let ahead = existing.into_iter().filter(|&other| other >= score).count();
    let position = ahead + 1;
    if position > capacity {
        return Rank::Unranked;
    }
    NonZeroUsize::new(position).map_or(Rank::Unranked, Rank::Ranked)
}

/// Collaborator that stores finished games and reports their rank.
pub trait ScoreRanking {
    /// Storage failure reported by the collaborator.
    type Error;

    /// Records `entry` and returns the rank it took.
    fn submit(&mut self, entry: HighScoreEntry) -> Result<Rank, Self::Error>;
}
