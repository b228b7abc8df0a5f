use std::convert::Infallible;

use blockfall_engine::{HighScoreEntry, Rank, ScoreRanking, candidate_rank};

/// Bounded top-N table of finished games, kept in memory.
///
/// Entries are ordered by score, highest first. An entry tying an existing
/// score is placed after it.
#[derive(Debug, Clone)]
pub struct HighScoreTable {
    capacity: usize,
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }
}

impl ScoreRanking for HighScoreTable {
    type Error = Infallible;

    fn submit(&mut self, entry: HighScoreEntry) -> Result<Rank, Self::Error> {
        let scores = self.entries.iter().map(|e| e.score);
        let rank = candidate_rank(scores, entry.score, self.capacity);
        if let Rank::Ranked(position) = rank {
            self.entries.insert(position.get() - 1, entry);
            self.entries.truncate(self.capacity);
        }
        Ok(rank)
    }
}
