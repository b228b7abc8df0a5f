use serde::Serialize;

use super::progression::level_for_lines;

/// Running totals for a game session.
///
/// Tracks various metrics during a game session:
///
/// - **Score**: Points committed from completed line clears
/// - **Level**: Derived from total lines cleared (starts at 1, +1 per 10 lines)
/// - **Completed pieces**: Total number of pieces locked
/// - **Line clear distribution**: Count of locks by rows cleared
///
/// Locking a piece and committing its line clear are separate steps, since
/// the session holds cleared rows on screen until the renderer finishes its
/// animation. A lock is counted immediately; lines and score only when the
/// clear completes.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.record_lock(4);
/// stats.commit_line_clear(4, 1600);
///
/// assert_eq!(stats.score(), 1600);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GameStats {
    score: u32,
    completed_pieces: u32,
    total_cleared_lines: u32,
    line_cleared_counter: [u32; 5],
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    /// Returns the committed score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Returns the current level based on total lines cleared.
    #[must_use]
    pub const fn level(&self) -> u32 {
        level_for_lines(self.total_cleared_lines)
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> u32 {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> u32 {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by rows cleared.
    ///
    /// Array indices represent:
    /// - `[0]`: Number of locks with 0 lines cleared
    /// - `[1]`: Number of singles (1 line)
    /// - `[2]`: Number of doubles (2 lines)
    /// - `[3]`: Number of triples (3 lines)
    /// - `[4]`: Number of tetrises (4 lines)
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u32; 5] {
        &self.line_cleared_counter
    }

    /// Counts a piece lock that cleared `cleared_lines` rows.
    pub fn record_lock(&mut self, cleared_lines: usize) {
        self.completed_pieces = self.completed_pieces.saturating_add(1);
        let bucket = cleared_lines.min(self.line_cleared_counter.len() - 1);
        self.line_cleared_counter[bucket] = self.line_cleared_counter[bucket].saturating_add(1);
    }

    /// Commits the lines and points of a finished line clear.
    pub fn commit_line_clear(&mut self, cleared_lines: usize, points: u32) {
        let lines = u32::try_from(cleared_lines).unwrap_or(u32::MAX);
        self.total_cleared_lines = self.total_cleared_lines.saturating_add(lines);
        self.score = self.score.saturating_add(points);
    }
}
