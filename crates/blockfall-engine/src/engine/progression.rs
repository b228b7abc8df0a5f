//! Scoring, level, and gravity-speed rules.
//!
//! All functions here are pure. The session feeds them the values it tracks
//! and applies the results.

use std::time::Duration;

/// Base points for a line clear, indexed by the number of rows removed at once.
///
/// - 0 rows: 0 points
/// - 1 row: 100 points
/// - 2 rows: 300 points
/// - 3 rows: 500 points
/// - 4 rows: 800 points
pub const SCORE_TABLE: [u32; 5] = [0, 100, 300, 500, 800];

/// Number of cleared lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Gravity interval at level 1.
pub const BASE_DROP_INTERVAL: Duration = Duration::from_millis(1000);
/// Amount the gravity interval shrinks per level.
pub const DROP_INTERVAL_STEP: Duration = Duration::from_millis(50);
/// Fastest gravity interval, reached at level 20.
pub const MIN_DROP_INTERVAL: Duration = Duration::from_millis(50);

/// Returns the points awarded for clearing `rows` lines at once at `level`.
///
/// Counts above four cannot come from a single tetromino and are scored as a
/// four-line clear.
///
/// # Example
///
/// ```
/// use blockfall_engine::line_clear_score;
///
/// assert_eq!(line_clear_score(1, 1), 200);
/// assert_eq!(line_clear_score(4, 2), 2400);
/// assert_eq!(line_clear_score(0, 5), 0);
/// ```
#[must_use]
pub fn line_clear_score(rows: usize, level: u32) -> u32 {
    let base = SCORE_TABLE[rows.min(SCORE_TABLE.len() - 1)];
    base.saturating_mul(level.saturating_add(1))
}

/// Returns the level reached after clearing `total_lines` lines. Levels start at 1.
#[must_use]
pub const fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Returns the automatic drop interval for `level`.
///
/// Starts at one second and shrinks linearly until it bottoms out at 50 ms.
/// Level 0 is treated as level 1.
#[must_use]
pub fn drop_interval(level: u32) -> Duration {
    let speedup = DROP_INTERVAL_STEP.saturating_mul(level.saturating_sub(1));
    BASE_DROP_INTERVAL
        .saturating_sub(speedup)
        .max(MIN_DROP_INTERVAL)
}
