use std::{mem, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    HighScoreEntry, Rank, ScoreRanking, SessionConfig,
    core::{Board, LineClear, Piece, PieceKind},
};

use super::{
    GameStats,
    piece_generator::PieceGenerator,
    progression::{drop_interval, line_clear_score},
    snapshot::{ActiveSnapshot, GameSnapshot},
};

/// Lifecycle phase of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A discrete player or host request, for callers that route input as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    TogglePause,
    Reset,
    CompleteLineClear,
}

/// Line clear waiting for the renderer to finish its animation.
#[derive(Debug, Clone)]
struct PendingClear {
    line_clear: LineClear,
    points: u32,
}

/// A running game: board, pieces, score, and the state machine around them.
///
/// Every command consumes the session and returns the next one. A holder of
/// an earlier value never sees later changes, which is what lets a renderer
/// keep drawing one frame while the host computes the next.
///
/// # Line clears
///
/// When a lock completes rows, the session does not remove them right away.
/// The merged board (full rows included) stays visible, [`Self::clearing_rows`]
/// lists the rows, and the points are staged as [`Self::pending_score`]. No
/// piece is active and gravity is frozen until the host calls
/// [`Self::complete_line_clear`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{GameSession, SessionConfig};
///
/// let session = GameSession::start(SessionConfig::default());
/// let session = session.tick(Duration::ZERO).tick(Duration::from_secs(1));
/// assert_eq!(session.active_piece().unwrap().position().y(), 0);
///
/// let session = session.hard_drop();
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    generator: PieceGenerator,
    board: Board,
    active: Option<Piece>,
    next: PieceKind,
    stats: GameStats,
    session_state: SessionState,
    pending_clear: Option<PendingClear>,
    drop_anchor: Option<Duration>,
    rank: Option<Rank>,
}

impl GameSession {
    /// Starts a fresh session: empty board, first piece spawned, next piece queued.
    #[must_use]
    pub fn start(config: SessionConfig) -> Self {
        let mut generator = match config.seed {
            Some(seed) => PieceGenerator::with_seed(config.randomizer, seed),
            None => PieceGenerator::new(config.randomizer),
        };
        let first = generator.next_piece();
        let next = generator.next_piece();
        log::debug!(
            "session started with {:?} randomizer, first piece {first:?}",
            generator.randomizer()
        );
        Self {
            config,
            generator,
            board: Board::INITIAL,
            active: Some(Piece::new(first)),
            next,
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            pending_clear: None,
            drop_anchor: None,
            rank: None,
        }
    }

    /// Discards this session and starts a new one with the same configuration.
    #[must_use]
    pub fn reset(self) -> Self {
        log::debug!("session reset at score {}", self.score());
        Self::start(self.config)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the falling piece, or `None` during a line clear and after game over.
    #[must_use]
    pub fn active_piece(&self) -> Option<Piece> {
        self.active
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    /// Returns where the active piece would land on a hard drop.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.active.map(|piece| piece.hard_drop_target(&self.board))
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Returns the committed score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.stats.score()
    }

    /// Returns the points staged by a line clear that has not completed yet.
    #[must_use]
    pub fn pending_score(&self) -> Option<u32> {
        self.pending_clear.as_ref().map(|pending| pending.points)
    }

    /// Returns the committed score plus any staged points.
    #[must_use]
    pub fn provisional_score(&self) -> u32 {
        self.score().saturating_add(self.pending_score().unwrap_or(0))
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    #[must_use]
    pub fn total_lines(&self) -> u32 {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Returns the rows being cleared, bottom-most first, or an empty slice.
    #[must_use]
    pub fn clearing_rows(&self) -> &[usize] {
        self.pending_clear
            .as_ref()
            .map(|pending| pending.line_clear.cleared_rows())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_clearing(&self) -> bool {
        self.pending_clear.is_some()
    }

    /// Returns the final result stamped with `recorded_at`, once the game is over.
    ///
    /// The session never reads the wall clock; the host decides when the
    /// result was recorded.
    #[must_use]
    pub fn high_score_entry(&self, recorded_at: DateTime<Utc>) -> Option<HighScoreEntry> {
        self.session_state.is_game_over().then(|| HighScoreEntry {
            score: self.score(),
            level: self.level(),
            lines: self.total_lines(),
            recorded_at,
        })
    }

    /// Returns the rank reported for this game's result, if recorded.
    #[must_use]
    pub fn rank(&self) -> Option<Rank> {
        self.rank
    }

    /// Captures the current state for rendering or archiving.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.color_grid(),
            active: self.active.map(ActiveSnapshot::from),
            ghost: self.ghost_piece().map(ActiveSnapshot::from),
            next: self.next,
            score: self.score(),
            pending_score: self.pending_score(),
            provisional_score: self.provisional_score(),
            level: self.level(),
            lines: self.total_lines(),
            state: self.session_state,
            clearing_rows: self.clearing_rows().to_vec(),
            rank: self.rank,
        }
    }

    /// Dispatches an [`Intent`] to the matching command.
    ///
    /// # Panics
    ///
    /// Panics on [`Intent::CompleteLineClear`] when no line clear is pending,
    /// like [`Self::complete_line_clear`].
    #[must_use]
    pub fn apply(self, intent: Intent) -> Self {
        match intent {
            Intent::MoveLeft => self.move_left(),
            Intent::MoveRight => self.move_right(),
            Intent::MoveDown => self.move_down(),
            Intent::Rotate => self.rotate(),
            Intent::HardDrop => self.hard_drop(),
            Intent::TogglePause => self.toggle_pause(),
            Intent::Reset => self.reset(),
            Intent::CompleteLineClear => self.complete_line_clear(),
        }
    }

    /// Switches between playing and paused. Has no effect after game over.
    #[must_use]
    pub fn toggle_pause(mut self) -> Self {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => {
                self.drop_anchor = None;
                SessionState::Playing
            }
            SessionState::GameOver => SessionState::GameOver, // No change from game over
        };
        self
    }

    #[must_use]
    pub fn move_left(self) -> Self {
        self.try_replace_active(Piece::left)
    }

    #[must_use]
    pub fn move_right(self) -> Self {
        self.try_replace_active(Piece::right)
    }

    /// Rotates the active piece clockwise, or does nothing if the result collides.
    #[must_use]
    pub fn rotate(self) -> Self {
        self.try_replace_active(Piece::rotated)
    }

    /// Moves the active piece down one row, locking it if the row below is blocked.
    #[must_use]
    pub fn move_down(self) -> Self {
        match self.controllable_piece() {
            Some(piece) => self.step_down(piece),
            None => self,
        }
    }

    /// Drops the active piece straight to its landing position and locks it.
    #[must_use]
    pub fn hard_drop(self) -> Self {
        match self.controllable_piece() {
            Some(piece) => {
                let target = piece.hard_drop_target(&self.board);
                self.lock(target)
            }
            None => self,
        }
    }

    /// Advances gravity to time `now`.
    ///
    /// `now` is any monotonic timestamp chosen by the caller. The first tick
    /// after the session starts, resumes, or finishes a line clear only
    /// records `now` as the reference point. Later ticks move the piece down
    /// once the drop interval for the current level has passed since that
    /// reference, then move the reference to `now`. A `now` earlier than the
    /// reference counts as no time passed.
    #[must_use]
    pub fn tick(mut self, now: Duration) -> Self {
        let Some(piece) = self.controllable_piece() else {
            return self;
        };
        let Some(anchor) = self.drop_anchor else {
            self.drop_anchor = Some(now);
            return self;
        };
        if now.saturating_sub(anchor) < drop_interval(self.level()) {
            return self;
        }
        self.drop_anchor = Some(now);
        log::trace!("gravity step at {now:?}");
        self.step_down(piece)
    }

    /// Removes the rows of the pending line clear, commits its points, and
    /// spawns the next piece.
    ///
    /// Allowed while paused, so an animation that was running when the player
    /// paused can still finish.
    ///
    /// # Panics
    ///
    /// Panics if no line clear is pending.
    #[must_use]
    pub fn complete_line_clear(mut self) -> Self {
        let Some(PendingClear { line_clear, points }) = self.pending_clear.take() else {
            panic!("complete_line_clear called with no line clear pending");
        };
        let level_before = self.level();
        let cleared = line_clear.cleared_count();

        self.board = line_clear.into_remaining();
        self.stats.commit_line_clear(cleared, points);
        self.drop_anchor = None;
        log::debug!(
            "cleared {cleared} rows for {points} points, score {}",
            self.score()
        );
        if self.level() > level_before {
            log::debug!("level up: {level_before} -> {}", self.level());
        }
        self.spawn_next()
    }

    /// Stores the rank a collaborator assigned to this game's result.
    ///
    /// Ignored unless the game is over.
    #[must_use]
    pub fn record_rank(mut self, rank: Rank) -> Self {
        if self.session_state.is_game_over() {
            self.rank = Some(rank);
        }
        self
    }

    /// Submits the final result, stamped with `recorded_at`, to `ranking`
    /// and records the rank it reports.
    ///
    /// Returns the session unchanged if the game is not over yet.
    pub fn submit_result<R>(
        self,
        ranking: &mut R,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, R::Error>
    where
        R: ScoreRanking + ?Sized,
    {
        let Some(entry) = self.high_score_entry(recorded_at) else {
            return Ok(self);
        };
        let rank = ranking.submit(entry)?;
        log::debug!("result ranked {rank:?}");
        Ok(self.record_rank(rank))
    }

    fn controllable_piece(&self) -> Option<Piece> {
        if !self.session_state.is_playing() || self.pending_clear.is_some() {
            return None;
        }
        self.active
    }

    fn try_replace_active(mut self, step: impl FnOnce(&Piece) -> Piece) -> Self {
        if let Some(piece) = self.controllable_piece() {
            let candidate = step(&piece);
            if !self.board.is_colliding(&candidate) {
                self.active = Some(candidate);
            }
        }
        self
    }

    fn step_down(mut self, piece: Piece) -> Self {
        let candidate = piece.down();
        if self.board.is_colliding(&candidate) {
            return self.lock(piece);
        }
        self.active = Some(candidate);
        self
    }

    fn lock(mut self, piece: Piece) -> Self {
        self.active = None;
        self.board = self.board.with_piece(&piece);
        let line_clear = self.board.clear_full_rows();
        let cleared = line_clear.cleared_count();
        self.stats.record_lock(cleared);
        log::debug!(
            "locked {:?} at {:?}, {cleared} rows full",
            piece.kind(),
            piece.position()
        );

        if cleared == 0 {
            return self.spawn_next();
        }
        let points = line_clear_score(cleared, self.level());
        self.pending_clear = Some(PendingClear { line_clear, points });
        self
    }

    fn spawn_next(mut self) -> Self {
        let kind = mem::replace(&mut self.next, self.generator.next_piece());
        let piece = Piece::new(kind);
        if !self.board.is_colliding(&piece) {
            self.active = Some(piece);
            return self;
        }

        self.active = None;
        self.session_state = SessionState::GameOver;
        log::info!(
            "game over: score {}, level {}, lines {}",
            self.score(),
            self.level(),
            self.total_lines()
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use std::{convert::Infallible, num::NonZeroUsize};

    use super::*;
    use crate::{BOARD_WIDTH, PieceSeed, Randomizer};

    const MS: Duration = Duration::from_millis(1);

    fn seeded_config() -> SessionConfig {
        SessionConfig::default()
            .with_seed(PieceSeed::from(0x5eed_u128))
            .with_randomizer(Randomizer::SevenBag)
    }

    /// Session with a hand-built board and a chosen piece at the spawn anchor.
    fn session_with(board: &str, kind: PieceKind) -> GameSession {
        let mut session = GameSession::start(seeded_config());
        session.board = Board::from_ascii(board);
        session.active = Some(Piece::new(kind));
        session
    }

    fn repeat(
        mut session: GameSession,
        count: usize,
        f: fn(GameSession) -> GameSession,
    ) -> GameSession {
        for _ in 0..count {
            session = f(session);
        }
        session
    }

    /// Board whose columns 4 and 5 are filled from row 1 down, so any spawn tops out.
    fn nearly_topped_out() -> String {
        "....OO....\n".repeat(Board::HEIGHT - 1)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_start_state() {
        let session = GameSession::start(seeded_config());
        assert!(session.session_state().is_playing());
        assert_eq!(session.board(), &Board::INITIAL);
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_lines(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.pending_score(), None);
        assert!(session.clearing_rows().is_empty());
        assert!(session.high_score_entry(at(0)).is_none());

        let active = session.active_piece().unwrap();
        assert_eq!(active.position(), Piece::new(active.kind()).position());
    }

    #[test]
    fn test_reset_keeps_configured_randomizer() {
        let session = GameSession::start(seeded_config()).hard_drop().reset();
        assert_eq!(session.generator.randomizer(), Randomizer::SevenBag);
        assert_eq!(session.config().randomizer, Randomizer::SevenBag);
    }

    #[test]
    fn test_hard_drop_on_empty_board_spawns_next() {
        let session = GameSession::start(seeded_config());
        let queued = session.next_piece();
        let session = session.hard_drop();

        assert!(session.session_state().is_playing());
        assert_eq!(session.score(), 0);
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.active_piece(), Some(Piece::new(queued)));
        assert_eq!(session.board().rows().count(), Board::HEIGHT);

        let filled = session.board().rows().flatten().filter(|b| !b.is_empty()).count();
        assert_eq!(filled, 4);
    }

    #[test]
    fn test_moves_blocked_by_walls() {
        let session = session_with("", PieceKind::O);
        let session = repeat(session, 10, GameSession::move_left);
        // O occupies columns 1 and 2 of its box.
        assert_eq!(session.active_piece().unwrap().position().x(), -1);
        let session = repeat(session, 20, GameSession::move_right);
        assert_eq!(session.active_piece().unwrap().position().x(), 7);
    }

    #[test]
    fn test_rejected_rotation_is_noop() {
        let session = session_with("", PieceKind::I).rotate();
        let session = repeat(session, 10, GameSession::move_left);
        let before = session.active_piece().unwrap();
        // Vertical I flush against the left wall.
        assert_eq!(before.position().x(), -2);

        let after = session.rotate().active_piece().unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_move_down_locks_on_floor() {
        let session = session_with("", PieceKind::O);
        let session = repeat(session, 19, GameSession::move_down);
        assert_eq!(session.active_piece().unwrap().position().y(), 18);
        assert_eq!(session.stats().completed_pieces(), 0);

        let session = session.move_down();
        assert_eq!(session.stats().completed_pieces(), 1);
        assert!(session.board().is_occupied(4, 19));
        assert!(session.board().is_occupied(5, 18));
    }

    #[test]
    fn test_single_line_clear() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let session = repeat(session, 4, GameSession::move_right).hard_drop();

        // Clearing: full row still visible, points staged, nothing active.
        assert!(session.is_clearing());
        assert_eq!(session.clearing_rows(), [19]);
        assert!(session.board().is_row_full(19));
        assert_eq!(session.active_piece(), None);
        assert_eq!(session.score(), 0);
        assert_eq!(session.pending_score(), Some(200));
        assert_eq!(session.provisional_score(), 200);

        let session = session.complete_line_clear();
        assert!(!session.is_clearing());
        assert_eq!(session.score(), 200);
        assert_eq!(session.total_lines(), 1);
        assert_eq!(session.pending_score(), None);
        assert_eq!(session.board(), &Board::from_ascii("........OO"));
        assert!(session.active_piece().is_some());
    }

    #[test]
    fn test_tetris_scores_800_per_level() {
        let board = "IIIIIIIII.\n".repeat(4);
        let session = session_with(&board, PieceKind::I).rotate();
        let session = repeat(session, 4, GameSession::move_right).hard_drop();

        assert_eq!(session.clearing_rows(), [19, 18, 17, 16]);
        assert_eq!(session.pending_score(), Some(800 * 2));

        let session = session.complete_line_clear();
        assert_eq!(session.score(), 1600);
        assert_eq!(session.total_lines(), 4);
        assert_eq!(session.board(), &Board::INITIAL);
        assert_eq!(session.stats().line_cleared_counter()[4], 1);
    }

    #[test]
    fn test_clear_scored_at_lock_level_then_levels_up() {
        let mut session = session_with("IIIIIIII..", PieceKind::O);
        session.stats.commit_line_clear(9, 0);
        assert_eq!(session.level(), 1);

        let session = repeat(session, 4, GameSession::move_right).hard_drop();
        assert_eq!(session.pending_score(), Some(200));

        let session = session.complete_line_clear();
        assert_eq!(session.total_lines(), 10);
        assert_eq!(session.level(), 2);
        assert_eq!(session.score(), 200);
    }

    #[test]
    fn test_commands_ignored_while_clearing() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let clearing = repeat(session, 4, GameSession::move_right).hard_drop();
        let before = clearing.snapshot();

        let after = clearing
            .move_left()
            .rotate()
            .move_down()
            .hard_drop()
            .tick(Duration::ZERO)
            .tick(Duration::from_secs(10));
        assert_eq!(after.snapshot(), before);
    }

    #[test]
    #[should_panic(expected = "no line clear pending")]
    fn test_complete_line_clear_without_pending_panics() {
        let _ = GameSession::start(seeded_config()).complete_line_clear();
    }

    #[test]
    fn test_complete_line_clear_while_paused() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let session = repeat(session, 4, GameSession::move_right)
            .hard_drop()
            .toggle_pause()
            .complete_line_clear();
        assert!(session.session_state().is_paused());
        assert_eq!(session.score(), 200);
        assert!(session.active_piece().is_some());
    }

    #[test]
    fn test_game_over_freezes_session() {
        let board = nearly_topped_out();
        let session = session_with(&board, PieceKind::O).hard_drop();

        assert!(session.session_state().is_game_over());
        assert_eq!(session.active_piece(), None);
        let entry = session.high_score_entry(at(0)).unwrap();
        assert_eq!((entry.score, entry.level, entry.lines), (0, 1, 0));

        let board_before = session.board().clone();
        let session = session
            .tick(Duration::ZERO)
            .tick(Duration::from_secs(60))
            .move_left()
            .move_down()
            .rotate()
            .hard_drop()
            .toggle_pause();
        assert!(session.session_state().is_game_over());
        assert_eq!(session.board(), &board_before);
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score_entry(at(0)), Some(entry));
    }

    #[test]
    fn test_reset_after_game_over_replays_sequence() {
        let fresh = GameSession::start(seeded_config());
        let board = nearly_topped_out();
        let over = session_with(&board, PieceKind::O).hard_drop();
        assert!(over.session_state().is_game_over());

        let restarted = over.reset();
        assert!(restarted.session_state().is_playing());
        assert_eq!(restarted.board(), &Board::INITIAL);
        assert_eq!(restarted.high_score_entry(at(0)), None);
        assert_eq!(restarted.rank(), None);
        assert_eq!(restarted.snapshot(), fresh.snapshot());
    }

    #[test]
    fn test_gravity_follows_drop_interval() {
        let session = session_with("", PieceKind::T);
        let y = |s: &GameSession| s.active_piece().unwrap().position().y();

        // First tick only anchors the timer.
        let session = session.tick(Duration::from_secs(5));
        assert_eq!(y(&session), -1);
        let session = session.tick(Duration::from_secs(5) + 999 * MS);
        assert_eq!(y(&session), -1);
        let session = session.tick(Duration::from_secs(6));
        assert_eq!(y(&session), 0);
        let session = session.tick(Duration::from_secs(7));
        assert_eq!(y(&session), 1);
    }

    #[test]
    fn test_tick_before_anchor_counts_as_zero() {
        let session = session_with("", PieceKind::T)
            .tick(Duration::from_secs(10))
            .tick(Duration::from_secs(1));
        assert_eq!(session.active_piece().unwrap().position().y(), -1);
    }

    #[test]
    fn test_pause_freezes_gravity_and_resume_reanchors() {
        let session = session_with("", PieceKind::T).tick(Duration::ZERO);
        let paused = session.toggle_pause();
        assert!(paused.session_state().is_paused());

        let paused = paused
            .tick(Duration::from_secs(5))
            .move_left()
            .move_down()
            .hard_drop();
        assert_eq!(paused.active_piece(), Some(Piece::new(PieceKind::T)));

        let resumed = paused.toggle_pause();
        assert!(resumed.session_state().is_playing());
        // Time spent paused does not count toward the next drop.
        let resumed = resumed.tick(Duration::from_secs(6));
        assert_eq!(resumed.active_piece().unwrap().position().y(), -1);
        let resumed = resumed.tick(Duration::from_secs(7));
        assert_eq!(resumed.active_piece().unwrap().position().y(), 0);
    }

    #[test]
    fn test_gravity_locks_piece() {
        let mut session = session_with("", PieceKind::O).tick(Duration::ZERO);
        for step in 1..=20 {
            session = session.tick(Duration::from_secs(step));
        }
        assert_eq!(session.stats().completed_pieces(), 1);
        assert!(session.board().is_occupied(4, 19));
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |session: GameSession| {
            (0..6).fold(session, |s, i| {
                let s = if i % 2 == 0 { s.move_left() } else { s.rotate() };
                s.hard_drop()
            })
        };
        let a = play(GameSession::start(seeded_config()));
        let b = play(GameSession::start(seeded_config()));
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_ghost_piece_is_hard_drop_target() {
        let session = session_with("", PieceKind::I);
        let ghost = session.ghost_piece().unwrap();
        assert_eq!(ghost.position().y(), 18);

        let dropped = session.hard_drop();
        assert_eq!(dropped.board(), &Board::INITIAL.with_piece(&ghost));
    }

    #[test]
    fn test_apply_dispatches_intents() {
        let session = session_with("", PieceKind::T);
        let by_intent = session
            .clone()
            .apply(Intent::MoveLeft)
            .apply(Intent::Rotate)
            .apply(Intent::MoveDown);
        let by_method = session.move_left().rotate().move_down();
        assert_eq!(by_intent.snapshot(), by_method.snapshot());

        let paused = by_intent.apply(Intent::TogglePause);
        assert!(paused.session_state().is_paused());
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&Intent::CompleteLineClear).unwrap();
        assert_eq!(json, r#""complete_line_clear""#);
        let intent: Intent = serde_json::from_str(r#""hard_drop""#).unwrap();
        assert_eq!(intent, Intent::HardDrop);
    }

    #[test]
    fn test_record_rank_only_after_game_over() {
        let rank = Rank::Ranked(NonZeroUsize::new(2).unwrap());
        let playing = GameSession::start(seeded_config()).record_rank(rank);
        assert_eq!(playing.rank(), None);

        let board = nearly_topped_out();
        let over = session_with(&board, PieceKind::O).hard_drop().record_rank(rank);
        assert_eq!(over.rank(), Some(rank));
    }

    struct AlwaysFirst(Vec<HighScoreEntry>);

    impl ScoreRanking for AlwaysFirst {
        type Error = Infallible;

        fn submit(&mut self, entry: HighScoreEntry) -> Result<Rank, Self::Error> {
            self.0.push(entry);
            Ok(Rank::Ranked(NonZeroUsize::MIN))
        }
    }

    #[test]
    fn test_submit_result() {
        let mut ranking = AlwaysFirst(Vec::new());

        let playing = GameSession::start(seeded_config());
        let Ok(playing) = playing.submit_result(&mut ranking, at(100));
        assert!(ranking.0.is_empty());
        assert_eq!(playing.rank(), None);

        let board = nearly_topped_out();
        let over = session_with(&board, PieceKind::O).hard_drop();
        let Ok(over) = over.submit_result(&mut ranking, at(100));
        assert_eq!(ranking.0, [over.high_score_entry(at(100)).unwrap()]);
        assert_eq!(ranking.0[0].recorded_at, at(100));
        assert_eq!(over.rank(), Some(Rank::Ranked(NonZeroUsize::MIN)));
    }

    #[test]
    fn test_identical_games_produce_identical_entries() {
        let play = || {
            let mut session = GameSession::start(seeded_config());
            while session.session_state().is_playing() {
                session = session.hard_drop();
                if session.is_clearing() {
                    session = session.complete_line_clear();
                }
            }
            session
        };
        let (a, b) = (play(), play());
        assert!(a.session_state().is_game_over());
        assert_eq!(a.snapshot(), b.snapshot());

        let entry = a.high_score_entry(at(1_700_000_000)).unwrap();
        assert_eq!(b.high_score_entry(at(1_700_000_000)), Some(entry));
        assert_eq!(entry.recorded_at, at(1_700_000_000));
        assert_eq!(entry.score, a.score());
        assert_eq!(entry.lines, a.total_lines());
    }

    #[test]
    fn test_move_down_lock_enters_clearing() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let session = repeat(session, 4, GameSession::move_right);
        // O rests on the floor at y = 18 after 19 steps; the next step locks it.
        let session = repeat(session, 20, GameSession::move_down);

        assert!(session.is_clearing());
        assert_eq!(session.clearing_rows(), [19]);
        assert_eq!(session.pending_score(), Some(200));
        assert_eq!(session.score(), 0);
        assert_eq!(session.active_piece(), None);
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_gravity_lock_enters_clearing_and_freezes_until_completed() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let mut session = repeat(session, 4, GameSession::move_right).tick(Duration::ZERO);
        for step in 1..=20 {
            session = session.tick(Duration::from_secs(step));
        }
        assert!(session.is_clearing());
        assert_eq!(session.clearing_rows(), [19]);
        assert_eq!(session.pending_score(), Some(200));

        // Gravity stays frozen while the clear is pending.
        let board = session.board().clone();
        let session = session.tick(Duration::from_secs(60));
        assert_eq!(session.board(), &board);
        assert_eq!(session.active_piece(), None);

        let session = session.complete_line_clear();
        assert_eq!(session.score(), 200);
        assert_eq!(session.total_lines(), 1);
        assert!(session.active_piece().is_some());
    }

    #[test]
    fn test_snapshot_carries_rank_after_game_over() {
        let board = nearly_topped_out();
        let over = session_with(&board, PieceKind::O).hard_drop();
        assert_eq!(over.snapshot().rank, None);

        let rank = Rank::Ranked(NonZeroUsize::new(3).unwrap());
        let ranked = over.record_rank(rank);
        let snapshot = ranked.snapshot();
        assert_eq!(snapshot.rank, Some(rank));
        assert_eq!(snapshot.state, SessionState::GameOver);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rank"], serde_json::json!({ "ranked": 3 }));
    }

    #[test]
    fn test_snapshot_during_clear() {
        let session = session_with("IIIIIIII..", PieceKind::O);
        let snapshot = repeat(session, 4, GameSession::move_right)
            .hard_drop()
            .snapshot();

        assert_eq!(snapshot.clearing_rows, [19]);
        assert_eq!(snapshot.board[19], [1, 1, 1, 1, 1, 1, 1, 1, 2, 2]);
        assert_eq!(snapshot.board[18][..BOARD_WIDTH - 2], [0; BOARD_WIDTH - 2]);
        assert_eq!(snapshot.active, None);
        assert_eq!(snapshot.ghost, None);
        assert_eq!(snapshot.pending_score, Some(200));
        assert_eq!(snapshot.provisional_score, 200);
        assert!(!snapshot.playable());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let session = session_with("", PieceKind::T);
        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["state"], "playing");
        assert_eq!(json["board"].as_array().unwrap().len(), Board::HEIGHT);
        assert_eq!(json["board"][0].as_array().unwrap().len(), BOARD_WIDTH);
        assert_eq!(json["active"]["kind"], "T");
        assert_eq!(json["active"]["x"], 3);
        assert_eq!(json["active"]["y"], -1);
        assert_eq!(json["active"]["cells"][0], serde_json::json!([4, -1]));
        assert_eq!(json["ghost"]["y"], 18);
        assert_eq!(json["pending_score"], serde_json::Value::Null);
        assert_eq!(json["level"], 1);
        assert_eq!(json["clearing_rows"], serde_json::json!([]));
        assert_eq!(json["rank"], serde_json::Value::Null);
    }
}
