//! Game engine logic and state management.
//!
//! This module builds the game on top of the core data structures:
//!
//! - [`GameSession`] - Session state machine and the command surface
//! - [`GameStats`] - Running totals (score, lines, locked pieces)
//! - [`PieceGenerator`] - Seeded piece generation
//! - [`PieceSeed`] - Seed for deterministic piece generation
//! - [`GameSnapshot`] - Owned picture of a session for renderers
//! - [`line_clear_score`], [`level_for_lines`], [`drop_interval`] - Progression rules
//!
//! # Game Flow
//!
//! 1. Start a [`GameSession`] from a [`SessionConfig`](crate::SessionConfig)
//! 2. Feed it player intents and clock ticks
//! 3. When a lock completes rows, let the renderer animate them, then call
//!    [`GameSession::complete_line_clear`]
//! 4. Repeat until a freshly spawned piece collides and the game is over
//! 5. Stamp the [`HighScoreEntry`](crate::HighScoreEntry) with the host's clock
//!    and hand it to a ranking collaborator
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameSession, SessionConfig};
//! use chrono::Utc;
//!
//! let mut session = GameSession::start(SessionConfig::default());
//! while session.session_state().is_playing() {
//!     session = session.hard_drop();
//!     if session.is_clearing() {
//!         session = session.complete_line_clear();
//!     }
//! }
//! assert!(session.high_score_entry(Utc::now()).is_some());
//! ```

pub use self::{game_session::*, game_stats::*, piece_generator::*, progression::*, snapshot::*};

mod game_session;
mod game_stats;
mod piece_generator;
mod progression;
mod snapshot;
