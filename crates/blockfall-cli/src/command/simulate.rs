use std::{path::PathBuf, time::Duration};

use blockfall_engine::{
    GameSession, GameStats, HighScoreEntry, PieceSeed, Randomizer, Rank, SessionConfig,
    SessionState,
};
use chrono::{DateTime, Utc};
use rand::Rng as _;
use serde::Serialize;

use crate::{high_score_table::HighScoreTable, policy, util};

/// Time that passes between two commands sent to a session.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Number of entries kept in the high-score table
    #[arg(long, default_value_t = 10)]
    capacity: usize,
    /// Stop a game after this many locked pieces
    #[arg(long, default_value_t = 1000)]
    max_pieces: u32,
    /// Session configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Piece seed for the first game, as 32 hex digits
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Piece randomizer
    #[arg(long, value_enum)]
    randomizer: Option<RandomizerArg>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum RandomizerArg {
    Uniform,
    SevenBag,
}

impl From<RandomizerArg> for Randomizer {
    fn from(arg: RandomizerArg) -> Self {
        match arg {
            RandomizerArg::Uniform => Randomizer::Uniform,
            RandomizerArg::SevenBag => Randomizer::SevenBag,
        }
    }
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    randomizer: Randomizer,
    capacity: usize,
    max_pieces: u32,
    games: Vec<GameReport>,
    high_scores: Vec<HighScoreEntry>,
}

#[derive(Debug, Serialize)]
struct GameReport {
    game: usize,
    seed: PieceSeed,
    topped_out: bool,
    level: u32,
    stats: GameStats,
    rank: Option<Rank>,
    finished_at: Option<DateTime<Utc>>,
}

impl GameReport {
    fn new(
        game: usize,
        seed: PieceSeed,
        session: &GameSession,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            game,
            seed,
            topped_out: session.session_state().is_game_over(),
            level: session.level(),
            stats: session.stats().clone(),
            rank: session.rank(),
            finished_at: session
                .high_score_entry(finished_at)
                .map(|entry| entry.recorded_at),
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        games,
        capacity,
        max_pieces,
        config,
        seed,
        randomizer,
        output,
    } = arg;

    let mut base_config = match config {
        Some(path) => util::read_session_config_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(randomizer) = randomizer {
        base_config = base_config.with_randomizer((*randomizer).into());
    }
    let first_seed = seed
        .or(base_config.seed)
        .unwrap_or_else(|| rand::rng().random());

    let mut table = HighScoreTable::new(*capacity);
    let mut reports = Vec::with_capacity(*games);
    for game in 0..*games {
        let game_seed = PieceSeed::from(first_seed.to_u128().wrapping_add(game as u128));
        let session = play_game(base_config.with_seed(game_seed), *max_pieces);
        let finished_at = Utc::now();
        let Ok(session) = session.submit_result(&mut table, finished_at);
        let report = GameReport::new(game, game_seed, &session, finished_at);
        eprintln!(
            "Game {game}: score {} level {} lines {} pieces {}{}",
            report.stats.score(),
            report.level,
            report.stats.total_cleared_lines(),
            report.stats.completed_pieces(),
            match report.rank {
                Some(Rank::Ranked(position)) => format!(" (rank #{position})"),
                Some(Rank::Unranked) => " (unranked)".to_owned(),
                None => " (stopped)".to_owned(),
            }
        );
        reports.push(report);
    }

    let report = SimulationReport {
        randomizer: base_config.randomizer,
        capacity: *capacity,
        max_pieces: *max_pieces,
        games: reports,
        high_scores: table.entries().to_vec(),
    };
    util::save_json(&report, output.as_deref())?;

    Ok(())
}

/// Plays one game with the greedy policy until it tops out or reaches `max_pieces`.
///
/// The session is only driven through its public commands. A fake clock
/// advances one frame before every command, so gravity runs as it would in
/// an interactive host. Line clears are completed one frame after they start.
fn play_game(config: SessionConfig, max_pieces: u32) -> GameSession {
    let mut now = Duration::ZERO;
    let mut session = GameSession::start(config);

    while session.session_state() == SessionState::Playing
        && session.stats().completed_pieces() < max_pieces
    {
        now += FRAME;
        session = session.tick(now);
        if session.is_clearing() {
            session = session.complete_line_clear();
            continue;
        }
        let Some(piece) = session.active_piece() else {
            break;
        };

        let locked_before = session.stats().completed_pieces();
        let Some(plan) = policy::select_best_turn(session.board(), piece) else {
            session = session.hard_drop();
            continue;
        };
        for intent in plan.intents() {
            if session.stats().completed_pieces() != locked_before
                || session.session_state() != SessionState::Playing
            {
                // Gravity locked the piece before the plan finished.
                break;
            }
            now += FRAME;
            session = session.tick(now);
            if session.active_piece().is_none() {
                break;
            }
            session = session.apply(intent);
        }
    }

    if session.is_clearing() {
        session = session.complete_line_clear();
    }

    log::debug!(
        "game finished in state {:?} after {} pieces",
        session.session_state(),
        session.stats().completed_pieces()
    );
    session
}
