use serde::Serialize;

use crate::{BOARD_HEIGHT, BOARD_WIDTH, Piece, PieceKind, Rank, SessionState};

/// Owned view of a piece for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
    /// Absolute board coordinates of the four cells, including any above row 0.
    pub cells: [(i32, i32); 4],
}

impl From<Piece> for ActiveSnapshot {
    fn from(piece: Piece) -> Self {
        let mut cells = [(0, 0); 4];
        for (slot, cell) in cells.iter_mut().zip(piece.occupied_cells()) {
            *slot = cell;
        }
        Self {
            kind: piece.kind(),
            rotation: piece.rotation().index(),
            x: piece.position().x(),
            y: piece.position().y(),
            cells,
        }
    }
}

/// Immutable picture of a session at one instant.
///
/// Owns all of its data, so it can be handed to a renderer or written out
/// while the session moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Color indices, `0` for empty. Rows being cleared are still filled.
    pub board: [[u8; BOARD_WIDTH]; BOARD_HEIGHT],
    pub active: Option<ActiveSnapshot>,
    pub ghost: Option<ActiveSnapshot>,
    pub next: PieceKind,
    pub score: u32,
    pub pending_score: Option<u32>,
    pub provisional_score: u32,
    pub level: u32,
    pub lines: u32,
    pub state: SessionState,
    pub clearing_rows: Vec<usize>,
    /// Rank recorded for the final result, for the game-over screen.
    pub rank: Option<Rank>,
}

impl GameSnapshot {
    /// Checks whether the session accepts movement at the time of the snapshot.
    #[must_use]
    pub fn playable(&self) -> bool {
        self.state.is_playing() && self.clearing_rows.is_empty()
    }
}
