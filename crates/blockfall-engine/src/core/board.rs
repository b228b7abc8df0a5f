use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::piece::{Piece, PieceKind};

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: usize = 20;

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell holding a locked piece of a specific type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Returns the renderer's color index: `0` for empty, `1..=7` for locked pieces.
    #[must_use]
    pub const fn color_index(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.color_index(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BlockRow {
    cells: [Block; BOARD_WIDTH],
}

impl BlockRow {
    const EMPTY: Self = Self {
        cells: [Block::Empty; BOARD_WIDTH],
    };

    fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }
}

/// Fixed-size 10×20 playfield of locked blocks.
///
/// Row `0` is the top of the visible board and row `19` the bottom. The board
/// is a value: placing a piece or clearing lines returns a new board and
/// leaves the original untouched, so a board held by a snapshot never
/// changes underneath its holder.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::O).hard_drop_target(&Board::INITIAL);
/// let board = Board::INITIAL.with_piece(&piece);
/// assert!(board.is_occupied(4, 19));
/// assert!(!Board::INITIAL.is_occupied(4, 19));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BlockRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const INITIAL: Self = Self {
        rows: [BlockRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns the block at `(x, y)`, or `None` outside the board.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Block> {
        let x = usize::try_from(x).ok().filter(|&x| x < BOARD_WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < BOARD_HEIGHT)?;
        Some(self.rows[y].cells[x])
    }

    /// Checks whether a piece cell at `(x, y)` would collide.
    ///
    /// Columns outside the board and rows at or below the bottom edge collide.
    /// Rows above the top edge never do, as long as the column is in range,
    /// so pieces can spawn partly above the board and fall into view.
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        let Some(column) = usize::try_from(x).ok().filter(|&x| x < BOARD_WIDTH) else {
            return true;
        };
        if y < 0 {
            return false;
        }
        match usize::try_from(y) {
            Ok(row) if row < BOARD_HEIGHT => !self.rows[row].cells[column].is_empty(),
            _ => true,
        }
    }

    /// Checks if any cell of the piece collides with the walls, floor, or locked blocks.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.occupied_cells().any(|(x, y)| self.is_occupied(x, y))
    }

    /// Returns a copy of this board with `kind` written into the given cells.
    ///
    /// Cells above or below the board are discarded. Prior occupancy is not
    /// checked; the caller guarantees the cells come from a legally positioned
    /// piece.
    ///
    /// # Panics
    ///
    /// Panics if a cell lies outside the horizontal bounds, since no legally
    /// positioned piece can produce one.
    #[must_use]
    pub fn placed<I>(&self, cells: I, kind: PieceKind) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut board = self.clone();
        for (x, y) in cells {
            let column = usize::try_from(x)
                .ok()
                .filter(|&x| x < BOARD_WIDTH)
                .unwrap_or_else(|| panic!("cell ({x}, {y}) is outside the board columns"));
            let Some(row) = usize::try_from(y).ok().filter(|&y| y < BOARD_HEIGHT) else {
                continue;
            };
            board.rows[row].cells[column] = Block::Piece(kind);
        }
        board
    }

    /// Returns a copy of this board with the piece locked at its current position.
    #[must_use]
    pub fn with_piece(&self, piece: &Piece) -> Self {
        self.placed(piece.occupied_cells(), piece.kind())
    }

    /// Checks if every cell of row `y` is filled.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows.get(y).is_some_and(BlockRow::is_filled)
    }

    /// Detects every full row and computes the board without them.
    ///
    /// Eligibility is decided once against this board, and all full rows are
    /// removed together. The remaining rows keep their order and settle to
    /// the bottom, with one empty row inserted at the top per cleared row.
    #[must_use]
    pub fn clear_full_rows(&self) -> LineClear {
        let mut cleared_rows = ArrayVec::new();
        let mut remaining = Self::INITIAL;
        let mut write_y = BOARD_HEIGHT;

        for (y, row) in self.rows.iter().enumerate().rev() {
            if row.is_filled() {
                cleared_rows.push(y);
                continue;
            }
            write_y -= 1;
            remaining.rows[write_y] = *row;
        }

        LineClear {
            cleared_rows,
            remaining,
        }
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Block; BOARD_WIDTH]> {
        self.rows.iter().map(|row| &row.cells)
    }

    /// Returns the board as color indices (`0` empty, `1..=7` locked piece).
    #[must_use]
    pub fn color_grid(&self) -> [[u8; BOARD_WIDTH]; BOARD_HEIGHT] {
        self.rows.map(|row| row.cells.map(Block::color_index))
    }

    /// Creates a `Board` from ASCII art.
    ///
    /// `.` is an empty cell and a piece letter (`I`, `O`, `T`, `S`, `Z`, `J`,
    /// `L`) a locked block of that kind. Rows are listed top to bottom and are
    /// aligned with the bottom of the board, so short art describes only the
    /// lowest rows. Whitespace is ignored.
    ///
    /// # Panics
    ///
    /// Panics on unknown characters, rows that are not 10 cells wide, or more
    /// than 20 rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_HEIGHT,
            "Board art must have at most {BOARD_HEIGHT} rows, got {}",
            lines.len()
        );

        let mut board = Self::INITIAL;
        let top = BOARD_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<Block> = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| match c {
                    '.' => Block::Empty,
                    _ => Block::Piece(
                        PieceKind::from_char(c)
                            .unwrap_or_else(|| panic!("Unknown board cell '{c}' at row {i}")),
                    ),
                })
                .collect();
            assert_eq!(
                cells.len(),
                BOARD_WIDTH,
                "Each row must have exactly {BOARD_WIDTH} cells, got {} at row {i}",
                cells.len(),
            );
            board.rows[top + i].cells.copy_from_slice(&cells);
        }
        board
    }
}

/// Result of detecting full rows on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    cleared_rows: ArrayVec<usize, BOARD_HEIGHT>,
    remaining: Board,
}

impl LineClear {
    /// Returns the number of rows removed.
    #[must_use]
    pub fn cleared_count(&self) -> usize {
        self.cleared_rows.len()
    }

    /// Returns the pre-compaction indices of the removed rows, bottom-most first.
    #[must_use]
    pub fn cleared_rows(&self) -> &[usize] {
        &self.cleared_rows
    }

    /// Returns the compacted board.
    #[must_use]
    pub fn remaining(&self) -> &Board {
        &self.remaining
    }

    #[must_use]
    pub fn into_remaining(self) -> Board {
        self.remaining
    }
}
