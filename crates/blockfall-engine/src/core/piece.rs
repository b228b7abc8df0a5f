use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    shape::{ShapeMatrix, occupied_offsets, shape_for},
};

/// Column of the spawn anchor: centers a 4-wide bounding box on the 10-wide board.
pub const PIECE_SPAWN_X: i32 = 3;
/// Row of the spawn anchor.
///
/// Every spawn shape has its lowest cells on row 1 of its bounding box, so a
/// fresh piece enters with its top row above the board and its bottom row on
/// board row 0.
pub const PIECE_SPAWN_Y: i32 = -1;

/// A falling piece (tetromino) with position, rotation, and type.
///
/// Pieces are immutable values: movement and rotation return new `Piece`
/// instances and never check the board. Callers test the candidate with
/// [`Board::is_colliding`] before committing to it.
///
/// # Coordinate System
///
/// - Position is the top-left corner of the piece's 4×4 bounding box
/// - X grows rightward, Y grows downward
/// - Y may be negative while the piece is still above the board
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind};
///
/// let board = Board::INITIAL;
/// let piece = Piece::new(PieceKind::T);
/// let candidate = piece.right().rotated();
/// assert!(!board.is_colliding(&candidate));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Spawns a piece of the given kind at the spawn anchor in its spawn orientation.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN_POSITION,
            rotation: PieceRotation::SPAWN,
            kind,
        }
    }

    /// Creates a piece at an explicit position and rotation.
    #[must_use]
    pub const fn with_placement(
        kind: PieceKind,
        rotation: PieceRotation,
        position: PiecePosition,
    ) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &'static ShapeMatrix {
        shape_for(self.kind, self.rotation)
    }

    /// Returns an iterator of the absolute board coordinates the piece covers.
    #[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let PiecePosition { x, y } = self.position;
        occupied_offsets(self.shape()).map(move |(dx, dy)| (x + dx as i32, y + dy as i32))
    }

    /// Returns this piece moved by `(dx, dy)` cells.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: PiecePosition::new(self.position.x + dx, self.position.y + dy),
            ..*self
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.translated(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.translated(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.translated(0, 1)
    }

    /// Returns this piece turned one quarter clockwise around its bounding box.
    ///
    /// No wall-kick offsets are tried. If the rotated shape collides, the
    /// rotation is simply not legal at this position.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    /// Returns the lowest non-colliding position straight below this piece.
    ///
    /// Steps down one row at a time until the next step would collide. The
    /// board's bottom bound always stops the descent.
    #[must_use]
    pub fn hard_drop_target(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if board.is_colliding(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}

/// Position of a piece's bounding box on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    pub const SPAWN_POSITION: Self = Self::new(PIECE_SPAWN_X, PIECE_SPAWN_Y);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Indices wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    /// Creates a rotation state from any index, taken modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in color-index order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Returns the color index a renderer uses for this kind (1–7, 0 means empty).
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.color_index(), 1);
    /// assert_eq!(PieceKind::L.color_index(), 7);
    /// ```
    #[must_use]
    pub const fn color_index(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}
