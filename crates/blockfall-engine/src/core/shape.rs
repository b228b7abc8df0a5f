use super::piece::{PieceKind, PieceRotation};

/// Side length of the square bounding box every piece shape lives in.
pub const SHAPE_SIZE: usize = 4;

/// Occupancy of a piece within its 4×4 bounding box, indexed `[row][column]`.
pub type ShapeMatrix = [[bool; SHAPE_SIZE]; SHAPE_SIZE];

/// Returns the occupancy matrix for `kind` in the given rotation state.
///
/// Rotation `0` is the spawn orientation and each following index is one
/// clockwise quarter turn. The layouts follow the Super Rotation System, and
/// are written out per state instead of being derived by rotating a bitmap:
/// SRS positions some states off-center (the I-piece alternates between the
/// second and third row/column), which a plain matrix rotation would not
/// reproduce.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, PieceRotation, shape_for};
///
/// let shape = shape_for(PieceKind::I, PieceRotation::SPAWN);
/// assert_eq!(shape[1], [true; 4]);
/// ```
#[must_use]
pub fn shape_for(kind: PieceKind, rotation: PieceRotation) -> &'static ShapeMatrix {
    &SHAPES[kind.index()][rotation.as_usize()]
}

/// Iterates the `(dx, dy)` offsets of the occupied cells of a shape, row by row.
pub fn occupied_offsets(shape: &ShapeMatrix) -> impl Iterator<Item = (usize, usize)> + '_ {
    shape.iter().enumerate().flat_map(|(dy, row)| {
        row.iter()
            .enumerate()
            .filter_map(move |(dx, &filled)| filled.then_some((dx, dy)))
    })
}

/// Builds a matrix from four rows of ASCII art where `#` marks an occupied cell.
const fn m(rows: [&[u8; SHAPE_SIZE]; SHAPE_SIZE]) -> ShapeMatrix {
    let mut matrix = [[false; SHAPE_SIZE]; SHAPE_SIZE];
    let mut y = 0;
    while y < SHAPE_SIZE {
        let mut x = 0;
        while x < SHAPE_SIZE {
            matrix[y][x] = rows[y][x] == b'#';
            x += 1;
        }
        y += 1;
    }
    matrix
}

const SHAPES: [[ShapeMatrix; 4]; PieceKind::LEN] = [
    // I-piece
    [
        m([b"....", b"####", b"....", b"...."]),
        m([b"..#.", b"..#.", b"..#.", b"..#."]),
        m([b"....", b"....", b"####", b"...."]),
        m([b".#..", b".#..", b".#..", b".#.."]),
    ],
    // O-piece
    [
        m([b".##.", b".##.", b"....", b"...."]),
        m([b".##.", b".##.", b"....", b"...."]),
        m([b".##.", b".##.", b"....", b"...."]),
        m([b".##.", b".##.", b"....", b"...."]),
    ],
    // T-piece
    [
        m([b".#..", b"###.", b"....", b"...."]),
        m([b".#..", b".##.", b".#..", b"...."]),
        m([b"....", b"###.", b".#..", b"...."]),
        m([b".#..", b"##..", b".#..", b"...."]),
    ],
    // S-piece
    [
        m([b".##.", b"##..", b"....", b"...."]),
        m([b".#..", b".##.", b"..#.", b"...."]),
        m([b"....", b".##.", b"##..", b"...."]),
        m([b"#...", b"##..", b".#..", b"...."]),
    ],
    // Z-piece
    [
        m([b"##..", b".##.", b"....", b"...."]),
        m([b"..#.", b".##.", b".#..", b"...."]),
        m([b"....", b"##..", b".##.", b"...."]),
        m([b".#..", b"##..", b"#...", b"...."]),
    ],
    // J-piece
    [
        m([b"#...", b"###.", b"....", b"...."]),
        m([b".##.", b".#..", b".#..", b"...."]),
        m([b"....", b"###.", b"..#.", b"...."]),
        m([b".#..", b".#..", b"##..", b"...."]),
    ],
    // L-piece
    [
        m([b"..#.", b"###.", b"....", b"...."]),
        m([b".#..", b".#..", b".##.", b"...."]),
        m([b"....", b"###.", b"#...", b"...."]),
        m([b"##..", b".#..", b".#..", b"...."]),
    ],
];
