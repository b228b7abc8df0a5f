//! Greedy placement policy for headless play.
//!
//! For the active piece, every reachable placement is enumerated the way a
//! player would reach it from the spawn position: rotate first, then slide
//! sideways, then hard drop. Each landing is scored on the board it leaves
//! behind, and the best one becomes a [`TurnPlan`].
//!
//! Only the current piece is considered; there is no lookahead.

use std::iter;

use blockfall_engine::{BOARD_HEIGHT, BOARD_WIDTH, Board, Intent, Piece};

const LINES_WEIGHT: f32 = 0.76;
const AGGREGATE_HEIGHT_WEIGHT: f32 = -0.51;
const HOLES_WEIGHT: f32 = -0.36;
const BUMPINESS_WEIGHT: f32 = -0.18;

/// Commands that move the active piece to a chosen landing spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPlan {
    rotations: u8,
    shift: i32,
    placement: Piece,
}

impl TurnPlan {
    /// Returns where the piece lands.
    pub fn placement(&self) -> Piece {
        self.placement
    }

    /// Returns the intents that carry out this plan, ending with a hard drop.
    pub fn intents(&self) -> impl Iterator<Item = Intent> + use<> {
        let slide = if self.shift < 0 {
            Intent::MoveLeft
        } else {
            Intent::MoveRight
        };
        iter::repeat_n(Intent::Rotate, usize::from(self.rotations))
            .chain(iter::repeat_n(slide, self.shift.unsigned_abs() as usize))
            .chain(iter::once(Intent::HardDrop))
    }
}

/// Board metrics after a placement has locked and its rows cleared.
#[derive(Debug, Clone)]
struct PlacementAnalysis {
    cleared_lines: usize,
    column_heights: [usize; BOARD_WIDTH],
    num_holes: usize,
}

impl PlacementAnalysis {
    fn from_board(before_placement: &Board, placement: &Piece) -> Self {
        let line_clear = before_placement.with_piece(placement).clear_full_rows();
        let board = line_clear.remaining();

        let mut column_heights = [0; BOARD_WIDTH];
        let mut num_holes = 0;
        for (y, row) in board.rows().enumerate() {
            for (x, block) in row.iter().enumerate() {
                if !block.is_empty() {
                    column_heights[x] = column_heights[x].max(BOARD_HEIGHT - y);
                } else if column_heights[x] > 0 {
                    num_holes += 1;
                }
            }
        }

        Self {
            cleared_lines: line_clear.cleared_count(),
            column_heights,
            num_holes,
        }
    }

    fn aggregate_height(&self) -> usize {
        self.column_heights.iter().sum()
    }

    fn bumpiness(&self) -> usize {
        self.column_heights
            .windows(2)
            .map(|pair| pair[0].abs_diff(pair[1]))
            .sum()
    }

    #[expect(clippy::cast_precision_loss)]
    fn score(&self) -> f32 {
        LINES_WEIGHT * self.cleared_lines as f32
            + AGGREGATE_HEIGHT_WEIGHT * self.aggregate_height() as f32
            + HOLES_WEIGHT * self.num_holes as f32
            + BUMPINESS_WEIGHT * self.bumpiness() as f32
    }
}

/// Selects the best-scoring placement for `piece` on `board`.
///
/// Returns `None` only if `piece` already collides.
pub fn select_best_turn(board: &Board, piece: Piece) -> Option<TurnPlan> {
    if board.is_colliding(&piece) {
        return None;
    }

    let mut best_score = f32::MIN;
    let mut best_turn = None;
    for turn in available_turns(piece, board) {
        let score = PlacementAnalysis::from_board(board, &turn.placement).score();
        if score > best_score {
            best_score = score;
            best_turn = Some(turn);
        }
    }
    best_turn
}

fn available_turns(piece: Piece, board: &Board) -> impl Iterator<Item = TurnPlan> + use<'_> {
    rotations(piece, board).flat_map(move |(rotations, rotated)| {
        let rights = iter::successors(Some((0, rotated)), move |&(shift, p)| {
            fit(p.right(), board).map(|p| (shift + 1, p))
        });
        let lefts = iter::successors(Some((0, rotated)), move |&(shift, p)| {
            fit(p.left(), board).map(|p| (shift - 1, p))
        })
        .skip(1);
        rights.chain(lefts).map(move |(shift, p)| TurnPlan {
            rotations,
            shift,
            placement: p.hard_drop_target(board),
        })
    })
}

fn rotations(piece: Piece, board: &Board) -> impl Iterator<Item = (u8, Piece)> + use<'_> {
    iter::successors(Some((0, piece)), move |&(count, p)| {
        if count >= 3 {
            return None;
        }
        fit(p.rotated(), board).map(|p| (count + 1, p))
    })
}

fn fit(candidate: Piece, board: &Board) -> Option<Piece> {
    (!board.is_colliding(&candidate)).then_some(candidate)
}
