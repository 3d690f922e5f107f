use alloc::vec::Vec;
use rand::prelude::*;

use crate::types::ORTHOGONAL;
use crate::*;

/// A door with three nuns on three of its four sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TShape {
    pub door: Coord2,
    pub arms: [Coord2; 3],
}

impl TShape {
    /// The four rotations around `door`, each leaving one side open. `None` for
    /// rotations that leave the board.
    pub fn rotations(door: Coord2, bounds: Coord2) -> impl Iterator<Item = Option<TShape>> {
        (0..ORTHOGONAL.len()).map(move |open_side| {
            let mut arms = [door; 3];
            let sides = ORTHOGONAL
                .iter()
                .enumerate()
                .filter(|&(side, _)| side != open_side);
            for (arm, (_, &delta)) in arms.iter_mut().zip(sides) {
                *arm = apply_delta(door, delta, bounds)?;
            }
            Some(TShape { door, arms })
        })
    }

    pub fn cells(&self) -> [Coord2; 4] {
        [self.door, self.arms[0], self.arms[1], self.arms[2]]
    }
}

/// Every placement over every anchor and rotation where all four cells are Blank and
/// the door does not touch the player.
pub fn t_shape_candidates(board: &BoardState) -> Vec<TShape> {
    let (rows, cols) = board.size();
    let player = board.player();
    let mut candidates = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            let door = (row, col);
            if is_orthogonally_adjacent(door, player) {
                continue;
            }
            candidates.extend(TShape::rotations(door, (rows, cols)).flatten().filter(|shape| {
                shape
                    .cells()
                    .iter()
                    .all(|&cell| board.card_at(cell) == CardType::Blank)
            }));
        }
    }

    candidates
}

/// Seats the nuns and the door on a uniformly chosen valid T-shape.
pub fn place_t_shape<R: Rng + ?Sized>(board: &mut BoardState, rng: &mut R) -> Option<TShape> {
    let candidates = t_shape_candidates(board);
    let Some(&shape) = candidates.choose(rng) else {
        log::error!("No valid nun placement on a {:?} board", board.size());
        return None;
    };

    board.place(shape.door, CardType::Door);
    for arm in shape.arms {
        board.place(arm, CardType::Nun);
    }
    log::debug!(
        "Placed door at {:?} out of {} candidate shape(s)",
        shape.door,
        candidates.len()
    );
    Some(shape)
}
