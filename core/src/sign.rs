use serde::{Deserialize, Serialize};

use crate::*;

/// Orientation painted on a revealed Sign.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignArrow {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl SignArrow {
    /// Axis arrows win unless the target sits closer to a diagonal than to either axis.
    /// Vertical is tested first, so boundary cases point up or down.
    pub fn toward(from: Coord2, to: Coord2) -> Option<Self> {
        let dr = i16::from(to.0) - i16::from(from.0);
        let dc = i16::from(to.1) - i16::from(from.1);
        let (ar, ac) = (dr.abs(), dc.abs());

        if dr == 0 && dc == 0 {
            return None;
        }

        let vertical = if dr < 0 { Self::Up } else { Self::Down };
        let horizontal = if dc < 0 { Self::Left } else { Self::Right };

        Some(if dc == 0 || ar >= 2 * ac {
            vertical
        } else if dr == 0 || ac >= 2 * ar {
            horizontal
        } else {
            match (dr < 0, dc < 0) {
                (true, true) => Self::UpLeft,
                (true, false) => Self::UpRight,
                (false, true) => Self::DownLeft,
                (false, false) => Self::DownRight,
            }
        })
    }
}

/// Card the signs on a level point at: the Bell on ordinary levels, otherwise the boss objective.
pub const fn objective_card(boss: Option<BossKind>) -> CardType {
    match boss {
        Some(boss) => boss.objective(),
        None => CardType::Bell,
    }
}

/// First still-hidden objective in row-major order, else the first objective at all.
pub fn find_objective(board: &BoardState) -> Option<Coord2> {
    let objective = objective_card(board.boss());
    let mut fallback = None;
    for (coords, cell) in board.iter_cells() {
        if cell.card != objective {
            continue;
        }
        if !cell.revealed {
            return Some(coords);
        }
        fallback.get_or_insert(coords);
    }
    fallback
}

/// Recomputes every sign's arrow against the current objective.
pub fn resolve_signs(board: &mut BoardState) {
    let target = find_objective(board);
    let signs = board.positions_of(CardType::Sign);
    let mut updated = 0usize;
    for sign in signs {
        let arrow = target.and_then(|target| SignArrow::toward(sign, target));
        board.set_sign_arrow(sign, arrow);
        updated += 1;
    }
    if updated > 0 {
        log::debug!("Resolved {updated} sign(s) toward {target:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignArrow::*;

    #[test]
    fn straight_lines_use_axis_arrows() {
        assert_eq!(SignArrow::toward((3, 3), (0, 3)), Some(Up));
        assert_eq!(SignArrow::toward((3, 3), (5, 3)), Some(Down));
        assert_eq!(SignArrow::toward((3, 3), (3, 0)), Some(Left));
        assert_eq!(SignArrow::toward((3, 3), (3, 4)), Some(Right));
        assert_eq!(SignArrow::toward((3, 3), (3, 3)), None);
    }

    #[test]
    fn dominant_axis_beats_diagonal() {
        assert_eq!(SignArrow::toward((0, 0), (4, 1)), Some(Down));
        assert_eq!(SignArrow::toward((0, 0), (1, 3)), Some(Right));
        assert_eq!(SignArrow::toward((4, 4), (1, 2)), Some(UpLeft));
        assert_eq!(SignArrow::toward((0, 4), (2, 2)), Some(DownLeft));
    }

    #[test]
    fn boundary_ties_resolve_vertically() {
        assert_eq!(SignArrow::toward((0, 0), (2, 1)), Some(Down));
        assert_eq!(SignArrow::toward((2, 2), (0, 1)), Some(Up));
    }

    #[test]
    fn objective_depends_on_boss() {
        assert_eq!(objective_card(None), CardType::Bell);
        assert_eq!(objective_card(Some(BossKind::Nun)), CardType::Door);
        assert_eq!(objective_card(Some(BossKind::Snowman)), CardType::Snowman);
    }

    #[test]
    fn signs_point_at_hidden_bell() {
        let mut board = BoardState::new(LevelConfig::new(5, 5, 0));
        board.place((0, 2), CardType::Bell);
        board.place((4, 2), CardType::Sign);
        board.place((2, 0), CardType::Sign);

        resolve_signs(&mut board);

        assert_eq!(board.sign_arrow((4, 2)), Some(Up));
        assert_eq!(board.sign_arrow((2, 0)), Some(UpRight));
    }
}
