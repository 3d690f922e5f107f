use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub card: CardType,
    pub revealed: bool,
}

/// Every coordinate is in exactly one of `revealed` / `unrevealed`, and `revealable`
/// is a subset of `unrevealed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    grid: Array2<Cell>,
    player: Coord2,
    boss: Option<BossKind>,
    unrevealed: BTreeSet<Coord2>,
    revealed: BTreeSet<Coord2>,
    revealable: BTreeSet<Coord2>,
    hints: BTreeMap<Coord2, Hint>,
    used_hints: BTreeSet<Hint>,
    sign_arrows: BTreeMap<Coord2, Option<SignArrow>>,
}

impl BoardState {
    /// Blank board with the player seeded and revealed at the floor-division center.
    pub fn new(config: LevelConfig) -> Self {
        let size = config.size();
        let grid: Array2<Cell> = Array2::default(size.to_nd_index());
        let unrevealed = (0..size.0)
            .flat_map(|row| (0..size.1).map(move |col| (row, col)))
            .collect();
        let mut board = Self {
            grid,
            player: config.player_cell(),
            boss: config.boss,
            unrevealed,
            revealed: BTreeSet::new(),
            revealable: BTreeSet::new(),
            hints: BTreeMap::new(),
            used_hints: BTreeSet::new(),
            sign_arrows: BTreeMap::new(),
        };
        let player = board.player;
        board.place(player, CardType::Player);
        board.mark_revealed(player);
        board
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.grid.dim();
        (rows as Coord, cols as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn player(&self) -> Coord2 {
        self.player
    }

    pub fn boss(&self) -> Option<BossKind> {
        self.boss
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let (rows, cols) = self.size();
        coords.0 < rows && coords.1 < cols
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// The single bounds-checked accessor every other query goes through.
    pub fn get(&self, coords: Coord2) -> Option<Cell> {
        self.grid.get(coords.to_nd_index()).copied()
    }

    /// `Blank` outside the grid.
    pub fn card_at(&self, coords: Coord2) -> CardType {
        self.get(coords).map(|cell| cell.card).unwrap_or_default()
    }

    /// `false` outside the grid.
    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.get(coords).is_some_and(|cell| cell.revealed)
    }

    pub fn is_revealable(&self, coords: Coord2) -> bool {
        self.revealable.contains(&coords)
    }

    pub fn revealed(&self) -> &BTreeSet<Coord2> {
        &self.revealed
    }

    pub fn unrevealed(&self) -> &BTreeSet<Coord2> {
        &self.unrevealed
    }

    pub fn revealable(&self) -> &BTreeSet<Coord2> {
        &self.revealable
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        self.grid
            .indexed_iter()
            .map(|((row, col), cell)| ((row as Coord, col as Coord), *cell))
    }

    pub fn orthogonal(&self, coords: Coord2) -> Orthogonals {
        NeighborIter::orthogonal(coords, self.size()).collect()
    }

    pub fn surrounding(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::surrounding(coords, self.size())
    }

    /// Row-major positions holding `card`.
    pub fn positions_of(&self, card: CardType) -> Vec<Coord2> {
        self.iter_cells()
            .filter(|(_, cell)| cell.card == card)
            .map(|(coords, _)| coords)
            .collect()
    }

    pub fn blank_positions(&self) -> Vec<Coord2> {
        self.positions_of(CardType::Blank)
    }

    pub fn count_cards(&self, pred: impl Fn(CardType) -> bool) -> usize {
        self.grid.iter().filter(|cell| pred(cell.card)).count()
    }

    pub fn hint_at(&self, coords: Coord2) -> Option<&Hint> {
        self.hints.get(&coords)
    }

    pub fn used_hints(&self) -> &BTreeSet<Hint> {
        &self.used_hints
    }

    pub fn sign_arrow(&self, coords: Coord2) -> Option<SignArrow> {
        self.sign_arrows.get(&coords).copied().flatten()
    }

    /// Writes `card` only into a Blank cell. Generation phases never overwrite each other.
    pub fn place(&mut self, coords: Coord2, card: CardType) -> bool {
        match self.grid.get_mut(coords.to_nd_index()) {
            Some(cell) if cell.card == CardType::Blank => {
                cell.card = card;
                true
            }
            _ => false,
        }
    }

    /// Exchanges the card types of two cells. Reveal flags stay where they are.
    pub(crate) fn swap_cards(&mut self, a: Coord2, b: Coord2) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let card_a = self.card_at(a);
        let card_b = self.card_at(b);
        self.grid[a.to_nd_index()].card = card_b;
        self.grid[b.to_nd_index()].card = card_a;
        true
    }

    /// Moves `coords` from hidden (and the frontier) into the revealed set.
    pub(crate) fn mark_revealed(&mut self, coords: Coord2) -> bool {
        let Some(cell) = self.grid.get_mut(coords.to_nd_index()) else {
            return false;
        };
        if cell.revealed {
            return false;
        }
        cell.revealed = true;
        self.unrevealed.remove(&coords);
        self.revealable.remove(&coords);
        self.revealed.insert(coords);
        true
    }

    /// Only hidden cells can join the frontier.
    pub(crate) fn add_revealable(&mut self, coords: Coord2) -> bool {
        self.unrevealed.contains(&coords) && self.revealable.insert(coords)
    }

    /// Grows the frontier around `center`. A police station at `center` or next to it
    /// opens its own surroundings as well, as if the area around it were already explored.
    pub(crate) fn expand_frontier(&mut self, center: Coord2) -> Vec<Coord2> {
        let mut added = Vec::new();
        let mut stations: SmallVec<[Coord2; 5]> = SmallVec::new();

        if self.card_at(center) == CardType::PoliceStation {
            stations.push(center);
        }
        for neighbor in self.orthogonal(center) {
            if self.add_revealable(neighbor) {
                added.push(neighbor);
            }
            if self.card_at(neighbor) == CardType::PoliceStation && self.is_revealed(neighbor) {
                stations.push(neighbor);
            }
        }
        for station in stations {
            for neighbor in self.orthogonal(station) {
                if self.add_revealable(neighbor) {
                    added.push(neighbor);
                }
            }
        }
        added
    }

    /// Stores the hint for `coords` unless one already exists. Returns the stored hint.
    pub(crate) fn record_hint(&mut self, coords: Coord2, hint: Hint) -> Hint {
        *self.hints.entry(coords).or_insert(hint)
    }

    pub(crate) fn mark_hint_used(&mut self, hint: Hint) {
        self.used_hints.insert(hint);
    }

    pub(crate) fn set_sign_arrow(&mut self, coords: Coord2, arrow: Option<SignArrow>) {
        self.sign_arrows.insert(coords, arrow);
    }

    /// Checks the tile-set invariants. Cheap enough for debug assertions and tests.
    pub fn check_invariants(&self) -> bool {
        let total = usize::from(self.total_cells());
        if self.revealed.len() + self.unrevealed.len() != total {
            return false;
        }
        if !self.revealable.is_subset(&self.unrevealed) {
            return false;
        }
        self.iter_cells().all(|(coords, cell)| {
            cell.revealed == self.revealed.contains(&coords)
                && cell.revealed != self.unrevealed.contains(&coords)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardState {
        BoardState::new(LevelConfig::new(5, 5, 0))
    }

    #[test]
    fn new_board_seeds_revealed_player() {
        let board = board();
        assert_eq!(board.player(), (2, 2));
        assert_eq!(board.card_at((2, 2)), CardType::Player);
        assert!(board.is_revealed((2, 2)));
        assert_eq!(board.revealed().len(), 1);
        assert_eq!(board.unrevealed().len(), 24);
        assert!(board.revealable().is_empty());
        assert!(board.check_invariants());
    }

    #[test]
    fn out_of_range_queries_are_safe() {
        let board = board();
        assert_eq!(board.card_at((9, 0)), CardType::Blank);
        assert!(!board.is_revealed((0, 200)));
        assert_eq!(board.get((5, 5)), None);
        assert_eq!(board.validate_coords((5, 0)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn place_never_overwrites() {
        let mut board = board();
        assert!(board.place((0, 0), CardType::Coin));
        assert!(!board.place((0, 0), CardType::Enemy));
        assert!(!board.place((2, 2), CardType::Enemy));
        assert_eq!(board.card_at((0, 0)), CardType::Coin);
    }

    #[test]
    fn reveal_moves_cell_out_of_frontier() {
        let mut board = board();
        board.expand_frontier((2, 2));
        assert!(board.is_revealable((1, 2)));

        assert!(board.mark_revealed((1, 2)));
        assert!(!board.mark_revealed((1, 2)));
        assert!(!board.is_revealable((1, 2)));
        assert!(!board.add_revealable((1, 2)));
        assert!(board.check_invariants());
    }

    #[test]
    fn police_station_extends_frontier() {
        let mut board = board();
        board.place((2, 3), CardType::PoliceStation);
        board.mark_revealed((2, 3));

        let added = board.expand_frontier((2, 2));

        assert!(added.contains(&(1, 3)));
        assert!(added.contains(&(3, 3)));
        assert!(added.contains(&(2, 4)));
        assert!(!board.is_revealable((2, 3)));
        assert!(board.check_invariants());
    }

    #[test]
    fn hints_are_recorded_once() {
        let mut board = board();
        let first = Hint::RowEnemies { count: 1 };
        let second = Hint::RowEnemies { count: 2 };
        assert_eq!(board.record_hint((0, 0), first), first);
        assert_eq!(board.record_hint((0, 0), second), first);
        assert_eq!(board.hint_at((0, 0)), Some(&first));
    }
}
