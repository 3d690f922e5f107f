use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;

use crate::*;

/// Snapshot of where enemies sit, taken once per hint computation.
#[derive(Clone, Debug)]
pub struct EnemyMap {
    size: Coord2,
    enemies: BTreeSet<Coord2>,
}

impl EnemyMap {
    pub fn new(board: &BoardState, catalog: &CardCatalog) -> Self {
        let enemies = board
            .iter_cells()
            .filter(|(_, cell)| catalog.is_enemy(cell.card))
            .map(|(coords, _)| coords)
            .collect();
        Self {
            size: board.size(),
            enemies,
        }
    }

    pub fn total(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_enemy(&self, coords: Coord2) -> bool {
        self.enemies.contains(&coords)
    }

    pub fn count_in<'a>(&self, cells: impl IntoIterator<Item = &'a Coord2>) -> CellCount {
        cells.into_iter().filter(|c| self.is_enemy(**c)).count() as CellCount
    }

    pub fn row_cells(&self, row: Coord) -> Vec<Coord2> {
        (0..self.size.1).map(|col| (row, col)).collect()
    }

    pub fn column_cells(&self, col: Coord) -> Vec<Coord2> {
        (0..self.size.0).map(|row| (row, col)).collect()
    }

    pub fn cells_where(&self, pred: impl Fn(Coord2) -> bool) -> Vec<Coord2> {
        (0..self.size.0)
            .flat_map(|row| (0..self.size.1).map(move |col| (row, col)))
            .filter(|&coords| pred(coords))
            .collect()
    }

    /// The four corners, deduplicated for single-row or single-column boards.
    pub fn corner_cells(&self) -> Vec<Coord2> {
        let (last_row, last_col) = (self.size.0 - 1, self.size.1 - 1);
        let mut corners = Vec::with_capacity(4);
        for corner in [(0, 0), (0, last_col), (last_row, 0), (last_row, last_col)] {
            if !corners.contains(&corner) {
                corners.push(corner);
            }
        }
        corners
    }

    /// The 3x3 block centered on `center`, clipped to the board.
    pub fn neighborhood_cells(&self, center: Coord2) -> Vec<Coord2> {
        let mut cells: Vec<Coord2> = NeighborIter::surrounding(center, self.size).collect();
        cells.push(center);
        cells
    }

    /// Distinct cells orthogonally touching any of `stations`.
    pub fn cells_around(&self, stations: &[Coord2]) -> Vec<Coord2> {
        let cells: BTreeSet<Coord2> = stations
            .iter()
            .flat_map(|&station| NeighborIter::orthogonal(station, self.size))
            .collect();
        cells.into_iter().collect()
    }

    /// Size of the biggest 4-connected group of enemies.
    pub fn largest_cluster(&self) -> CellCount {
        let mut visited = BTreeSet::new();
        let mut largest = 0;

        for &start in &self.enemies {
            if !visited.insert(start) {
                continue;
            }

            let mut size = 0;
            let mut to_visit = VecDeque::from([start]);
            while let Some(visit_coords) = to_visit.pop_front() {
                size += 1;
                to_visit.extend(
                    NeighborIter::orthogonal(visit_coords, self.size)
                        .filter(|&pos| self.is_enemy(pos))
                        .filter(|&pos| visited.insert(pos)),
                );
            }
            largest = largest.max(size);
        }

        largest
    }

    pub fn distinct_rows(&self) -> CellCount {
        let rows: BTreeSet<Coord> = self.enemies.iter().map(|c| c.0).collect();
        rows.len() as CellCount
    }

    pub fn distinct_columns(&self) -> CellCount {
        let cols: BTreeSet<Coord> = self.enemies.iter().map(|c| c.1).collect();
        cols.len() as CellCount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(size: Coord2, enemies: &[Coord2]) -> EnemyMap {
        EnemyMap {
            size,
            enemies: enemies.iter().copied().collect(),
        }
    }

    #[test]
    fn largest_cluster_uses_orthogonal_connectivity() {
        let enemies = map((5, 5), &[(0, 0), (0, 1), (1, 1), (3, 3), (4, 4)]);
        assert_eq!(enemies.largest_cluster(), 3);
        assert_eq!(map((5, 5), &[]).largest_cluster(), 0);
        assert_eq!(map((3, 3), &[(0, 0), (1, 1), (2, 2)]).largest_cluster(), 1);
    }

    #[test]
    fn distinct_rows_and_columns() {
        let enemies = map((5, 5), &[(0, 0), (0, 4), (3, 4)]);
        assert_eq!(enemies.distinct_rows(), 2);
        assert_eq!(enemies.distinct_columns(), 2);
    }

    #[test]
    fn corners_dedupe_on_thin_boards() {
        assert_eq!(map((1, 1), &[]).corner_cells().len(), 1);
        assert_eq!(map((1, 4), &[]).corner_cells().len(), 2);
        assert_eq!(map((4, 4), &[]).corner_cells().len(), 4);
    }

    #[test]
    fn neighborhood_is_clipped() {
        assert_eq!(map((5, 5), &[]).neighborhood_cells((0, 0)).len(), 4);
        assert_eq!(map((5, 5), &[]).neighborhood_cells((2, 2)).len(), 9);
    }

    #[test]
    fn cells_around_stations_are_distinct() {
        let enemies = map((5, 5), &[]);
        let cells = enemies.cells_around(&[(2, 1), (2, 3)]);
        assert_eq!(cells.iter().filter(|&&c| c == (2, 2)).count(), 1);
        assert_eq!(cells.len(), 7);
    }
}
