use ndarray::Array2;
use smallvec::SmallVec;

/// Single coordinate axis used for board height, width, and positions.
pub type Coord = u8;

/// Count type used for tile totals and enemy counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Up to four orthogonal neighbors, kept inline.
pub type Orthogonals = SmallVec<[Coord2; 4]>;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Manhattan-adjacent check, used for "not next to the player" constraints.
pub const fn is_orthogonally_adjacent(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) as u16 + a.1.abs_diff(b.1) as u16 == 1
}

pub trait NeighborIterExt {
    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter;
    fn iter_surrounding(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter {
        NeighborIter::orthogonal(index, dim_of(self))
    }

    fn iter_surrounding(&self, index: Coord2) -> NeighborIter {
        NeighborIter::surrounding(index, dim_of(self))
    }
}

fn dim_of<T>(array: &Array2<T>) -> Coord2 {
    let (rows, cols) = array.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

/// Up, down, left, right. Order matters for scripted placements.
pub(crate) const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const SURROUNDING: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (dr, dc) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(dr.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(dc.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    displacements: &'static [(isize, isize)],
    index: u8,
}

impl NeighborIter {
    pub fn orthogonal(center: Coord2, bounds: Coord2) -> Self {
        Self::new(center, bounds, &ORTHOGONAL)
    }

    pub fn surrounding(center: Coord2, bounds: Coord2) -> Self {
        Self::new(center, bounds, &SURROUNDING)
    }

    fn new(center: Coord2, bounds: Coord2, displacements: &'static [(isize, isize)]) -> Self {
        Self {
            center,
            bounds,
            displacements,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *self.displacements.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn orthogonal_neighbors_clip_at_corner() {
        let found: Vec<_> = NeighborIter::orthogonal((0, 0), (3, 3)).collect();
        assert_eq!(found, [(1, 0), (0, 1)]);
    }

    #[test]
    fn surrounding_neighbors_in_middle_are_eight() {
        assert_eq!(NeighborIter::surrounding((1, 1), (3, 3)).count(), 8);
        assert_eq!(NeighborIter::surrounding((2, 2), (3, 3)).count(), 3);
    }

    #[test]
    fn adjacency_is_manhattan_one() {
        assert!(is_orthogonally_adjacent((2, 2), (1, 2)));
        assert!(!is_orthogonally_adjacent((2, 2), (1, 1)));
        assert!(!is_orthogonally_adjacent((2, 2), (2, 2)));
    }
}
