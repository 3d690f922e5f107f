use alloc::vec::Vec;
use core::fmt;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;
pub use stats::*;

mod stats;

/// Which side of a split holds more enemies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lean {
    Even,
    /// Left or top, by this many.
    First(CellCount),
    /// Right or bottom, by this many.
    Second(CellCount),
}

impl Lean {
    pub fn compare(first: CellCount, second: CellCount) -> Self {
        use core::cmp::Ordering::*;
        match first.cmp(&second) {
            Equal => Self::Even,
            Greater => Self::First(first - second),
            Less => Self::Second(second - first),
        }
    }
}

/// One piece of information a Hint tile can show. Rendering is injective, so
/// comparing hints compares their text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hint {
    RowEnemies { count: CellCount },
    ColumnEnemies { count: CellCount },
    LeftRight(Lean),
    TopBottom(Lean),
    CornerEnemies { count: CellCount },
    NeighborhoodEnemies { count: CellCount },
    PoliceWatch { count: CellCount },
    LargestCluster { size: CellCount },
    EnemyRows { count: CellCount },
    EnemyColumns { count: CellCount },
}

fn enemies(count: CellCount) -> &'static str {
    if count == 1 { "enemy" } else { "enemies" }
}

fn is_are(count: CellCount) -> &'static str {
    if count == 1 { "is" } else { "are" }
}

fn write_lean(f: &mut fmt::Formatter<'_>, lean: Lean, first: &str, second: &str) -> fmt::Result {
    match lean {
        Lean::Even => write!(f, "There are as many enemies {first} as {second}"),
        Lean::First(by) => write!(f, "There {} {by} more {} {first}", is_are(by), enemies(by)),
        Lean::Second(by) => write!(f, "There {} {by} more {} {second}", is_are(by), enemies(by)),
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Hint::*;
        match *self {
            RowEnemies { count } => {
                write!(f, "There {} {count} {} in this row", is_are(count), enemies(count))
            }
            ColumnEnemies { count } => {
                write!(f, "There {} {count} {} in this column", is_are(count), enemies(count))
            }
            LeftRight(lean) => write_lean(f, lean, "to the left", "to the right"),
            TopBottom(lean) => write_lean(f, lean, "above", "below"),
            CornerEnemies { count } => {
                write!(f, "{count} {} hiding in the corners", enemies(count))
            }
            NeighborhoodEnemies { count } => {
                write!(f, "{count} {} around this tile", enemies(count))
            }
            PoliceWatch { count } => {
                write!(f, "{count} {} next to a police station", enemies(count))
            }
            LargestCluster { size } => write!(f, "The largest group of enemies has {size}"),
            EnemyRows { count } => write!(f, "Enemies are spread over {count} rows"),
            EnemyColumns { count } => write!(f, "Enemies are spread over {count} columns"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HintCandidate {
    pub hint: Hint,
    pub useful: bool,
}

/// Builds the full candidate menu for a Hint tile at `at`. The tile itself does not
/// count toward usefulness since it is the one being revealed.
pub fn hint_candidates(
    board: &BoardState,
    catalog: &CardCatalog,
    at: Coord2,
) -> Vec<HintCandidate> {
    let map = EnemyMap::new(board, catalog);
    let (rows, cols) = board.size();
    let (row, col) = at;
    let useful = |cells: &[Coord2]| {
        cells
            .iter()
            .any(|&coords| coords != at && !board.is_revealed(coords))
    };
    let mut candidates = Vec::new();
    let mut push = |hint: Hint, cells: &[Coord2]| {
        candidates.push(HintCandidate {
            hint,
            useful: useful(cells),
        });
    };

    let row_cells = map.row_cells(row);
    push(
        Hint::RowEnemies {
            count: map.count_in(&row_cells),
        },
        &row_cells,
    );

    let column_cells = map.column_cells(col);
    push(
        Hint::ColumnEnemies {
            count: map.count_in(&column_cells),
        },
        &column_cells,
    );

    if col > 0 && col + 1 < cols {
        let left = map.cells_where(|c| c.1 < col);
        let right = map.cells_where(|c| c.1 > col);
        let lean = Lean::compare(map.count_in(&left), map.count_in(&right));
        let cells = map.cells_where(|c| c.1 != col);
        push(Hint::LeftRight(lean), &cells);
    }

    if row > 0 && row + 1 < rows {
        let top = map.cells_where(|c| c.0 < row);
        let bottom = map.cells_where(|c| c.0 > row);
        let lean = Lean::compare(map.count_in(&top), map.count_in(&bottom));
        let cells = map.cells_where(|c| c.0 != row);
        push(Hint::TopBottom(lean), &cells);
    }

    let corners = map.corner_cells();
    push(
        Hint::CornerEnemies {
            count: map.count_in(&corners),
        },
        &corners,
    );

    let neighborhood = map.neighborhood_cells(at);
    push(
        Hint::NeighborhoodEnemies {
            count: map.count_in(&neighborhood),
        },
        &neighborhood,
    );

    // without stations nothing is watched, so the hint is never useful
    let stations = board.positions_of(CardType::PoliceStation);
    let watched = map.cells_around(&stations);
    push(
        Hint::PoliceWatch {
            count: map.count_in(&watched),
        },
        &watched,
    );

    if map.total() >= 2 {
        let everything = map.cells_where(|_| true);
        push(
            Hint::LargestCluster {
                size: map.largest_cluster(),
            },
            &everything,
        );
        push(
            Hint::EnemyRows {
                count: map.distinct_rows(),
            },
            &everything,
        );
        push(
            Hint::EnemyColumns {
                count: map.distinct_columns(),
            },
            &everything,
        );
    }

    candidates
}

/// Picks uniformly inside the first non-empty bucket: useful and unused, unused, useful,
/// anything.
pub fn select_hint<R: Rng + ?Sized>(
    candidates: &[HintCandidate],
    used: &alloc::collections::BTreeSet<Hint>,
    rng: &mut R,
) -> Option<Hint> {
    let fresh = |c: &&HintCandidate| !used.contains(&c.hint);
    let buckets: [Vec<Hint>; 4] = [
        candidates
            .iter()
            .filter(|c| c.useful)
            .filter(fresh)
            .map(|c| c.hint)
            .collect(),
        candidates.iter().filter(fresh).map(|c| c.hint).collect(),
        candidates
            .iter()
            .filter(|c| c.useful)
            .map(|c| c.hint)
            .collect(),
        candidates.iter().map(|c| c.hint).collect(),
    ];

    buckets
        .iter()
        .find(|bucket| !bucket.is_empty())
        .and_then(|bucket| bucket.choose(rng).copied())
}

/// Scripted levels always show the same kind of hint.
pub fn tutorial_hint(
    board: &BoardState,
    catalog: &CardCatalog,
    at: Coord2,
    stage: TutorialStage,
) -> Hint {
    let map = EnemyMap::new(board, catalog);
    match stage {
        TutorialStage::First => Hint::NeighborhoodEnemies {
            count: map.count_in(&map.neighborhood_cells(at)),
        },
        TutorialStage::Second => Hint::ColumnEnemies {
            count: map.count_in(&map.column_cells(at.1)),
        },
    }
}

/// Returns the cached hint for `at`, computing and caching one on first use. Only the
/// scripted tile of a tutorial board gets the forced hint.
pub fn materialize_hint<R: Rng + ?Sized>(
    board: &mut BoardState,
    catalog: &CardCatalog,
    at: Coord2,
    tutorial: Option<TutorialStage>,
    rng: &mut R,
) -> Hint {
    if let Some(&hint) = board.hint_at(at) {
        return hint;
    }

    let (player, bounds) = (board.player(), board.size());
    let scripted = tutorial.filter(|stage| stage.hint_cell(player, bounds) == Some(at));
    let hint = match scripted {
        Some(stage) => tutorial_hint(board, catalog, at, stage),
        None => {
            let candidates = hint_candidates(board, catalog, at);
            match select_hint(&candidates, board.used_hints(), rng) {
                Some(hint) => hint,
                None => {
                    log::warn!("No hint candidates at {at:?}");
                    Hint::RowEnemies { count: 0 }
                }
            }
        }
    };

    board.mark_hint_used(hint);
    log::debug!("Hint at {at:?}: {hint}");
    board.record_hint(at, hint)
}
