use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;
pub use shapes::*;

mod random;
mod shapes;

/// Knobs the layout needs beyond the level's own config.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub seed: u64,
    /// 1-based level number within the run.
    pub level_number: u32,
    pub force_tutorial: bool,
}

impl GenerationContext {
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            level_number: 0,
            force_tutorial: false,
        }
    }

    pub const fn level(mut self, level_number: u32) -> Self {
        self.level_number = level_number;
        self
    }

    pub const fn tutorial(mut self, force_tutorial: bool) -> Self {
        self.force_tutorial = force_tutorial;
        self
    }

    pub const fn tutorial_stage(&self) -> Option<TutorialStage> {
        TutorialStage::for_level(self.level_number, self.force_tutorial)
    }
}

/// Recoverable problems met while laying out a board. The board is still playable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// Fixed cards did not fit; neither fixed nor drawn cards were placed.
    FixedCardOverflow { required: usize, available: usize },
    /// No door/nun T-shape fit anywhere.
    BossShapeNotFound,
    /// No legal cell for the boss card.
    BossNotPlaced(BossKind),
    /// The fill loop hit its iteration cap with cards and cells left.
    RandomFillCapReached,
    /// More drawn cards than free cells; the rest were discarded.
    TokensDropped { count: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedBoard {
    pub board: BoardState,
    pub warnings: Vec<GenerationWarning>,
}

impl GeneratedBoard {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub trait LayoutGenerator {
    fn generate(self, catalog: &CardCatalog, config: LevelConfig, deck: Deck) -> GeneratedBoard;
}
