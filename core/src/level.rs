use alloc::borrow::ToOwned;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Recurring bosses. Each one has its own placement rule and progress counter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    Nun,
    Snowman,
    Horribleman,
}

impl BossKind {
    pub const fn card(self) -> CardType {
        match self {
            Self::Nun => CardType::Nun,
            Self::Snowman => CardType::Snowman,
            Self::Horribleman => CardType::Horribleman,
        }
    }

    /// The card signs point at on this boss's levels.
    pub const fn objective(self) -> CardType {
        match self {
            Self::Nun => CardType::Door,
            Self::Snowman => CardType::Snowman,
            Self::Horribleman => CardType::Horribleman,
        }
    }
}

impl fmt::Display for BossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.card().identifier())
    }
}

impl FromStr for BossKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nun" => Ok(Self::Nun),
            "snowman" => Ok(Self::Snowman),
            "horribleman" => Ok(Self::Horribleman),
            other => Err(GameError::UnknownBoss(other.to_owned())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub enemy_count: CellCount,
    #[serde(default)]
    pub boss: Option<BossKind>,
}

impl LevelConfig {
    pub const DEFAULT: LevelConfig = LevelConfig::new(5, 5, 1);

    pub const fn new(rows: Coord, cols: Coord, enemy_count: CellCount) -> Self {
        Self {
            rows,
            cols,
            enemy_count,
            boss: None,
        }
    }

    pub const fn with_boss(mut self, boss: BossKind) -> Self {
        self.boss = Some(boss);
        self
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Floor-division center; even dimensions lean toward the lower right.
    pub const fn player_cell(&self) -> Coord2 {
        (self.rows / 2, self.cols / 2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            Err(GameError::InvalidLevelConfig)
        } else {
            Ok(())
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Ordered level list for a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    levels: Vec<LevelConfig>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self { levels }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|err| GameError::InvalidLevelTable(err.to_string()))?;
        for level in &table.levels {
            level.validate()?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Out-of-range indices fall back to the last known level, then to a 5x5 board with one enemy.
    pub fn level_info(&self, index: usize) -> LevelConfig {
        match self.levels.get(index).or_else(|| self.levels.last()) {
            Some(level) => *level,
            None => {
                log::warn!("Level table is empty, using the default level");
                LevelConfig::DEFAULT
            }
        }
    }

    /// How many levels in a row, ending at `index`, share its boss.
    pub fn boss_instance(&self, index: usize) -> Option<BossInstance> {
        let boss = self.levels.get(index)?.boss?;
        let same = |level: &LevelConfig| level.boss == Some(boss);
        let before = self.levels[..index].iter().rev().take_while(|l| same(l)).count();
        let after = self.levels[index + 1..].iter().take_while(|l| same(l)).count();
        Some(BossInstance {
            boss,
            index: before,
            count: before + 1 + after,
        })
    }
}

/// Position of one level inside a run of same-boss levels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossInstance {
    pub boss: BossKind,
    pub index: usize,
    pub count: usize,
}

impl BossInstance {
    pub const fn is_last(&self) -> bool {
        self.index + 1 >= self.count
    }
}

/// The two scripted tutorial boards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialStage {
    First,
    Second,
}

impl TutorialStage {
    /// Only 1-based levels 1 and 2 are scripted, and only when forced.
    pub const fn for_level(level_number: u32, force_tutorial: bool) -> Option<Self> {
        match (force_tutorial, level_number) {
            (true, 1) => Some(Self::First),
            (true, 2) => Some(Self::Second),
            _ => None,
        }
    }

    /// The scripted Hint tile: above the player on the first board, below on the second.
    pub fn hint_cell(self, player: Coord2, bounds: Coord2) -> Option<Coord2> {
        let delta = match self {
            Self::First => (-1, 0),
            Self::Second => (1, 0),
        };
        apply_delta(player, delta, bounds)
    }
}
