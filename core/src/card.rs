use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Blank,
    Player,
    Coin,
    Gift,
    Enemy,
    Flashlight,
    Hint,
    PoliceStation,
    Bell,
    Sign,
    Iceground,
    Door,
    Alarm,
    Nun,
    Snowman,
    Horribleman,
}

impl CardType {
    pub const ALL: [CardType; 16] = [
        Self::Blank,
        Self::Player,
        Self::Coin,
        Self::Gift,
        Self::Enemy,
        Self::Flashlight,
        Self::Hint,
        Self::PoliceStation,
        Self::Bell,
        Self::Sign,
        Self::Iceground,
        Self::Door,
        Self::Alarm,
        Self::Nun,
        Self::Snowman,
        Self::Horribleman,
    ];

    pub const fn identifier(self) -> &'static str {
        use CardType::*;
        match self {
            Blank => "blank",
            Player => "player",
            Coin => "coin",
            Gift => "gift",
            Enemy => "enemy",
            Flashlight => "flashlight",
            Hint => "hint",
            PoliceStation => "police_station",
            Bell => "bell",
            Sign => "sign",
            Iceground => "iceground",
            Door => "door",
            Alarm => "alarm",
            Nun => "nun",
            Snowman => "snowman",
            Horribleman => "horribleman",
        }
    }

    /// Boss cards, the ones a [`BossEncounter`] counts.
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Nun | Self::Snowman | Self::Horribleman)
    }

    /// Cards the layout generator seats itself instead of drawing from the deck.
    pub const fn is_layout_placed(self) -> bool {
        matches!(
            self,
            Self::Blank | Self::Player | Self::Door | Self::Nun | Self::Snowman | Self::Horribleman
        )
    }

    /// Cards that end the level when revealed.
    pub const fn is_exit(self) -> bool {
        matches!(self, Self::Bell | Self::Door)
    }

    pub const fn is_reward(self) -> bool {
        matches!(self, Self::Coin | Self::Gift | Self::Flashlight)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for CardType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        CardType::ALL
            .into_iter()
            .find(|card| card.identifier().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GameError::UnknownCard(wanted.to_owned()))
    }
}

/// Static metadata for one catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub identifier: String,
    pub card_type: CardType,
    #[serde(default)]
    pub cost: u32,
    /// Copies every run starts with. Signed so that deck deltas can push it below zero.
    #[serde(default)]
    pub start: i32,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub is_enemy: bool,
    /// Scene in which the card becomes purchasable.
    #[serde(default)]
    pub scene: u32,
}

impl CardInfo {
    pub fn new(card_type: CardType, start: i32) -> Self {
        Self {
            identifier: card_type.identifier().to_string(),
            card_type,
            cost: 0,
            start,
            is_fixed: false,
            is_enemy: false,
            scene: 0,
        }
    }

    pub fn cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    pub fn enemy(mut self) -> Self {
        self.is_enemy = true;
        self
    }

    pub fn scene(mut self, scene: u32) -> Self {
        self.scene = scene;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCatalog {
    entries: Vec<CardInfo>,
}

impl CardCatalog {
    pub fn from_entries(entries: Vec<CardInfo>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.identifier == entry.identifier) {
                return Err(GameError::InvalidCatalog(alloc::format!(
                    "duplicate identifier {}",
                    entry.identifier
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CardInfo> =
            serde_json::from_str(json).map_err(|err| GameError::InvalidCatalog(err.to_string()))?;
        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[CardInfo] {
        &self.entries
    }

    pub fn info(&self, identifier: &str) -> Option<&CardInfo> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    pub fn info_for(&self, card_type: CardType) -> Option<&CardInfo> {
        self.entries.iter().find(|e| e.card_type == card_type)
    }

    pub fn card_type(&self, identifier: &str) -> Result<CardType> {
        self.info(identifier)
            .map(|e| e.card_type)
            .ok_or_else(|| GameError::UnknownCard(identifier.to_owned()))
    }

    pub fn is_enemy(&self, card_type: CardType) -> bool {
        self.info_for(card_type).is_some_and(|e| e.is_enemy)
    }

    pub fn is_fixed(&self, card_type: CardType) -> bool {
        self.info_for(card_type).is_some_and(|e| e.is_fixed)
    }

    /// Enemy-flagged and not a boss.
    pub fn is_ordinary_enemy(&self, card_type: CardType) -> bool {
        !card_type.is_boss() && self.is_enemy(card_type)
    }
}

impl Default for CardCatalog {
    fn default() -> Self {
        use CardType::*;
        Self {
            entries: alloc::vec![
                CardInfo::new(Blank, 0),
                CardInfo::new(Player, 1).fixed(),
                CardInfo::new(Coin, 3).cost(1),
                CardInfo::new(Gift, 1).cost(2),
                CardInfo::new(Enemy, 1).enemy(),
                CardInfo::new(Flashlight, 0).cost(3).scene(1),
                CardInfo::new(Hint, 2).cost(2),
                CardInfo::new(PoliceStation, 0).fixed().cost(4).scene(2),
                CardInfo::new(Bell, 1).fixed(),
                CardInfo::new(Sign, 0).fixed().cost(2).scene(1),
                CardInfo::new(Iceground, 0).cost(2).scene(2),
                CardInfo::new(Door, 0),
                CardInfo::new(Alarm, 0).cost(3).scene(3),
                CardInfo::new(Nun, 0).enemy(),
                CardInfo::new(Snowman, 0).enemy(),
                CardInfo::new(Horribleman, 0).enemy(),
            ],
        }
    }
}
