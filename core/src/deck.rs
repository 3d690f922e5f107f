use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Nun levels always seat exactly this many nuns around the door.
pub const NUN_COUNT: u8 = 3;

/// Copies bought and removed in the shop, per card type. Nothing here is clamped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDeltas {
    purchased: BTreeMap<CardType, i32>,
    removed: BTreeMap<CardType, i32>,
}

impl DeckDeltas {
    pub fn purchase(&mut self, card: CardType) {
        *self.purchased.entry(card).or_default() += 1;
    }

    pub fn remove(&mut self, card: CardType) {
        *self.removed.entry(card).or_default() += 1;
    }

    pub fn purchased(&self, card: CardType) -> i32 {
        self.purchased.get(&card).copied().unwrap_or(0)
    }

    pub fn removed(&self, card: CardType) -> i32 {
        self.removed.get(&card).copied().unwrap_or(0)
    }

    /// Purchased copies net of removals. May be negative.
    pub fn net(&self, card: CardType) -> i32 {
        self.purchased(card) - self.removed(card)
    }
}

/// Shuffled tokens for one level, plus the boss quota the layout seats by shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    pub tokens: Vec<CardType>,
    pub nun_quota: u8,
}

impl Deck {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn count(&self, card: CardType) -> usize {
        self.tokens.iter().filter(|&&token| token == card).count()
    }

    /// Removes one token of `card` if the deck has one.
    pub fn take(&mut self, card: CardType) -> bool {
        match self.tokens.iter().position(|&token| token == card) {
            Some(index) => {
                self.tokens.remove(index);
                true
            }
            None => false,
        }
    }

    /// Splits into (fixed, drawn) tokens, preserving order within each half.
    pub fn partition(self, catalog: &CardCatalog) -> (Vec<CardType>, Vec<CardType>) {
        self.tokens
            .into_iter()
            .partition(|&token| catalog.is_fixed(token))
    }
}

pub struct DeckBuilder<'a> {
    catalog: &'a CardCatalog,
    deltas: &'a DeckDeltas,
}

impl<'a> DeckBuilder<'a> {
    pub fn new(catalog: &'a CardCatalog, deltas: &'a DeckDeltas) -> Self {
        Self { catalog, deltas }
    }

    /// Token count for one catalog entry on this level.
    pub fn token_count(&self, entry: &CardInfo, config: &LevelConfig) -> i32 {
        let card = entry.card_type;
        let is_nun = config.boss == Some(BossKind::Nun);

        if card.is_layout_placed() {
            return 0;
        }
        if card == CardType::Bell && config.boss.is_some() {
            return 0;
        }
        if card == CardType::Enemy {
            // snowman escorts come on top of this, see the layout generator
            return if is_nun { 0 } else { i32::from(config.enemy_count) };
        }
        entry.start + self.deltas.net(card)
    }

    pub fn build<R: Rng + ?Sized>(&self, config: &LevelConfig, rng: &mut R) -> Deck {
        let mut tokens = Vec::new();

        for entry in self.catalog.entries() {
            let count = self.token_count(entry, config);
            if count < 0 {
                log::debug!("Net count for {} is {count}, drawing none", entry.identifier);
            }
            for _ in 0..count {
                tokens.push(entry.card_type);
            }
        }

        tokens.shuffle(rng);

        let nun_quota = match config.boss {
            Some(BossKind::Nun) => NUN_COUNT,
            _ => 0,
        };
        log::debug!("Built deck of {} token(s) for {config:?}", tokens.len());
        Deck { tokens, nun_quota }
    }
}
