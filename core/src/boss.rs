use alloc::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossEncounter {
    Nun { doors_opened: u32 },
    Snowman { light_hits: u32 },
    Horribleman { catch_count: u32 },
}

/// What the flow layer should tell the player after a boss-relevant reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossSignal {
    /// More instances of this boss remain in the scene.
    KeepGoing { boss: BossKind, progress: u32 },
    /// The last nun door is open.
    FinalEscape,
    /// The snowman was touched without the flashlight; nothing counted.
    MustUseLight,
    /// The last snowman instance took its light hit.
    FinalLight,
    /// Intermediate catch.
    Caught { count: u32 },
    FinalCatch,
}

impl BossEncounter {
    pub const fn new(boss: BossKind) -> Self {
        match boss {
            BossKind::Nun => Self::Nun { doors_opened: 0 },
            BossKind::Snowman => Self::Snowman { light_hits: 0 },
            BossKind::Horribleman => Self::Horribleman { catch_count: 0 },
        }
    }

    pub const fn kind(&self) -> BossKind {
        match self {
            Self::Nun { .. } => BossKind::Nun,
            Self::Snowman { .. } => BossKind::Snowman,
            Self::Horribleman { .. } => BossKind::Horribleman,
        }
    }

    pub const fn progress(&self) -> u32 {
        match *self {
            Self::Nun { doors_opened } => doors_opened,
            Self::Snowman { light_hits } => light_hits,
            Self::Horribleman { catch_count } => catch_count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
    }

    /// Feeds one revealed card to the counter. Cards that do not concern this boss
    /// return `None` and change nothing.
    pub fn on_reveal(
        &mut self,
        card: CardType,
        method: RevealMethod,
        is_last_instance: bool,
    ) -> Option<BossSignal> {
        let boss = self.kind();
        match self {
            Self::Nun { doors_opened } if card == CardType::Door => {
                *doors_opened += 1;
                Some(if is_last_instance {
                    BossSignal::FinalEscape
                } else {
                    BossSignal::KeepGoing {
                        boss,
                        progress: *doors_opened,
                    }
                })
            }
            Self::Snowman { .. }
                if card == CardType::Snowman && method != RevealMethod::Flashlight =>
            {
                Some(BossSignal::MustUseLight)
            }
            Self::Snowman { light_hits } if card == CardType::Snowman => {
                *light_hits += 1;
                Some(if is_last_instance {
                    BossSignal::FinalLight
                } else {
                    BossSignal::KeepGoing {
                        boss,
                        progress: *light_hits,
                    }
                })
            }
            Self::Horribleman { catch_count } if card == CardType::Horribleman => {
                *catch_count += 1;
                Some(if is_last_instance {
                    BossSignal::FinalCatch
                } else {
                    BossSignal::Caught {
                        count: *catch_count,
                    }
                })
            }
            _ => None,
        }
    }
}

/// Every enemy-flagged, non-boss tile is revealed.
pub fn are_all_regular_enemies_defeated(board: &BoardState, catalog: &CardCatalog) -> bool {
    board
        .iter_cells()
        .filter(|(_, cell)| catalog.is_ordinary_enemy(cell.card))
        .all(|(_, cell)| cell.revealed)
}

/// The horribleman shows up only once the regular enemies are gone and the board has none yet,
/// hidden or caught.
pub fn can_spawn_horribleman(board: &BoardState, catalog: &CardCatalog) -> bool {
    board.boss() == Some(BossKind::Horribleman)
        && are_all_regular_enemies_defeated(board, catalog)
        && board.positions_of(CardType::Horribleman).is_empty()
}

/// Per-kind counters for a scene. Regenerating a board leaves them alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossProgress {
    encounters: BTreeMap<BossKind, BossEncounter>,
}

impl BossProgress {
    pub fn encounter(&self, boss: BossKind) -> BossEncounter {
        self.encounters
            .get(&boss)
            .copied()
            .unwrap_or(BossEncounter::new(boss))
    }

    pub fn on_reveal(
        &mut self,
        boss: BossKind,
        card: CardType,
        method: RevealMethod,
        is_last_instance: bool,
    ) -> Option<BossSignal> {
        let signal = self
            .encounters
            .entry(boss)
            .or_insert(BossEncounter::new(boss))
            .on_reveal(card, method, is_last_instance);
        if let Some(signal) = signal {
            log::debug!("Boss {boss} signal: {signal:?}");
        }
        signal
    }

    /// Called when the scene's boss sequence ends.
    pub fn reset(&mut self, boss: BossKind) {
        self.encounters.remove(&boss);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nun_counts_doors() {
        let mut nun = BossEncounter::new(BossKind::Nun);

        assert_eq!(nun.on_reveal(CardType::Nun, RevealMethod::Normal, false), None);
        assert_eq!(
            nun.on_reveal(CardType::Door, RevealMethod::Normal, false),
            Some(BossSignal::KeepGoing {
                boss: BossKind::Nun,
                progress: 1
            })
        );
        assert_eq!(
            nun.on_reveal(CardType::Door, RevealMethod::Normal, true),
            Some(BossSignal::FinalEscape)
        );
        assert_eq!(nun.progress(), 2);
    }

    #[test]
    fn snowman_needs_light() {
        let mut snowman = BossEncounter::new(BossKind::Snowman);

        assert_eq!(
            snowman.on_reveal(CardType::Snowman, RevealMethod::Normal, true),
            Some(BossSignal::MustUseLight)
        );
        assert_eq!(snowman.progress(), 0);
        assert_eq!(
            snowman.on_reveal(CardType::Snowman, RevealMethod::Flashlight, false),
            Some(BossSignal::KeepGoing {
                boss: BossKind::Snowman,
                progress: 1
            })
        );
        assert_eq!(
            snowman.on_reveal(CardType::Snowman, RevealMethod::Flashlight, true),
            Some(BossSignal::FinalLight)
        );
        assert_eq!(snowman.progress(), 2);
    }

    #[test]
    fn horribleman_counts_any_method() {
        let mut horribleman = BossEncounter::new(BossKind::Horribleman);

        assert_eq!(
            horribleman.on_reveal(CardType::Horribleman, RevealMethod::Normal, false),
            Some(BossSignal::Caught { count: 1 })
        );
        assert_eq!(
            horribleman.on_reveal(CardType::Horribleman, RevealMethod::Flashlight, true),
            Some(BossSignal::FinalCatch)
        );
        horribleman.reset();
        assert_eq!(horribleman.progress(), 0);
        assert_eq!(horribleman.kind(), BossKind::Horribleman);
    }

    #[test]
    fn progress_persists_until_reset() {
        let mut progress = BossProgress::default();
        progress.on_reveal(BossKind::Nun, CardType::Door, RevealMethod::Normal, false);
        progress.on_reveal(BossKind::Nun, CardType::Door, RevealMethod::Normal, false);
        assert_eq!(progress.encounter(BossKind::Nun).progress(), 2);
        assert_eq!(progress.encounter(BossKind::Snowman).progress(), 0);

        progress.reset(BossKind::Nun);
        assert_eq!(progress.encounter(BossKind::Nun).progress(), 0);
    }

    #[test]
    fn horribleman_spawn_gate() {
        let catalog = CardCatalog::default();
        let config = LevelConfig::new(5, 5, 1).with_boss(BossKind::Horribleman);
        let mut board = BoardState::new(config);
        board.place((0, 0), CardType::Enemy);

        assert!(!are_all_regular_enemies_defeated(&board, &catalog));
        assert!(!can_spawn_horribleman(&board, &catalog));

        board.mark_revealed((0, 0));
        assert!(are_all_regular_enemies_defeated(&board, &catalog));
        assert!(can_spawn_horribleman(&board, &catalog));

        board.place((4, 4), CardType::Horribleman);
        assert!(!can_spawn_horribleman(&board, &catalog));

        board.mark_revealed((4, 4));
        assert!(!can_spawn_horribleman(&board, &catalog));
    }
}
