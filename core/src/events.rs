use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// How a tile got opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealMethod {
    /// Player click.
    Normal,
    /// Flashlight use, never hurts.
    Flashlight,
    /// Follow-up reveal inside a swap or an iceground slide.
    Chain,
}

impl RevealMethod {
    pub const fn deals_damage(self) -> bool {
        !matches!(self, Self::Flashlight)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealEvent {
    pub coords: Coord2,
    pub card: CardType,
    pub method: RevealMethod,
    /// No hidden tile is left anywhere.
    pub is_last_tile: bool,
    /// This tile is not an enemy and every hidden tile left is one.
    pub is_last_non_enemy: bool,
    pub is_first_in_chain: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardEvent {
    Revealed(RevealEvent),
    HintReady { coords: Coord2, hint: Hint },
    FrontierChanged { added: Vec<Coord2> },
    Swapped { from: Coord2, to: Coord2 },
    SignsChanged,
    HorriblemanSpawned { coords: Coord2 },
    Cleared,
}

/// Output channel the engine reports through. Presentation, audio and economy
/// layers implement this; the engine never holds global state.
pub trait EventSink {
    fn emit(&mut self, event: BoardEvent);
}

/// Drops everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: BoardEvent) {}
}

impl EventSink for Vec<BoardEvent> {
    fn emit(&mut self, event: BoardEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: BoardEvent) {
        (**self).emit(event);
    }
}
