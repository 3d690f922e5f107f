#![no_std]

extern crate alloc;

pub use board::*;
pub use boss::*;
pub use card::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use hint::*;
pub use level::*;
pub use sign::*;
pub use types::*;

mod board;
mod boss;
mod card;
mod deck;
mod engine;
mod error;
mod events;
mod generator;
mod hint;
mod level;
mod sign;
mod types;
