//! Combat core
//!
//! Implements the tracker's state machine:
//! - Player and enemy rosters with health, mana and status fields
//! - Turn order (random or manual) and round progression
//! - End-of-round effects (bleed, stun and summon decay)
//! - Combat logging

pub mod components;
pub mod events;
pub mod log;
pub mod store;
pub mod systems;
pub mod turn_order;

pub use components::{Combatant, Enemy, EntityKind, EntityRef, Player, Vitals};
pub use events::{Intent, Outcome, Rejection, Touched};
pub use store::{EntityEntry, EntityStore, StoreError};
pub use systems::{advance_round, RoundEffect, RoundReport};
pub use turn_order::{GameClock, GameRng, TurnAdvance, TurnEngine, TurnOrderError, TurnPhase};
