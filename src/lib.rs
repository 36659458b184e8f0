//! rpgtracker - Tabletop RPG Combat Tracker
//!
//! Tracks a roster of player characters and enemies through a combat
//! encounter: hit points, mana, stun/summon/bleed effects, and a random or
//! hand-arranged turn order that advances round by round.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod encounter;
pub mod headless;
pub mod persistence;
pub mod settings;
pub mod view;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::{EntityKind, EntityRef, EntityStore, Intent, TurnEngine};
pub use encounter::{Applied, Encounter, GateRules, TrackerError};
pub use headless::ScriptConfig;
pub use persistence::SaveDir;
