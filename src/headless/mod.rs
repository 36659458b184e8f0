//! Scripted encounters
//!
//! Runs a whole encounter from a JSON script without touching the save
//! directory, suitable for automated testing and for replaying a session.
//!
//! ## Usage
//!
//! ```bash
//! rpgtracker run encounter.json --output log.json
//! ```
//!
//! ## JSON Script
//!
//! ```json
//! {
//!   "players": [{ "name": "Mage", "max_hp": 70, "max_mana": 100 }],
//!   "enemies": [{ "name": "Troll", "max_hp": 150 }],
//!   "manual_order": ["Troll", "Mage"],
//!   "actions": [
//!     { "action": "bleed", "target": { "kind": "enemy", "id": 1 }, "damage": 5 },
//!     { "action": "advance" },
//!     { "action": "advance" }
//!   ]
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::ScriptConfig;
pub use runner::{run_script, run_script_file, CombatantResult, EncounterResult};
