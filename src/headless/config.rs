//! JSON configuration parsing for scripted encounters
//!
//! Parses a script file and turns it into a starting roster, gate rules and
//! the list of intents to replay.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::combat::{EntityRef, EntityStore, Intent};
use crate::encounter::GateRules;

/// A player in a script roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub max_hp: i32,
    pub max_mana: i32,
}

/// An enemy in a script roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub name: String,
    pub max_hp: i32,
}

/// Scripted encounter loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Player roster (default: the built-in party)
    #[serde(default)]
    pub players: Option<Vec<PlayerSpec>>,
    /// Enemy roster (default: the built-in enemies)
    #[serde(default)]
    pub enemies: Option<Vec<EnemySpec>>,
    /// Names in acting order. When present, the game is started with this
    /// manual order before any action runs; unlisted entities act last, in
    /// roster order.
    #[serde(default)]
    pub manual_order: Vec<String>,
    /// Random seed for a reproducible shuffled order
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Intents to apply, in order
    #[serde(default)]
    pub actions: Vec<Intent>,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default = "default_enforce_card_gates")]
    pub enforce_card_gates: bool,
    #[serde(default = "default_summon_mana_threshold")]
    pub summon_mana_threshold: i32,
}

fn default_enforce_card_gates() -> bool {
    true
}

fn default_summon_mana_threshold() -> i32 {
    20
}

impl ScriptConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read script file: {}", e))?;

        let config: ScriptConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for player in self.players.iter().flatten() {
            if player.name.trim().is_empty() {
                return Err("player names must not be empty".to_string());
            }
            if player.max_hp < 1 || player.max_mana < 1 {
                return Err(format!(
                    "player '{}' needs max_hp and max_mana of at least 1",
                    player.name
                ));
            }
        }
        for enemy in self.enemies.iter().flatten() {
            if enemy.name.trim().is_empty() {
                return Err("enemy names must not be empty".to_string());
            }
            if enemy.max_hp < 1 {
                return Err(format!("enemy '{}' needs max_hp of at least 1", enemy.name));
            }
        }

        if self.summon_mana_threshold < 0 {
            return Err("summon_mana_threshold must not be negative".to_string());
        }

        if !self.manual_order.is_empty() {
            self.resolve_manual_order(&self.build_store())?;
        }
        Ok(())
    }

    /// Build the starting roster
    pub fn build_store(&self) -> EntityStore {
        let defaults = EntityStore::default();
        let mut store = EntityStore::empty();

        match &self.players {
            Some(players) => {
                for p in players {
                    store.add_player(p.name.clone(), p.max_hp, p.max_mana);
                }
            }
            None => {
                for p in defaults.players() {
                    store.add_player(p.name.clone(), p.vitals.max_hp, p.max_mana);
                }
            }
        }
        match &self.enemies {
            Some(enemies) => {
                for e in enemies {
                    store.add_enemy(e.name.clone(), e.max_hp);
                }
            }
            None => {
                for e in defaults.enemies() {
                    store.add_enemy(e.name.clone(), e.vitals.max_hp);
                }
            }
        }
        store
    }

    /// Map the manual order names onto entity references
    pub fn resolve_manual_order(&self, store: &EntityStore) -> Result<Vec<EntityRef>, String> {
        let mut seen = HashSet::new();
        let mut order = Vec::with_capacity(self.manual_order.len());

        for name in &self.manual_order {
            let matches: Vec<EntityRef> = store
                .roster()
                .into_iter()
                .filter(|r| store.name_of(*r) == Some(name.as_str()))
                .collect();
            let entity = match matches.as_slice() {
                [single] => *single,
                [] => return Err(format!("manual_order: unknown combatant '{}'", name)),
                _ => return Err(format!("manual_order: '{}' is ambiguous", name)),
            };
            if !seen.insert(entity) {
                return Err(format!("manual_order: '{}' is listed twice", name));
            }
            order.push(entity);
        }
        Ok(order)
    }

    pub fn gate_rules(&self) -> GateRules {
        GateRules {
            enabled: self.enforce_card_gates,
            summon_mana_threshold: self.summon_mana_threshold,
        }
    }
}
