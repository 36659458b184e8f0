//! Entity definitions
//!
//! Player characters and enemies share a common [`Vitals`] block (health,
//! stun, bleed). Players additionally carry mana, a summon timer and notes.
//! The kind of an entity is always explicit: an [`EntityRef`] pairs the
//! per-collection id with an [`EntityKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which collection an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Enemy,
}

impl EntityKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::Enemy => "Enemy",
        }
    }

    /// Single-letter prefix used in target strings (`p2`, `e1`)
    pub fn prefix(&self) -> char {
        match self {
            EntityKind::Player => 'p',
            EntityKind::Enemy => 'e',
        }
    }
}

/// Reference to an entity in the store.
///
/// Ids are only unique within one collection, so the kind is part of the
/// identity. Turn sequences hold these rather than copies of the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u32,
}

impl EntityRef {
    pub fn player(id: u32) -> Self {
        Self {
            kind: EntityKind::Player,
            id,
        }
    }

    pub fn enemy(id: u32) -> Self {
        Self {
            kind: EntityKind::Enemy,
            id,
        }
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for EntityRef {
    type Err = String;

    /// Accepts `p2`, `e1`, `player:2`, `enemy:1` (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (kind, digits) = if let Some(rest) = lower.strip_prefix("player:") {
            (EntityKind::Player, rest)
        } else if let Some(rest) = lower.strip_prefix("enemy:") {
            (EntityKind::Enemy, rest)
        } else if let Some(rest) = lower.strip_prefix('p') {
            (EntityKind::Player, rest)
        } else if let Some(rest) = lower.strip_prefix('e') {
            (EntityKind::Enemy, rest)
        } else {
            return Err(format!(
                "Invalid target '{}'. Use p<id> / e<id> (e.g. p2, e1)",
                s
            ));
        };

        let id = digits
            .parse::<u32>()
            .map_err(|_| format!("Invalid target id in '{}'", s))?;
        Ok(Self { kind, id })
    }
}

/// Combat attributes shared by players and enemies.
///
/// Invariants: `0 <= hp <= max_hp`, `stun_duration >= 0`, `bleed_damage >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub stun_duration: i32,
    /// Flat damage taken at every round boundary until cleared
    #[serde(default)]
    pub bleed_damage: i32,
}

impl Vitals {
    /// Full health, no status effects
    pub fn fresh(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            stun_duration: 0,
            bleed_damage: 0,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_duration > 0
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Health as a percentage of maximum, for bar widths
    pub fn hp_percent(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.max_hp as f32) * 100.0
    }

    /// Re-establish the field invariants after loading untrusted data
    pub fn normalize(&mut self) {
        self.max_hp = self.max_hp.max(1);
        self.hp = self.hp.clamp(0, self.max_hp);
        self.stun_duration = self.stun_duration.max(0);
        self.bleed_damage = self.bleed_damage.max(0);
    }
}

/// Common access to the shared combat attributes
pub trait Combatant {
    fn id(&self) -> u32;
    fn name(&self) -> &str;
    fn kind(&self) -> EntityKind;
    fn vitals(&self) -> &Vitals;
    fn vitals_mut(&mut self) -> &mut Vitals;

    fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: self.kind(),
            id: self.id(),
        }
    }
}

/// A player character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub vitals: Vitals,
    pub mana: i32,
    pub max_mana: i32,
    #[serde(default)]
    pub summon_duration: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, max_hp: i32, max_mana: i32) -> Self {
        let max_mana = max_mana.max(1);
        Self {
            id,
            name: name.into(),
            vitals: Vitals::fresh(max_hp),
            mana: max_mana,
            max_mana,
            summon_duration: 0,
            notes: String::new(),
        }
    }

    pub fn mana_percent(&self) -> f32 {
        if self.max_mana <= 0 {
            return 0.0;
        }
        (self.mana as f32 / self.max_mana as f32) * 100.0
    }

    pub fn normalize(&mut self) {
        self.vitals.normalize();
        self.max_mana = self.max_mana.max(1);
        self.mana = self.mana.clamp(0, self.max_mana);
        self.summon_duration = self.summon_duration.max(0);
    }
}

impl Combatant for Player {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}

/// An enemy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub vitals: Vitals,
}

impl Enemy {
    pub fn new(id: u32, name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id,
            name: name.into(),
            vitals: Vitals::fresh(max_hp),
        }
    }
}

impl Combatant for Enemy {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Enemy
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }
}

/// The roster a fresh tracker starts with
pub fn default_players() -> Vec<Player> {
    vec![
        Player::new(1, "Guerrier", 100, 50),
        Player::new(2, "Mage", 70, 100),
        Player::new(3, "Prêtre", 80, 80),
        Player::new(4, "Voleur", 75, 60),
        Player::new(5, "Druide", 85, 70),
    ]
}

pub fn default_enemies() -> Vec<Enemy> {
    vec![
        Enemy::new(1, "Dragon", 200),
        Enemy::new(2, "Gobelin", 50),
        Enemy::new(3, "Troll", 150),
        Enemy::new(4, "Sorcier Noir", 80),
    ]
}
