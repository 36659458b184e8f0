//! User intents
//!
//! Everything the presentation layer (CLI, scripts) can ask the tracker to
//! do, plus what came back. Intents are plain data so scripts can list them
//! in JSON.

use serde::{Deserialize, Serialize};

use super::components::EntityRef;
use super::systems::RoundReport;

/// A request from the user.
///
/// Amounts are magnitudes; the sign comes from the variant (`Damage` vs
/// `Heal`). Amounts below 1 are raised to 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    Damage { target: EntityRef, amount: i32 },
    Heal { target: EntityRef, amount: i32 },
    SpendMana { player: u32, amount: i32 },
    RestoreMana { player: u32, amount: i32 },
    Stun { target: EntityRef, rounds: i32 },
    Summon { player: u32, rounds: i32 },
    Bleed { target: EntityRef, damage: i32 },
    ClearBleed { target: EntityRef },
    Note { player: u32, text: String },
    AddPlayer { name: String, max_hp: i32, max_mana: i32 },
    AddEnemy { name: String, max_hp: i32 },
    Remove { target: EntityRef },
    /// Start arranging a manual turn order
    BeginOrdering,
    /// Move an entry of the working order
    Reorder { from: usize, to: usize },
    Start {
        #[serde(default)]
        manual: bool,
    },
    Advance,
    Reset,
}

impl Intent {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Damage { .. } => "damage",
            Intent::Heal { .. } => "heal",
            Intent::SpendMana { .. } => "spend mana",
            Intent::RestoreMana { .. } => "restore mana",
            Intent::Stun { .. } => "stun",
            Intent::Summon { .. } => "summon",
            Intent::Bleed { .. } => "bleed",
            Intent::ClearBleed { .. } => "clear bleed",
            Intent::Note { .. } => "note",
            Intent::AddPlayer { .. } => "add player",
            Intent::AddEnemy { .. } => "add enemy",
            Intent::Remove { .. } => "remove",
            Intent::BeginOrdering => "begin ordering",
            Intent::Reorder { .. } => "reorder",
            Intent::Start { .. } => "start",
            Intent::Advance => "advance",
            Intent::Reset => "reset",
        }
    }
}

/// Why an intent was refused without changing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A mana debit larger than the pool
    InsufficientMana {
        name: String,
        available: i32,
        requested: i32,
    },
    /// Stunned entities cannot be stunned again until the stun runs out
    AlreadyStunned { name: String },
    /// Stunned players cannot use mana; stunned enemies' hp is locked
    Stunned { name: String },
    /// Summoning needs a minimum mana pool
    SummonNeedsMana {
        name: String,
        available: i32,
        required: i32,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::InsufficientMana {
                name,
                available,
                requested,
            } => write!(
                f,
                "Insufficient mana: {} has {} but needs {}",
                name, available, requested
            ),
            Rejection::AlreadyStunned { name } => write!(f, "{} is already stunned", name),
            Rejection::Stunned { name } => write!(f, "{} is stunned", name),
            Rejection::SummonNeedsMana {
                name,
                available,
                required,
            } => write!(
                f,
                "{} needs at least {} mana to summon (has {})",
                name, required, available
            ),
        }
    }
}

/// Which persisted blobs an intent changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Touched {
    pub players: bool,
    pub enemies: bool,
    pub session: bool,
}

impl Touched {
    pub const NONE: Touched = Touched {
        players: false,
        enemies: false,
        session: false,
    };

    pub const ALL: Touched = Touched {
        players: true,
        enemies: true,
        session: true,
    };

    pub fn entity(target: EntityRef) -> Self {
        Self {
            players: target.is_player(),
            enemies: !target.is_player(),
            session: false,
        }
    }

    pub fn players() -> Self {
        Self {
            players: true,
            ..Self::NONE
        }
    }

    pub fn session() -> Self {
        Self {
            session: true,
            ..Self::NONE
        }
    }

    pub fn merge(self, other: Touched) -> Self {
        Self {
            players: self.players || other.players,
            enemies: self.enemies || other.enemies,
            session: self.session || other.session,
        }
    }

    pub fn any(&self) -> bool {
        self.players || self.enemies || self.session
    }
}

/// What an accepted intent did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A field changed; carries the new value
    Adjusted { target: EntityRef, value: i32 },
    Noted { player: u32 },
    Added { entity: EntityRef },
    Removed { entity: EntityRef, name: String },
    OrderingBegun { working: Vec<EntityRef> },
    Reordered { working: Vec<EntityRef> },
    Started { sequence: Vec<EntityRef> },
    Advanced {
        index: usize,
        actor_name: Option<String>,
        round: Option<RoundReport>,
    },
    Reset,
    /// Refused; nothing changed
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}
