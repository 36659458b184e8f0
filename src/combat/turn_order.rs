//! Turn order engine
//!
//! Builds the acting sequence for a game (random shuffle or a manually
//! arranged working copy), tracks whose turn it is, and triggers round
//! advancement when play wraps back to the first slot.
//!
//! ## Phases
//!
//! ```text
//! NotStarted --begin_ordering--> Configuring --reorder--> Configuring
//!      |                              |
//!      +----------start---------------+--> Active --advance--> Active
//!                                                  \--reset--> NotStarted
//! ```
//!
//! The sequence is a frozen snapshot of entity references. Entities removed
//! mid-game keep their slot: index arithmetic always runs over the original
//! length, and views drop the dead slot when resolving against the store.

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::components::EntityRef;
use super::store::EntityStore;
use super::systems::{advance_round, RoundReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnOrderError {
    #[error("cannot start a game with an empty roster")]
    EmptyRoster,

    #[error("the game has already started; reset it first")]
    AlreadyStarted,

    #[error("the game has not started")]
    NotStarted,

    #[error("the turn order can only be arranged before the game starts")]
    NotConfiguring,

    #[error("position {index} is out of range (order has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Seeded random number generator for turn shuffling.
///
/// With a seed, the same roster always shuffles into the same order.
/// Without one, uses system entropy.
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform in-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Round and turn counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Starts at 1, only ever increases until reset
    pub current_round: u32,
    /// Index into the turn sequence
    pub current_turn_index: usize,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            current_round: 1,
            current_turn_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    NotStarted,
    /// A manual order is being assembled
    Configuring { working: Vec<EntityRef> },
    /// A concrete sequence exists
    Active {
        sequence: Vec<EntityRef>,
        current_actor: Option<String>,
    },
}

/// Result of a single `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnAdvance {
    pub index: usize,
    pub actor: Option<EntityRef>,
    pub actor_name: Option<String>,
    /// Present when the sequence wrapped and a round ended
    pub round: Option<RoundReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnEngine {
    phase: TurnPhase,
    clock: GameClock,
}

impl TurnEngine {
    /// Restore an engine from persisted parts
    pub fn from_parts(phase: TurnPhase, clock: GameClock) -> Self {
        let mut engine = Self { phase, clock };
        if let TurnPhase::Active { sequence, .. } = &engine.phase {
            if sequence.is_empty() || engine.clock.current_turn_index >= sequence.len() {
                engine.clock.current_turn_index = 0;
            }
        }
        engine.clock.current_round = engine.clock.current_round.max(1);
        engine
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn clock(&self) -> GameClock {
        self.clock
    }

    pub fn current_round(&self) -> u32 {
        self.clock.current_round
    }

    pub fn current_turn_index(&self) -> usize {
        self.clock.current_turn_index
    }

    pub fn game_started(&self) -> bool {
        matches!(self.phase, TurnPhase::Active { .. })
    }

    /// The full acting sequence, including stale slots
    pub fn sequence(&self) -> Option<&[EntityRef]> {
        match &self.phase {
            TurnPhase::Active { sequence, .. } => Some(sequence),
            _ => None,
        }
    }

    /// The manual order being arranged, if any
    pub fn working_order(&self) -> Option<&[EntityRef]> {
        match &self.phase {
            TurnPhase::Configuring { working } => Some(working),
            _ => None,
        }
    }

    /// Entity in the current slot (which may no longer exist in the store)
    pub fn current_entity(&self) -> Option<EntityRef> {
        self.sequence()
            .and_then(|seq| seq.get(self.clock.current_turn_index))
            .copied()
    }

    pub fn current_actor_name(&self) -> Option<&str> {
        match &self.phase {
            TurnPhase::Active { current_actor, .. } => current_actor.as_deref(),
            _ => None,
        }
    }

    /// Whether `entity` holds the current turn
    pub fn is_active(&self, entity: EntityRef) -> bool {
        self.current_entity() == Some(entity)
    }

    /// Enter the configuring phase with the combined roster as working copy
    pub fn begin_ordering(&mut self, store: &EntityStore) -> Result<&[EntityRef], TurnOrderError> {
        if self.game_started() {
            return Err(TurnOrderError::AlreadyStarted);
        }
        self.phase = TurnPhase::Configuring {
            working: store.roster(),
        };
        debug!("Arranging turn order over {} entities", store.len());
        Ok(self.working_order().unwrap_or_default())
    }

    /// Move the working-copy entry at `from` to position `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), TurnOrderError> {
        let TurnPhase::Configuring { working } = &mut self.phase else {
            return Err(TurnOrderError::NotConfiguring);
        };

        let len = working.len();
        for index in [from, to] {
            if index >= len {
                return Err(TurnOrderError::IndexOutOfRange { index, len });
            }
        }

        let moved = working.remove(from);
        working.insert(to, moved);
        Ok(())
    }

    /// Build the sequence and make it active.
    ///
    /// With `manual`, the working copy is adopted in its arranged order,
    /// minus entities no longer in the store (or the roster order if
    /// nothing was arranged). Otherwise the combined roster is shuffled.
    pub fn start(
        &mut self,
        store: &EntityStore,
        manual: bool,
        rng: &mut GameRng,
    ) -> Result<&[EntityRef], TurnOrderError> {
        let sequence = match std::mem::take(&mut self.phase) {
            TurnPhase::Active {
                sequence,
                current_actor,
            } => {
                self.phase = TurnPhase::Active {
                    sequence,
                    current_actor,
                };
                return Err(TurnOrderError::AlreadyStarted);
            }
            TurnPhase::Configuring { working } if manual => {
                let live: Vec<EntityRef> = working
                    .iter()
                    .copied()
                    .filter(|entity| store.contains(*entity))
                    .collect();
                if live.is_empty() {
                    self.phase = TurnPhase::Configuring { working };
                    return Err(TurnOrderError::EmptyRoster);
                }
                live
            }
            TurnPhase::Configuring { .. } | TurnPhase::NotStarted => {
                let mut roster = store.roster();
                if !manual {
                    rng.shuffle(&mut roster);
                }
                roster
            }
        };

        if sequence.is_empty() {
            return Err(TurnOrderError::EmptyRoster);
        }

        self.clock.current_turn_index = 0;
        let current_actor = sequence
            .first()
            .and_then(|first| store.name_of(*first))
            .map(str::to_string);

        info!(
            "Game started with {} {} order",
            sequence.len(),
            if manual { "manual" } else { "random" }
        );
        self.phase = TurnPhase::Active {
            sequence,
            current_actor,
        };
        Ok(self.sequence().unwrap_or_default())
    }

    /// Pass the turn to the next slot.
    ///
    /// When the index wraps to 0, end-of-round effects are applied to the
    /// store and the round counter increases before the index moves.
    pub fn advance(&mut self, store: &mut EntityStore) -> Result<TurnAdvance, TurnOrderError> {
        let len = self.sequence().map(<[EntityRef]>::len).unwrap_or(0);
        if len == 0 {
            return Err(TurnOrderError::NotStarted);
        }

        let next = (self.clock.current_turn_index + 1) % len;
        let round = if next == 0 {
            let report = advance_round(store, self.clock.current_round);
            self.clock.current_round += 1;
            info!("Round {} begins", self.clock.current_round);
            Some(report)
        } else {
            None
        };

        self.clock.current_turn_index = next;
        let actor = self.current_entity();
        let actor_name = actor.and_then(|a| store.name_of(a)).map(str::to_string);
        if let TurnPhase::Active { current_actor, .. } = &mut self.phase {
            current_actor.clone_from(&actor_name);
        }

        Ok(TurnAdvance {
            index: next,
            actor,
            actor_name,
            round,
        })
    }

    /// Drop a removed entity from the order being arranged. Returns true
    /// if the working copy changed.
    pub fn forget(&mut self, entity: EntityRef) -> bool {
        let TurnPhase::Configuring { working } = &mut self.phase else {
            return false;
        };
        let before = working.len();
        working.retain(|r| *r != entity);
        working.len() != before
    }

    /// Re-read the current actor's name after a roster change
    pub fn refresh_actor(&mut self, store: &EntityStore) {
        let name = self
            .current_entity()
            .and_then(|entity| store.name_of(entity))
            .map(str::to_string);
        if let TurnPhase::Active { current_actor, .. } = &mut self.phase {
            *current_actor = name;
        }
    }

    /// Back to NotStarted with a fresh clock
    pub fn reset(&mut self) {
        self.phase = TurnPhase::NotStarted;
        self.clock = GameClock::default();
    }
}
