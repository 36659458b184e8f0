//! Encounter state
//!
//! The single owned state object of the tracker: roster, turn engine and
//! combat log. Every user intent goes through [`Encounter::apply`], which
//! mutates the state, records what happened, and reports which persisted
//! collections were touched.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::{
    EntityRef, EntityStore, GameRng, Intent, Outcome, Rejection, StoreError, Touched, TurnEngine,
    TurnOrderError,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    TurnOrder(#[from] TurnOrderError),
}

/// Card-level restrictions on otherwise valid store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateRules {
    pub enabled: bool,
    /// Mana a player must hold to summon
    pub summon_mana_threshold: i32,
}

impl Default for GateRules {
    fn default() -> Self {
        Self {
            enabled: true,
            summon_mana_threshold: 20,
        }
    }
}

impl GateRules {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// An accepted (or politely refused) intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub outcome: Outcome,
    pub touched: Touched,
}

impl Applied {
    fn new(outcome: Outcome, touched: Touched) -> Self {
        Self { outcome, touched }
    }

    fn rejected(rejection: Rejection) -> Self {
        Self {
            outcome: Outcome::Rejected(rejection),
            touched: Touched::NONE,
        }
    }
}

pub struct Encounter {
    store: EntityStore,
    turns: TurnEngine,
    log: CombatLog,
    rules: GateRules,
    rng: GameRng,
    /// Roster restored by `reset`
    baseline: EntityStore,
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new(EntityStore::default())
    }
}

impl Encounter {
    /// Fresh encounter; `reset` returns to this roster
    pub fn new(store: EntityStore) -> Self {
        Self {
            baseline: store.clone(),
            store,
            turns: TurnEngine::default(),
            log: CombatLog::new(1),
            rules: GateRules::default(),
            rng: GameRng::from_entropy(),
        }
    }

    /// Resume from saved state; `reset` returns to the default roster
    pub fn resume(store: EntityStore, turns: TurnEngine) -> Self {
        Self {
            log: CombatLog::new(turns.current_round()),
            store,
            turns,
            rules: GateRules::default(),
            rng: GameRng::from_entropy(),
            baseline: EntityStore::default(),
        }
    }

    pub fn with_rules(mut self, rules: GateRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn turns(&self) -> &TurnEngine {
        &self.turns
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn rules(&self) -> GateRules {
        self.rules
    }

    pub fn current_round(&self) -> u32 {
        self.turns.current_round()
    }

    pub fn game_started(&self) -> bool {
        self.turns.game_started()
    }

    fn name(&self, target: EntityRef) -> Result<String, StoreError> {
        self.store
            .name_of(target)
            .map(str::to_string)
            .ok_or(StoreError::EntityNotFound(target))
    }

    /// Apply a user intent
    pub fn apply(&mut self, intent: Intent) -> Result<Applied, TrackerError> {
        debug!("Applying intent: {}", intent.label());
        let applied = match intent {
            Intent::Damage { target, amount } => self.change_hp(target, -amount.max(1))?,
            Intent::Heal { target, amount } => self.change_hp(target, amount.max(1))?,
            Intent::SpendMana { player, amount } => self.change_mana(player, -amount.max(1))?,
            Intent::RestoreMana { player, amount } => self.change_mana(player, amount.max(1))?,
            Intent::Stun { target, rounds } => self.stun(target, rounds.max(1))?,
            Intent::Summon { player, rounds } => self.summon(player, rounds.max(1))?,
            Intent::Bleed { target, damage } => self.bleed(target, damage.max(1))?,
            Intent::ClearBleed { target } => {
                let name = self.name(target)?;
                self.store.clear_bleed(target)?;
                self.log.log_for(
                    CombatLogEventType::StatusRemoved,
                    target,
                    0,
                    format!("{} stops bleeding", name),
                );
                Applied::new(Outcome::Adjusted { target, value: 0 }, Touched::entity(target))
            }
            Intent::Note { player, text } => {
                self.store.set_notes(player, text)?;
                Applied::new(Outcome::Noted { player }, Touched::players())
            }
            Intent::AddPlayer {
                name,
                max_hp,
                max_mana,
            } => {
                let entity = self.store.add_player(name.clone(), max_hp, max_mana);
                self.log_roster(entity, format!("{} joins the party", name));
                Applied::new(Outcome::Added { entity }, Touched::entity(entity))
            }
            Intent::AddEnemy { name, max_hp } => {
                let entity = self.store.add_enemy(name.clone(), max_hp);
                self.log_roster(entity, format!("{} enters the fight", name));
                Applied::new(Outcome::Added { entity }, Touched::entity(entity))
            }
            Intent::Remove { target } => {
                let name = self.store.remove(target)?;
                let mut touched = Touched::entity(target);
                if self.turns.sequence().is_some_and(|seq| seq.contains(&target)) {
                    debug!("{} removed mid-game; its turn slot stays in the order", target);
                }
                if self.turns.forget(target) {
                    touched = touched.merge(Touched::session());
                }
                if self.turns.is_active(target) {
                    self.turns.refresh_actor(&self.store);
                    touched = touched.merge(Touched::session());
                }
                self.log_roster(target, format!("{} leaves the encounter", name));
                Applied::new(
                    Outcome::Removed {
                        entity: target,
                        name,
                    },
                    touched,
                )
            }
            Intent::BeginOrdering => {
                let working = self.turns.begin_ordering(&self.store)?.to_vec();
                Applied::new(Outcome::OrderingBegun { working }, Touched::session())
            }
            Intent::Reorder { from, to } => {
                self.turns.reorder(from, to)?;
                let working = self.turns.working_order().unwrap_or_default().to_vec();
                Applied::new(Outcome::Reordered { working }, Touched::session())
            }
            Intent::Start { manual } => self.start(manual)?,
            Intent::Advance => self.advance()?,
            Intent::Reset => {
                self.reset();
                Applied::new(Outcome::Reset, Touched::ALL)
            }
        };

        if let Outcome::Rejected(rejection) = &applied.outcome {
            warn!("{}", rejection);
            self.log
                .log(CombatLogEventType::Rejected, rejection.to_string());
        }
        Ok(applied)
    }

    fn log_roster(&mut self, entity: EntityRef, message: String) {
        self.log
            .log_for(CombatLogEventType::Roster, entity, 0, message);
    }

    fn change_hp(&mut self, target: EntityRef, delta: i32) -> Result<Applied, TrackerError> {
        let name = self.name(target)?;
        let (before, stunned) = self
            .store
            .get(target)
            .map(|e| (e.vitals().hp, e.vitals().is_stunned()))
            .unwrap_or((0, false));
        // Enemy cards lock their hp while stunned; player cards do not
        if self.rules.enabled && stunned && !target.is_player() {
            return Ok(Applied::rejected(Rejection::Stunned { name }));
        }

        let hp = self.store.adjust_hp(target, delta)?;
        let change = hp - before;

        if delta < 0 {
            self.log.log_for(
                CombatLogEventType::Damage,
                target,
                -change,
                format!("{} takes {} damage ({} hp left)", name, -change, hp),
            );
            if before > 0 && hp == 0 {
                self.log.log_for(
                    CombatLogEventType::Death,
                    target,
                    0,
                    format!("{} has fallen", name),
                );
            }
        } else {
            self.log.log_for(
                CombatLogEventType::Healing,
                target,
                change,
                format!("{} is healed for {} ({} hp)", name, change, hp),
            );
        }

        Ok(Applied::new(
            Outcome::Adjusted { target, value: hp },
            Touched::entity(target),
        ))
    }

    fn change_mana(&mut self, player: u32, delta: i32) -> Result<Applied, TrackerError> {
        let target = EntityRef::player(player);
        let entry = self
            .store
            .player(player)
            .ok_or(StoreError::PlayerNotFound(player))?;
        let (name, before) = (entry.name.clone(), entry.mana);

        if self.rules.enabled && entry.vitals.is_stunned() {
            return Ok(Applied::rejected(Rejection::Stunned { name }));
        }

        let mana = match self.store.adjust_mana(player, delta) {
            Ok(mana) => mana,
            Err(StoreError::InsufficientMana {
                name,
                available,
                requested,
            }) => {
                return Ok(Applied::rejected(Rejection::InsufficientMana {
                    name,
                    available,
                    requested,
                }))
            }
            Err(e) => return Err(e.into()),
        };

        let verb = if delta < 0 { "spends" } else { "recovers" };
        self.log.log_for(
            CombatLogEventType::Mana,
            target,
            mana - before,
            format!("{} {} {} mana ({} left)", name, verb, (mana - before).abs(), mana),
        );
        Ok(Applied::new(
            Outcome::Adjusted {
                target,
                value: mana,
            },
            Touched::players(),
        ))
    }

    fn stun(&mut self, target: EntityRef, rounds: i32) -> Result<Applied, TrackerError> {
        let name = self.name(target)?;
        let stunned = self
            .store
            .get(target)
            .is_some_and(|e| e.vitals().is_stunned());
        if self.rules.enabled && stunned {
            return Ok(Applied::rejected(Rejection::AlreadyStunned { name }));
        }

        let value = self.store.adjust_stun(target, rounds)?;
        self.log.log_for(
            CombatLogEventType::StatusApplied,
            target,
            rounds,
            format!("{} is stunned for {} rounds", name, value),
        );
        Ok(Applied::new(
            Outcome::Adjusted { target, value },
            Touched::entity(target),
        ))
    }

    fn summon(&mut self, player: u32, rounds: i32) -> Result<Applied, TrackerError> {
        let target = EntityRef::player(player);
        let entry = self
            .store
            .player(player)
            .ok_or(StoreError::PlayerNotFound(player))?;
        let name = entry.name.clone();

        if self.rules.enabled {
            if entry.vitals.is_stunned() {
                return Ok(Applied::rejected(Rejection::Stunned { name }));
            }
            if entry.mana < self.rules.summon_mana_threshold {
                return Ok(Applied::rejected(Rejection::SummonNeedsMana {
                    name,
                    available: entry.mana,
                    required: self.rules.summon_mana_threshold,
                }));
            }
        }

        let value = self.store.adjust_summon(player, rounds)?;
        self.log.log_for(
            CombatLogEventType::StatusApplied,
            target,
            rounds,
            format!("{} summons for {} rounds", name, value),
        );
        Ok(Applied::new(
            Outcome::Adjusted { target, value },
            Touched::players(),
        ))
    }

    fn bleed(&mut self, target: EntityRef, damage: i32) -> Result<Applied, TrackerError> {
        let name = self.name(target)?;
        let value = self.store.adjust_bleed(target, damage)?;
        self.log.log_for(
            CombatLogEventType::StatusApplied,
            target,
            damage,
            format!("{} bleeds for {} per round", name, value),
        );
        Ok(Applied::new(
            Outcome::Adjusted { target, value },
            Touched::entity(target),
        ))
    }

    fn start(&mut self, manual: bool) -> Result<Applied, TrackerError> {
        let sequence = self
            .turns
            .start(&self.store, manual, &mut self.rng)?
            .to_vec();

        self.log.round = self.turns.current_round();
        self.log.log(
            CombatLogEventType::MatchEvent,
            format!(
                "Game started ({} order, {} combatants)",
                if manual { "manual" } else { "random" },
                sequence.len()
            ),
        );
        if let Some(name) = self.turns.current_actor_name().map(str::to_string) {
            self.log
                .log(CombatLogEventType::Turn, format!("{}'s turn", name));
        }

        Ok(Applied::new(Outcome::Started { sequence }, Touched::session()))
    }

    fn advance(&mut self) -> Result<Applied, TrackerError> {
        let advance = self.turns.advance(&mut self.store)?;

        let mut touched = Touched::session();
        if let Some(report) = &advance.round {
            self.log.log_round(report, self.turns.current_round());
            touched = touched.merge(Touched::ALL);
        }

        match &advance.actor_name {
            Some(name) => self
                .log
                .log(CombatLogEventType::Turn, format!("{}'s turn", name)),
            None => self.log.log(
                CombatLogEventType::Turn,
                "Turn passes to a combatant no longer in the encounter".to_string(),
            ),
        }

        Ok(Applied::new(
            Outcome::Advanced {
                index: advance.index,
                actor_name: advance.actor_name,
                round: advance.round,
            },
            touched,
        ))
    }

    /// Restore the baseline roster and a fresh clock
    pub fn reset(&mut self) {
        self.store = self.baseline.clone();
        self.turns.reset();
        self.log.clear();
        self.log
            .log(CombatLogEventType::MatchEvent, "Encounter reset".to_string());
        info!("Encounter reset to {} combatants", self.store.len());
    }
}
