//! Round advancement
//!
//! End-of-round processing applied to every entity in the store, whether or
//! not it appears in the turn order: bleed damage, then stun and summon decay.
//! Bleed itself never decays; it stays until the user clears it.

use tracing::debug;

use super::components::{Combatant, EntityRef, Vitals};
use super::store::EntityStore;

/// What a single entity went through at a round boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEffect {
    pub entity: EntityRef,
    pub name: String,
    /// Health actually lost to bleeding (after clamping at 0)
    pub bleed_taken: i32,
    pub stun_expired: bool,
    pub summon_expired: bool,
    /// Health reached 0 during this round boundary
    pub defeated: bool,
}

impl RoundEffect {
    fn is_noteworthy(&self) -> bool {
        self.bleed_taken > 0 || self.stun_expired || self.summon_expired || self.defeated
    }
}

/// Summary of one round boundary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundReport {
    /// The round that just ended
    pub ended_round: u32,
    /// Only entities something happened to
    pub effects: Vec<RoundEffect>,
}

impl RoundReport {
    pub fn total_bleed(&self) -> i32 {
        self.effects.iter().map(|e| e.bleed_taken).sum()
    }

    pub fn defeated(&self) -> impl Iterator<Item = &RoundEffect> {
        self.effects.iter().filter(|e| e.defeated)
    }
}

/// Apply bleed and stun decay to one set of vitals.
///
/// Returns `(bleed_taken, stun_expired, defeated)`.
pub fn tick_vitals(vitals: &mut Vitals) -> (i32, bool, bool) {
    let hp_before = vitals.hp;
    vitals.hp = (vitals.hp - vitals.bleed_damage).max(0);
    let bleed_taken = hp_before - vitals.hp;

    let stun_expired = vitals.stun_duration == 1;
    vitals.stun_duration = (vitals.stun_duration - 1).max(0);

    let defeated = hp_before > 0 && vitals.hp == 0;
    (bleed_taken, stun_expired, defeated)
}

/// Decrement a round-based duration, floored at zero. Returns true when it
/// just ran out.
pub fn tick_duration(duration: &mut i32) -> bool {
    let expired = *duration == 1;
    *duration = (*duration - 1).max(0);
    expired
}

/// Run end-of-round effects over the whole store
pub fn advance_round(store: &mut EntityStore, ended_round: u32) -> RoundReport {
    let mut report = RoundReport {
        ended_round,
        effects: Vec::new(),
    };

    let (players, enemies) = store.collections_mut();

    for player in players.iter_mut() {
        let (bleed_taken, stun_expired, defeated) = tick_vitals(&mut player.vitals);
        let summon_expired = tick_duration(&mut player.summon_duration);
        let effect = RoundEffect {
            entity: player.entity_ref(),
            name: player.name.clone(),
            bleed_taken,
            stun_expired,
            summon_expired,
            defeated,
        };
        if effect.is_noteworthy() {
            report.effects.push(effect);
        }
    }

    for enemy in enemies.iter_mut() {
        let (bleed_taken, stun_expired, defeated) = tick_vitals(&mut enemy.vitals);
        let effect = RoundEffect {
            entity: enemy.entity_ref(),
            name: enemy.name.clone(),
            bleed_taken,
            stun_expired,
            summon_expired: false,
            defeated,
        };
        if effect.is_noteworthy() {
            report.effects.push(effect);
        }
    }

    debug!(
        "Round {} ended: {} entities affected, {} bleed damage",
        ended_round,
        report.effects.len(),
        report.total_bleed()
    );
    report
}
