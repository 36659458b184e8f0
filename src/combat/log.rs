//! Combat logging
//!
//! Records everything that happened during an encounter for display and
//! post-game review. This is the player-facing history; diagnostics go
//! through `tracing`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::components::EntityRef;
use super::systems::RoundReport;

/// A single entry in the combat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Round in which the event happened
    pub round: u32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Entity the event is about, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<EntityRef>,
    /// Signed amount (hp, mana, rounds) where meaningful
    #[serde(default)]
    pub amount: i32,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatLogEventType {
    /// Damage dealt (manual or bleed)
    Damage,
    /// Healing done
    Healing,
    /// Mana spent or restored
    Mana,
    /// Stun, summon or bleed applied
    StatusApplied,
    /// Stun or summon ran out, or bleed was cleared
    StatusRemoved,
    /// Entity reached 0 hp
    Death,
    /// Entity added to or removed from the roster
    Roster,
    /// Turn passed to the next actor
    Turn,
    /// Game and round events (start, new round, reset)
    MatchEvent,
    /// Action refused
    Rejected,
}

/// The combat log storing all events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current round
    pub round: u32,
}

impl CombatLog {
    pub fn new(round: u32) -> Self {
        Self {
            entries: Vec::new(),
            round,
        }
    }

    /// Clear the log for a new game
    pub fn clear(&mut self) {
        self.entries.clear();
        self.round = 1;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, None, 0, message);
    }

    /// Add an entry about a specific entity
    pub fn log_for(
        &mut self,
        event_type: CombatLogEventType,
        subject: EntityRef,
        amount: i32,
        message: String,
    ) {
        self.push(event_type, Some(subject), amount, message);
    }

    fn push(
        &mut self,
        event_type: CombatLogEventType,
        subject: Option<EntityRef>,
        amount: i32,
        message: String,
    ) {
        self.entries.push(CombatLogEntry {
            round: self.round,
            event_type,
            subject,
            amount,
            message,
        });
    }

    /// Record a round boundary: bleed ticks, expirations, deaths, then the
    /// new round marker.
    pub fn log_round(&mut self, report: &RoundReport, new_round: u32) {
        for effect in &report.effects {
            if effect.bleed_taken > 0 {
                self.log_for(
                    CombatLogEventType::Damage,
                    effect.entity,
                    effect.bleed_taken,
                    format!("{} bleeds for {}", effect.name, effect.bleed_taken),
                );
            }
            if effect.stun_expired {
                self.log_for(
                    CombatLogEventType::StatusRemoved,
                    effect.entity,
                    0,
                    format!("{} is no longer stunned", effect.name),
                );
            }
            if effect.summon_expired {
                self.log_for(
                    CombatLogEventType::StatusRemoved,
                    effect.entity,
                    0,
                    format!("{}'s summon fades", effect.name),
                );
            }
            if effect.defeated {
                self.log_for(
                    CombatLogEventType::Death,
                    effect.entity,
                    0,
                    format!("{} has bled out", effect.name),
                );
            }
        }

        self.round = new_round;
        self.log(
            CombatLogEventType::MatchEvent,
            format!("Round {} begins", new_round),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Total damage taken per entity
    pub fn damage_taken(&self) -> HashMap<EntityRef, i32> {
        let mut totals = HashMap::new();
        for entry in self.filter_by_type(CombatLogEventType::Damage) {
            if let Some(subject) = entry.subject {
                *totals.entry(subject).or_insert(0) += entry.amount;
            }
        }
        totals
    }

    /// Entries logged during `round`
    pub fn in_round(&self, round: u32) -> Vec<&CombatLogEntry> {
        self.entries.iter().filter(|e| e.round == round).collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Write the log as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }
}
