//! Unit tests for combat log queries
//!
//! These tests verify that the CombatLog correctly:
//! - Filters entries by event type and by round
//! - Totals damage per entity, bleed included
//! - Records round boundaries in order
//! - Writes itself out as JSON

use rpgtracker::combat::log::{CombatLog, CombatLogEventType};
use rpgtracker::combat::{EntityRef, RoundEffect, RoundReport};
use tempfile::TempDir;

fn create_test_log() -> CombatLog {
    CombatLog::new(1)
}

fn bleed_effect(entity: EntityRef, name: &str, taken: i32, defeated: bool) -> RoundEffect {
    RoundEffect {
        entity,
        name: name.to_string(),
        bleed_taken: taken,
        stun_expired: false,
        summon_expired: false,
        defeated,
    }
}

// =============================================================================
// Damage Aggregation Tests
// =============================================================================

#[test]
fn test_damage_taken_empty_log() {
    let log = create_test_log();
    assert!(log.damage_taken().is_empty(), "Empty log should return empty damage map");
}

#[test]
fn test_damage_taken_includes_bleed() {
    let mut log = create_test_log();
    let troll = EntityRef::enemy(3);
    let mage = EntityRef::player(2);

    log.log_for(CombatLogEventType::Damage, troll, 20, "Troll takes 20".to_string());
    log.log_for(CombatLogEventType::Healing, troll, 5, "Troll heals 5".to_string());
    log.log_for(CombatLogEventType::Damage, mage, 7, "Mage takes 7".to_string());
    log.log_round(
        &RoundReport {
            ended_round: 1,
            effects: vec![bleed_effect(troll, "Troll", 4, false)],
        },
        2,
    );

    let damage = log.damage_taken();
    assert_eq!(damage.get(&troll), Some(&24), "Healing must not offset damage taken");
    assert_eq!(damage.get(&mage), Some(&7));
    assert_eq!(damage.get(&EntityRef::player(3)), None);
}

// =============================================================================
// Round Tests
// =============================================================================

#[test]
fn test_log_round_orders_effects_then_marker() {
    let mut log = create_test_log();
    let goblin = EntityRef::enemy(2);

    log.log_round(
        &RoundReport {
            ended_round: 1,
            effects: vec![
                bleed_effect(goblin, "Gobelin", 3, true),
                RoundEffect {
                    entity: EntityRef::player(5),
                    name: "Druide".to_string(),
                    bleed_taken: 0,
                    stun_expired: true,
                    summon_expired: true,
                    defeated: false,
                },
            ],
        },
        2,
    );

    let types: Vec<_> = log.entries.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            CombatLogEventType::Damage,
            CombatLogEventType::Death,
            CombatLogEventType::StatusRemoved,
            CombatLogEventType::StatusRemoved,
            CombatLogEventType::MatchEvent,
        ]
    );
    assert_eq!(log.entries.last().unwrap().message, "Round 2 begins");
    assert_eq!(log.entries.last().unwrap().round, 2);
    assert_eq!(log.entries[0].round, 1, "Bleed belongs to the round that ended");
}

#[test]
fn test_in_round() {
    let mut log = create_test_log();

    log.log(CombatLogEventType::MatchEvent, "Game started".to_string());
    log.log_round(&RoundReport::default(), 2);
    log.log(CombatLogEventType::Turn, "A's turn".to_string());
    log.log(CombatLogEventType::Turn, "B's turn".to_string());

    assert_eq!(log.in_round(1).len(), 1);
    assert_eq!(log.in_round(2).len(), 3);
    assert!(log.in_round(3).is_empty());
}

#[test]
fn test_clear_resets_round() {
    let mut log = create_test_log();
    log.log_round(&RoundReport::default(), 5);

    log.clear();

    assert!(log.entries.is_empty());
    assert_eq!(log.round, 1);
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_filter_by_type() {
    let mut log = create_test_log();
    let dragon = EntityRef::enemy(1);

    log.log(CombatLogEventType::MatchEvent, "Game started".to_string());
    log.log_for(CombatLogEventType::Damage, dragon, 50, "Dragon takes 50".to_string());
    log.log_for(CombatLogEventType::Healing, dragon, 30, "Dragon heals 30".to_string());

    assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::Healing).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::MatchEvent).len(), 1);
    assert!(log.filter_by_type(CombatLogEventType::Rejected).is_empty());
}

#[test]
fn test_hp_changes_only() {
    let mut log = create_test_log();
    let dragon = EntityRef::enemy(1);

    log.log(CombatLogEventType::MatchEvent, "Game started".to_string());
    log.log_for(CombatLogEventType::Damage, dragon, 50, "Dragon takes 50".to_string());
    log.log_for(CombatLogEventType::Healing, dragon, 30, "Dragon heals 30".to_string());
    log.log_for(CombatLogEventType::StatusApplied, dragon, 2, "Dragon is stunned".to_string());

    let hp_changes = log.hp_changes_only();
    assert_eq!(hp_changes.len(), 2, "Should only include damage and healing events");
}

#[test]
fn test_recent_entries() {
    let mut log = create_test_log();

    for i in 0..10 {
        log.log(CombatLogEventType::Turn, format!("Event {}", i));
    }

    let recent = log.recent(3);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].message, "Event 7");
    assert_eq!(recent[1].message, "Event 8");
    assert_eq!(recent[2].message, "Event 9");
}

// =============================================================================
// Output Tests
// =============================================================================

#[test]
fn test_save_to_file_writes_json() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("logs").join("combat.json");
    let mut log = create_test_log();
    log.log_for(
        CombatLogEventType::Damage,
        EntityRef::player(1),
        12,
        "Guerrier takes 12".to_string(),
    );

    log.save_to_file(&path).unwrap();

    let saved: CombatLog = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved.entries, log.entries);
}
