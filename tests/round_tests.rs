//! Tests for round advancement
//!
//! These tests verify that at each round boundary:
//! - Bleed damage is applied and clamped at 0, and never decays on its own
//! - Stun and summon durations count down to 0 and stay there
//! - Every entity in the store is processed, in the turn order or not

use rpgtracker::combat::{
    advance_round, EntityRef, EntityStore, GameRng, TurnEngine,
};

fn single_enemy_store(max_hp: i32) -> (EntityStore, EntityRef) {
    let mut store = EntityStore::empty();
    let enemy = store.add_enemy("Target", max_hp);
    (store, enemy)
}

// =============================================================================
// Bleed
// =============================================================================

#[test]
fn test_bleed_ticks_until_zero() {
    let (mut store, enemy) = single_enemy_store(20);
    store.adjust_hp(enemy, -8).unwrap();
    store.adjust_bleed(enemy, 5).unwrap();

    let mut hp_after = Vec::new();
    for round in 1..=3 {
        advance_round(&mut store, round);
        hp_after.push(store.enemy(enemy.id).unwrap().vitals.hp);
    }

    assert_eq!(hp_after, vec![7, 2, 0], "Bleed should clamp at 0");
    assert_eq!(
        store.enemy(enemy.id).unwrap().vitals.bleed_damage,
        5,
        "Bleed stays until cleared"
    );
}

#[test]
fn test_bleed_report_counts_actual_damage() {
    let (mut store, enemy) = single_enemy_store(20);
    store.adjust_hp(enemy, -17).unwrap();
    store.adjust_bleed(enemy, 5).unwrap();

    let report = advance_round(&mut store, 4);

    assert_eq!(report.ended_round, 4);
    assert_eq!(report.total_bleed(), 3, "Only the remaining 3 hp can be lost");
    let defeated: Vec<_> = report.defeated().map(|e| e.entity).collect();
    assert_eq!(defeated, vec![enemy]);

    let again = advance_round(&mut store, 5);
    assert_eq!(again.defeated().count(), 0, "Already defeated entities are not reported twice");
}

#[test]
fn test_cleared_bleed_stops_damage() {
    let (mut store, enemy) = single_enemy_store(30);
    store.adjust_bleed(enemy, 4).unwrap();
    advance_round(&mut store, 1);
    store.clear_bleed(enemy).unwrap();
    advance_round(&mut store, 2);

    assert_eq!(store.enemy(enemy.id).unwrap().vitals.hp, 26);
}

// =============================================================================
// Durations
// =============================================================================

#[test]
fn test_stun_decays_and_stays_at_zero() {
    let (mut store, enemy) = single_enemy_store(30);
    store.adjust_stun(enemy, 1).unwrap();

    let first = advance_round(&mut store, 1);
    assert_eq!(store.enemy(enemy.id).unwrap().vitals.stun_duration, 0);
    assert!(first.effects.iter().any(|e| e.entity == enemy && e.stun_expired));

    let second = advance_round(&mut store, 2);
    assert_eq!(store.enemy(enemy.id).unwrap().vitals.stun_duration, 0);
    assert!(second.effects.is_empty(), "Nothing left to report");
}

#[test]
fn test_summon_decays_for_players() {
    let mut store = EntityStore::default();
    store.adjust_summon(2, 2).unwrap();

    advance_round(&mut store, 1);
    assert_eq!(store.player(2).unwrap().summon_duration, 1);

    let report = advance_round(&mut store, 2);
    assert_eq!(store.player(2).unwrap().summon_duration, 0);
    let effect = report
        .effects
        .iter()
        .find(|e| e.entity == EntityRef::player(2))
        .expect("summon expiry should be reported");
    assert!(effect.summon_expired);
    assert!(!effect.stun_expired);
}

#[test]
fn test_quiet_round_reports_nothing() {
    let mut store = EntityStore::default();
    let before = store.clone();

    let report = advance_round(&mut store, 1);

    assert!(report.effects.is_empty());
    assert_eq!(store.players(), before.players());
    assert_eq!(store.enemies(), before.enemies());
}

// =============================================================================
// Integration with the turn engine
// =============================================================================

#[test]
fn test_round_effects_apply_to_entities_outside_the_order() {
    let mut store = EntityStore::empty();
    store.add_player("A", 10, 10);
    store.add_player("B", 10, 10);
    let mut engine = TurnEngine::default();
    engine.start(&store, true, &mut GameRng::from_seed(0)).unwrap();

    let late = store.add_enemy("Late", 40);
    store.adjust_bleed(late, 3).unwrap();
    store.adjust_stun(late, 2).unwrap();

    engine.advance(&mut store).unwrap();
    let wrap = engine.advance(&mut store).unwrap();

    assert!(wrap.round.is_some());
    let vitals = &store.enemy(late.id).unwrap().vitals;
    assert_eq!(vitals.hp, 37);
    assert_eq!(vitals.stun_duration, 1);
}

#[test]
fn test_round_effects_only_at_wrap() {
    let mut store = EntityStore::empty();
    let a = store.add_player("A", 10, 10);
    store.add_player("B", 10, 10);
    store.add_player("C", 10, 10);
    store.adjust_bleed(a, 1).unwrap();

    let mut engine = TurnEngine::default();
    engine.start(&store, true, &mut GameRng::from_seed(0)).unwrap();

    engine.advance(&mut store).unwrap();
    engine.advance(&mut store).unwrap();
    assert_eq!(store.player(a.id).unwrap().vitals.hp, 10, "No tick mid-round");

    let wrap = engine.advance(&mut store).unwrap();
    assert_eq!(store.player(a.id).unwrap().vitals.hp, 9);
    assert_eq!(wrap.round.map(|r| r.ended_round), Some(1));
    assert_eq!(engine.current_round(), 2);
}
