//! Tests for the presentation snapshot
//!
//! These tests verify that:
//! - Card lists follow roster order before the game and turn order after
//! - Exactly the current actor's card is marked active
//! - Removed entities vanish from the cards but not from the turn wheel
//! - Status badges and the plain-text rendering reflect the store

use regex::Regex;

use rpgtracker::combat::{EntityRef, EntityStore, GameRng};
use rpgtracker::view::{EncounterView, StatusBadge};
use rpgtracker::{Encounter, Intent};

fn three_player_encounter() -> Encounter {
    let mut store = EntityStore::empty();
    store.add_player("A", 10, 10);
    store.add_player("B", 10, 10);
    store.add_player("C", 10, 10);
    store.add_enemy("Ogre", 30);
    Encounter::new(store).with_rng(GameRng::from_seed(11))
}

fn names(cards: &[rpgtracker::view::CardView]) -> Vec<&str> {
    cards.iter().map(|c| c.name.as_str()).collect()
}

// =============================================================================
// Card lists
// =============================================================================

#[test]
fn test_not_started_view_uses_roster_order() {
    let encounter = Encounter::default();
    let view = EncounterView::build(&encounter);

    assert_eq!(view.round, 1);
    assert!(!view.game_started);
    assert_eq!(view.current_actor, None);
    assert_eq!(names(&view.players), vec!["Guerrier", "Mage", "Prêtre", "Voleur", "Druide"]);
    assert_eq!(view.enemies.len(), 4);
    assert!(view.turn_wheel.is_empty());
    assert!(view.players.iter().chain(&view.enemies).all(|c| !c.is_active));

    let text = view.to_string();
    assert!(text.starts_with("Round 1 - not started"));
}

#[test]
fn test_started_view_uses_turn_order() {
    let mut encounter = three_player_encounter();
    encounter.apply(Intent::BeginOrdering).unwrap();
    encounter.apply(Intent::Reorder { from: 2, to: 0 }).unwrap();
    encounter.apply(Intent::Start { manual: true }).unwrap();

    let view = EncounterView::build(&encounter);

    assert_eq!(names(&view.ordered_players), vec!["C", "A", "B"]);
    assert_eq!(names(&view.ordered_enemies), vec!["Ogre"]);
    assert_eq!(view.current_actor.as_deref(), Some("C"));

    let active: Vec<_> = view
        .ordered_players
        .iter()
        .chain(&view.ordered_enemies)
        .filter(|c| c.is_active)
        .map(|c| c.entity)
        .collect();
    assert_eq!(active, vec![EntityRef::player(3)], "Exactly one active card");
}

#[test]
fn test_working_order_shown_while_arranging() {
    let mut encounter = three_player_encounter();
    encounter.apply(Intent::BeginOrdering).unwrap();
    encounter.apply(Intent::Reorder { from: 3, to: 1 }).unwrap();

    let view = EncounterView::build(&encounter);
    let order: Vec<_> = view.working_order.iter().filter_map(|s| s.name.as_deref()).collect();

    assert_eq!(order, vec!["A", "Ogre", "B", "C"]);
    assert!(view.to_string().contains("Arranging: 0:A -> 1:Ogre* -> 2:B -> 3:C"));
}

// =============================================================================
// Stale slots
// =============================================================================

#[test]
fn test_removed_entity_leaves_a_gone_slot() {
    let mut encounter = three_player_encounter();
    encounter.apply(Intent::Start { manual: true }).unwrap();
    encounter.apply(Intent::Remove { target: EntityRef::player(2) }).unwrap();

    let view = EncounterView::build(&encounter);

    assert_eq!(view.turn_wheel.len(), 4, "Slots are never dropped from the wheel");
    assert_eq!(view.turn_wheel[1].name, None);
    assert_eq!(names(&view.ordered_players), vec!["A", "C"]);
    assert!(view.to_string().contains("1:(gone)"));
}

#[test]
fn test_stale_current_slot_has_no_active_card() {
    let mut encounter = three_player_encounter();
    encounter.apply(Intent::Start { manual: true }).unwrap();
    encounter.apply(Intent::Advance).unwrap();
    encounter.apply(Intent::Remove { target: EntityRef::player(2) }).unwrap();

    let view = EncounterView::build(&encounter);

    assert_eq!(view.current_actor, None);
    assert!(view.ordered_players.iter().all(|c| !c.is_active));
    assert!(view.to_string().starts_with("Round 1 - turn of a removed combatant"));
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_badges_follow_status() {
    let mut encounter = Encounter::default();
    encounter.apply(Intent::Stun { target: EntityRef::enemy(2), rounds: 2 }).unwrap();
    encounter.apply(Intent::Bleed { target: EntityRef::enemy(2), damage: 3 }).unwrap();
    encounter.apply(Intent::Summon { player: 2, rounds: 4 }).unwrap();

    let view = EncounterView::build(&encounter);
    let goblin = view.enemies.iter().find(|c| c.name == "Gobelin").unwrap();
    let mage = view.players.iter().find(|c| c.name == "Mage").unwrap();

    assert_eq!(goblin.badges.as_slice(), &[StatusBadge::Stunned(2), StatusBadge::Bleeding(3)]);
    assert_eq!(goblin.mana, None);
    assert_eq!(mage.badges.as_slice(), &[StatusBadge::Summoning(4)]);
    assert_eq!(mage.mana, Some((100, 100)));
}

#[test]
fn test_text_marks_active_card_and_defeated() {
    let mut encounter = three_player_encounter();
    encounter.apply(Intent::Damage { target: EntityRef::enemy(1), amount: 99 }).unwrap();
    encounter.apply(Intent::Note { player: 1, text: "Has the key".to_string() }).unwrap();
    encounter.apply(Intent::Start { manual: true }).unwrap();

    let text = EncounterView::build(&encounter).to_string();

    let active = Regex::new(r"(?m)^> \[p1\] A\s+HP\s+10/10\s+MP\s+10/10\s+- Has the key$").unwrap();
    assert!(active.is_match(&text), "active card not marked:\n{}", text);

    let defeated = Regex::new(r"(?m)^  \[e1\] Ogre\s+HP\s+0/30\s+\(defeated\)$").unwrap();
    assert!(defeated.is_match(&text), "defeated card not marked:\n{}", text);

    let order = Regex::new(r"Order: 0:\[A\] -> 1:B -> 2:C -> 3:Ogre\*").unwrap();
    assert!(order.is_match(&text), "turn wheel missing:\n{}", text);
}
