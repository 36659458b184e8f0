//! Presentation snapshot
//!
//! Everything a front end needs to draw the tracker: card lists (in roster
//! order, and in turn order once a game runs), the turn wheel, the round
//! number and whose turn it is. Built fresh from an [`Encounter`] after each
//! change. `Display` gives the plain-text rendering the CLI prints.

use smallvec::SmallVec;
use std::fmt;

use crate::combat::{EntityKind, EntityRef, EntityStore, TurnEngine};
use crate::encounter::Encounter;

/// A status marker shown on a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    /// Rounds of stun left
    Stunned(i32),
    /// Rounds of summon left
    Summoning(i32),
    /// Damage per round
    Bleeding(i32),
}

impl fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusBadge::Stunned(rounds) => write!(f, "stunned {}", rounds),
            StatusBadge::Summoning(rounds) => write!(f, "summon {}", rounds),
            StatusBadge::Bleeding(damage) => write!(f, "bleed {}", damage),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub entity: EntityRef,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub hp_percent: f32,
    /// `(mana, max_mana)` for players
    pub mana: Option<(i32, i32)>,
    pub badges: SmallVec<[StatusBadge; 3]>,
    pub notes: Option<String>,
    /// Holds the current turn
    pub is_active: bool,
    pub is_defeated: bool,
}

impl CardView {
    fn build(store: &EntityStore, turns: &TurnEngine, entity: EntityRef) -> Option<Self> {
        let entry = store.get(entity)?;
        let vitals = entry.vitals();

        let mut badges = SmallVec::new();
        if vitals.stun_duration > 0 {
            badges.push(StatusBadge::Stunned(vitals.stun_duration));
        }
        let player = entry.as_player();
        if let Some(p) = player.filter(|p| p.summon_duration > 0) {
            badges.push(StatusBadge::Summoning(p.summon_duration));
        }
        if vitals.bleed_damage > 0 {
            badges.push(StatusBadge::Bleeding(vitals.bleed_damage));
        }

        Some(Self {
            entity,
            name: entry.name().to_string(),
            hp: vitals.hp,
            max_hp: vitals.max_hp,
            hp_percent: vitals.hp_percent(),
            mana: player.map(|p| (p.mana, p.max_mana)),
            badges,
            notes: player
                .map(|p| p.notes.clone())
                .filter(|notes| !notes.is_empty()),
            is_active: turns.is_active(entity),
            is_defeated: vitals.is_defeated(),
        })
    }
}

/// One slot of the turn wheel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnWheelSlot {
    pub entity: EntityRef,
    /// None when the entity has been removed since the order was built
    pub name: Option<String>,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncounterView {
    pub round: u32,
    pub game_started: bool,
    pub current_actor: Option<String>,
    pub players: Vec<CardView>,
    pub enemies: Vec<CardView>,
    /// Players in turn order, stale slots dropped (empty before the game starts)
    pub ordered_players: Vec<CardView>,
    pub ordered_enemies: Vec<CardView>,
    pub turn_wheel: Vec<TurnWheelSlot>,
    /// Working copy while a manual order is being arranged
    pub working_order: Vec<TurnWheelSlot>,
}

impl EncounterView {
    pub fn build(encounter: &Encounter) -> Self {
        let store = encounter.store();
        let turns = encounter.turns();

        let cards = |refs: &mut dyn Iterator<Item = EntityRef>| -> Vec<CardView> {
            refs.filter_map(|entity| CardView::build(store, turns, entity))
                .collect()
        };

        let roster = store.roster();
        let players = cards(&mut roster.iter().copied().filter(EntityRef::is_player));
        let enemies = cards(&mut roster.iter().copied().filter(|r| !r.is_player()));

        let sequence = turns.sequence().unwrap_or_default();
        let ordered_players = cards(&mut sequence.iter().copied().filter(EntityRef::is_player));
        let ordered_enemies = cards(&mut sequence.iter().copied().filter(|r| !r.is_player()));

        let current = turns.current_entity();
        let turn_wheel = sequence
            .iter()
            .enumerate()
            .map(|(index, entity)| TurnWheelSlot {
                entity: *entity,
                name: store.name_of(*entity).map(str::to_string),
                is_current: current.is_some() && index == turns.current_turn_index(),
            })
            .collect();

        let working_order = turns
            .working_order()
            .unwrap_or_default()
            .iter()
            .map(|entity| TurnWheelSlot {
                entity: *entity,
                name: store.name_of(*entity).map(str::to_string),
                is_current: false,
            })
            .collect();

        Self {
            round: turns.current_round(),
            game_started: turns.game_started(),
            current_actor: current
                .and_then(|entity| store.name_of(entity))
                .map(str::to_string),
            players,
            enemies,
            ordered_players,
            ordered_enemies,
            turn_wheel,
            working_order,
        }
    }
}

fn write_card(f: &mut fmt::Formatter<'_>, card: &CardView) -> fmt::Result {
    let marker = if card.is_active { '>' } else { ' ' };
    write!(
        f,
        "{} [{}] {:<14} HP {:>4}/{:<4}",
        marker, card.entity, card.name, card.hp, card.max_hp
    )?;
    if let Some((mana, max_mana)) = card.mana {
        write!(f, " MP {:>4}/{:<4}", mana, max_mana)?;
    }
    if card.is_defeated {
        write!(f, " (defeated)")?;
    }
    for badge in &card.badges {
        write!(f, " [{}]", badge)?;
    }
    if let Some(notes) = &card.notes {
        write!(f, " - {}", notes)?;
    }
    writeln!(f)
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[TurnWheelSlot]) -> fmt::Result {
    let names: Vec<String> = slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let name = slot.name.as_deref().unwrap_or("(gone)");
            let kind = match slot.entity.kind {
                EntityKind::Player => "",
                EntityKind::Enemy => "*",
            };
            if slot.is_current {
                format!("{}:[{}{}]", index, name, kind)
            } else {
                format!("{}:{}{}", index, name, kind)
            }
        })
        .collect();
    writeln!(f, "{}", names.join(" -> "))
}

impl fmt::Display for EncounterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round {}", self.round)?;
        match (self.game_started, &self.current_actor) {
            (true, Some(actor)) => writeln!(f, " - {}'s turn", actor)?,
            (true, None) => writeln!(f, " - turn of a removed combatant")?,
            (false, _) => writeln!(f, " - not started")?,
        }

        if !self.turn_wheel.is_empty() {
            write!(f, "Order: ")?;
            write_slots(f, &self.turn_wheel)?;
        }
        if !self.working_order.is_empty() {
            write!(f, "Arranging: ")?;
            write_slots(f, &self.working_order)?;
        }

        let (players, enemies) = if self.game_started {
            (&self.ordered_players, &self.ordered_enemies)
        } else {
            (&self.players, &self.enemies)
        };

        writeln!(f, "Enemies:")?;
        for card in enemies {
            write_card(f, card)?;
        }
        writeln!(f, "Players:")?;
        for card in players {
            write_card(f, card)?;
        }
        Ok(())
    }
}
