//! Entity store
//!
//! Owns the two collections (players, enemies) and every field mutation on
//! them. Health and mana saturate at their bounds; status durations are
//! additive and floored at zero. The single non-saturating rule is mana
//! spending: a debit larger than the current pool is refused outright.

use thiserror::Error;
use tracing::{debug, warn};

use super::components::{
    default_enemies, default_players, Combatant, Enemy, EntityKind, EntityRef, Player, Vitals,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no entity {0} in the roster")]
    EntityNotFound(EntityRef),

    #[error("no player with id {0}")]
    PlayerNotFound(u32),

    #[error("{name} has {available} mana, cannot spend {requested}")]
    InsufficientMana {
        name: String,
        available: i32,
        requested: i32,
    },
}

/// Borrowed view of either kind of entity
#[derive(Debug, Clone, Copy)]
pub enum EntityEntry<'a> {
    Player(&'a Player),
    Enemy(&'a Enemy),
}

impl<'a> EntityEntry<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            EntityEntry::Player(p) => &p.name,
            EntityEntry::Enemy(e) => &e.name,
        }
    }

    pub fn vitals(&self) -> &'a Vitals {
        match self {
            EntityEntry::Player(p) => &p.vitals,
            EntityEntry::Enemy(e) => &e.vitals,
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        match self {
            EntityEntry::Player(p) => p.entity_ref(),
            EntityEntry::Enemy(e) => e.entity_ref(),
        }
    }

    pub fn as_player(&self) -> Option<&'a Player> {
        match self {
            EntityEntry::Player(p) => Some(p),
            EntityEntry::Enemy(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStore {
    players: Vec<Player>,
    enemies: Vec<Enemy>,
    /// Next id to hand out per collection; never reused after removal
    next_player_id: u32,
    next_enemy_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::from_parts(default_players(), default_enemies(), 0, 0)
    }
}

impl EntityStore {
    /// Empty roster, ids starting at 1
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), 1, 1)
    }

    /// Build a store from loaded collections.
    ///
    /// Id counters are raised past the largest id present, so a stale or
    /// missing counter can never cause a collision.
    pub fn from_parts(
        mut players: Vec<Player>,
        mut enemies: Vec<Enemy>,
        next_player_id: u32,
        next_enemy_id: u32,
    ) -> Self {
        players.iter_mut().for_each(Player::normalize);
        enemies.iter_mut().for_each(|e| e.vitals.normalize());

        let max_player = players.iter().map(|p| p.id).max().unwrap_or(0);
        let max_enemy = enemies.iter().map(|e| e.id).max().unwrap_or(0);

        Self {
            players,
            enemies,
            next_player_id: next_player_id.max(max_player.saturating_add(1)),
            next_enemy_id: next_enemy_id.max(max_enemy.saturating_add(1)),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn next_id(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Player => self.next_player_id,
            EntityKind::Enemy => self.next_enemy_id,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len() + self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.enemies.is_empty()
    }

    /// Every entity, players first, in collection order
    pub fn roster(&self) -> Vec<EntityRef> {
        self.players
            .iter()
            .map(Combatant::entity_ref)
            .chain(self.enemies.iter().map(Combatant::entity_ref))
            .collect()
    }

    pub fn get(&self, target: EntityRef) -> Option<EntityEntry<'_>> {
        match target.kind {
            EntityKind::Player => self.player(target.id).map(EntityEntry::Player),
            EntityKind::Enemy => self.enemy(target.id).map(EntityEntry::Enemy),
        }
    }

    pub fn contains(&self, target: EntityRef) -> bool {
        self.get(target).is_some()
    }

    pub fn name_of(&self, target: EntityRef) -> Option<&str> {
        self.get(target).map(|entry| entry.name())
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    fn player_mut(&mut self, id: u32) -> Result<&mut Player, StoreError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlayerNotFound(id))
    }

    fn vitals_mut(&mut self, target: EntityRef) -> Result<&mut Vitals, StoreError> {
        let vitals = match target.kind {
            EntityKind::Player => self
                .players
                .iter_mut()
                .find(|p| p.id == target.id)
                .map(|p| &mut p.vitals),
            EntityKind::Enemy => self
                .enemies
                .iter_mut()
                .find(|e| e.id == target.id)
                .map(|e| &mut e.vitals),
        };
        vitals.ok_or(StoreError::EntityNotFound(target))
    }

    /// Mutable access to both collections for round processing
    pub(crate) fn collections_mut(&mut self) -> (&mut [Player], &mut [Enemy]) {
        (&mut self.players, &mut self.enemies)
    }

    // ------------------------------------------------------------------
    // Field updates
    // ------------------------------------------------------------------

    /// Change health by `delta`, saturating at `0..=max_hp`. Returns the new hp.
    pub fn adjust_hp(&mut self, target: EntityRef, delta: i32) -> Result<i32, StoreError> {
        let vitals = self.vitals_mut(target)?;
        vitals.hp = vitals.hp.saturating_add(delta).clamp(0, vitals.max_hp);
        debug!("{} hp {:+} -> {}", target, delta, vitals.hp);
        Ok(vitals.hp)
    }

    /// Change mana by `delta`. Returns the new mana.
    ///
    /// Gains saturate at `max_mana`. A debit that would go below zero is
    /// refused and leaves the pool untouched.
    pub fn adjust_mana(&mut self, player_id: u32, delta: i32) -> Result<i32, StoreError> {
        let player = self.player_mut(player_id)?;
        let raw = player.mana.saturating_add(delta);
        if raw < 0 {
            return Err(StoreError::InsufficientMana {
                name: player.name.clone(),
                available: player.mana,
                requested: delta.saturating_neg(),
            });
        }
        player.mana = raw.min(player.max_mana);
        debug!("p{} mana {:+} -> {}", player_id, delta, player.mana);
        Ok(player.mana)
    }

    pub fn adjust_stun(&mut self, target: EntityRef, delta: i32) -> Result<i32, StoreError> {
        let vitals = self.vitals_mut(target)?;
        vitals.stun_duration = vitals.stun_duration.saturating_add(delta).max(0);
        Ok(vitals.stun_duration)
    }

    pub fn adjust_summon(&mut self, player_id: u32, delta: i32) -> Result<i32, StoreError> {
        let player = self.player_mut(player_id)?;
        player.summon_duration = player.summon_duration.saturating_add(delta).max(0);
        Ok(player.summon_duration)
    }

    pub fn adjust_bleed(&mut self, target: EntityRef, delta: i32) -> Result<i32, StoreError> {
        let vitals = self.vitals_mut(target)?;
        vitals.bleed_damage = vitals.bleed_damage.saturating_add(delta).max(0);
        Ok(vitals.bleed_damage)
    }

    pub fn clear_bleed(&mut self, target: EntityRef) -> Result<(), StoreError> {
        self.vitals_mut(target)?.bleed_damage = 0;
        Ok(())
    }

    pub fn set_notes(&mut self, player_id: u32, notes: impl Into<String>) -> Result<(), StoreError> {
        self.player_mut(player_id)?.notes = notes.into();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roster changes
    // ------------------------------------------------------------------

    pub fn add_player(&mut self, name: impl Into<String>, max_hp: i32, max_mana: i32) -> EntityRef {
        let taken: Vec<u32> = self.players.iter().map(|p| p.id).collect();
        let id = allocate_id(&mut self.next_player_id, &taken);
        self.players.push(Player::new(id, name, max_hp, max_mana));
        EntityRef::player(id)
    }

    pub fn add_enemy(&mut self, name: impl Into<String>, max_hp: i32) -> EntityRef {
        let taken: Vec<u32> = self.enemies.iter().map(|e| e.id).collect();
        let id = allocate_id(&mut self.next_enemy_id, &taken);
        self.enemies.push(Enemy::new(id, name, max_hp));
        EntityRef::enemy(id)
    }

    /// Remove an entity, returning its name
    pub fn remove(&mut self, target: EntityRef) -> Result<String, StoreError> {
        let position = match target.kind {
            EntityKind::Player => self.players.iter().position(|p| p.id == target.id),
            EntityKind::Enemy => self.enemies.iter().position(|e| e.id == target.id),
        }
        .ok_or(StoreError::EntityNotFound(target))?;

        let name = match target.kind {
            EntityKind::Player => self.players.remove(position).name,
            EntityKind::Enemy => self.enemies.remove(position).name,
        };
        Ok(name)
    }
}

/// Hand out the counter's id and bump it. The counter saturates at
/// `u32::MAX`; once that id is taken, the lowest free id is used instead.
fn allocate_id(next: &mut u32, taken: &[u32]) -> u32 {
    let id = *next;
    if !taken.contains(&id) {
        *next = id.saturating_add(1);
        return id;
    }
    let free = (1..u32::MAX)
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(u32::MAX);
    warn!("Id counter exhausted, reusing free id {}", free);
    free
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counters_follow_default_roster() {
        let store = EntityStore::default();
        assert_eq!(store.next_id(EntityKind::Player), 6);
        assert_eq!(store.next_id(EntityKind::Enemy), 5);
    }

    #[test]
    fn test_exhausted_counter_does_not_overflow() {
        let mut store =
            EntityStore::from_parts(vec![Player::new(u32::MAX, "Last", 10, 10)], vec![], 0, 0);
        assert_eq!(store.next_id(EntityKind::Player), u32::MAX);

        let first = store.add_player("A", 10, 10);
        let second = store.add_player("B", 10, 10);

        assert_eq!(first, EntityRef::player(1));
        assert_eq!(second, EntityRef::player(2));
        assert_eq!(store.players().len(), 3);
    }

    #[test]
    fn test_from_parts_raises_stale_counter() {
        let store = EntityStore::from_parts(vec![Player::new(9, "A", 10, 10)], vec![], 2, 0);
        assert_eq!(store.next_id(EntityKind::Player), 10);
        assert_eq!(store.next_id(EntityKind::Enemy), 1);
    }
}
