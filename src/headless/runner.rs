//! Scripted encounter execution
//!
//! Replays a script's intents against a fresh encounter, without any
//! interactive output, and reports the final state.

use std::path::Path;
use tracing::info;

use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::{Combatant, EntityRef, GameRng, Intent};
use crate::encounter::Encounter;

use super::config::ScriptConfig;

/// Result of a completed scripted encounter
#[derive(Debug, Clone)]
pub struct EncounterResult {
    /// Round the encounter ended in
    pub final_round: u32,
    /// Whether a game was running when the script ended
    pub game_started: bool,
    pub players: Vec<CombatantResult>,
    pub enemies: Vec<CombatantResult>,
    /// Intents refused by card rules or insufficient mana
    pub rejected: usize,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    pub log: CombatLog,
}

impl EncounterResult {
    /// All enemies are at 0 hp (and there was at least one)
    pub fn enemies_defeated(&self) -> bool {
        !self.enemies.is_empty() && self.enemies.iter().all(|e| !e.survived)
    }
}

/// Final state of one combatant
#[derive(Debug, Clone)]
pub struct CombatantResult {
    pub entity: EntityRef,
    pub name: String,
    pub max_health: i32,
    /// Health remaining at the end (0 if defeated)
    pub final_health: i32,
    pub survived: bool,
    /// Total damage taken during the encounter, bleed included
    pub damage_taken: i32,
}

/// Build the encounter a script describes, with its manual order applied
pub fn prepare_encounter(config: &ScriptConfig) -> Result<Encounter, String> {
    let store = config.build_store();
    let mut encounter = Encounter::new(store)
        .with_rules(config.gate_rules())
        .with_rng(GameRng::from_optional_seed(config.random_seed));

    if config.manual_order.is_empty() {
        return Ok(encounter);
    }

    let order = config.resolve_manual_order(encounter.store())?;
    apply_all(&mut encounter, [Intent::BeginOrdering])?;
    for (position, entity) in order.iter().enumerate() {
        let from = encounter
            .turns()
            .working_order()
            .and_then(|working| working.iter().position(|r| r == entity))
            .ok_or_else(|| format!("{} missing from the working order", entity))?;
        apply_all(&mut encounter, [Intent::Reorder { from, to: position }])?;
    }
    apply_all(&mut encounter, [Intent::Start { manual: true }])?;
    Ok(encounter)
}

fn apply_all(
    encounter: &mut Encounter,
    intents: impl IntoIterator<Item = Intent>,
) -> Result<usize, String> {
    let mut rejected = 0;
    for (index, intent) in intents.into_iter().enumerate() {
        let label = intent.label();
        let applied = encounter
            .apply(intent)
            .map_err(|e| format!("Action {} ({}) failed: {}", index + 1, label, e))?;
        if applied.outcome.is_rejected() {
            rejected += 1;
        }
    }
    Ok(rejected)
}

/// Run a script to completion
pub fn run_script(config: &ScriptConfig) -> Result<EncounterResult, String> {
    let mut encounter = prepare_encounter(config)?;

    match config.random_seed {
        Some(seed) => info!("Using deterministic RNG with seed: {}", seed),
        None => info!("Using non-deterministic RNG (no seed provided)"),
    }

    let rejected = apply_all(&mut encounter, config.actions.iter().cloned())?;
    let result = build_result(&encounter, rejected, config.random_seed);

    if let Some(path) = &config.output_path {
        result.log.save_to_file(Path::new(path))?;
        println!("Combat log saved to: {}", path);
    }
    Ok(result)
}

fn build_result(encounter: &Encounter, rejected: usize, random_seed: Option<u64>) -> EncounterResult {
    let store = encounter.store();
    let damage = encounter.log().damage_taken();

    let summarize = |c: &dyn Combatant| CombatantResult {
        entity: c.entity_ref(),
        name: c.name().to_string(),
        max_health: c.vitals().max_hp,
        final_health: c.vitals().hp,
        survived: !c.vitals().is_defeated(),
        damage_taken: damage.get(&c.entity_ref()).copied().unwrap_or(0),
    };

    EncounterResult {
        final_round: encounter.current_round(),
        game_started: encounter.game_started(),
        players: store.players().iter().map(|p| summarize(p)).collect(),
        enemies: store.enemies().iter().map(|e| summarize(e)).collect(),
        rejected,
        random_seed,
        log: encounter.log().clone(),
    }
}

/// Print a short human-readable summary
pub fn print_summary(result: &EncounterResult) {
    println!(
        "Encounter finished in round {} ({})",
        result.final_round,
        if result.game_started { "in progress" } else { "not started" }
    );
    for (heading, combatants) in [("Enemies", &result.enemies), ("Players", &result.players)] {
        println!("  {}:", heading);
        for c in combatants {
            println!(
                "    {:<14} {:>4}/{:<4} damage taken {:>4}{}",
                c.name,
                c.final_health,
                c.max_health,
                c.damage_taken,
                if c.survived { "" } else { "  (defeated)" }
            );
        }
    }
    if result.rejected > 0 {
        println!("  {} action(s) refused", result.rejected);
    }
    if result.enemies_defeated() {
        println!("  All enemies defeated!");
    }
}

/// Load a script file, run it and print the outcome
pub fn run_script_file(path: &Path, output: Option<&Path>) -> Result<EncounterResult, String> {
    let mut config = ScriptConfig::load_from_file(path)?;
    if let Some(output) = output {
        config.output_path = Some(output.display().to_string());
    }

    println!("Running encounter script {}...", path.display());
    let result = run_script(&config)?;
    print_summary(&result);

    for entry in result.log.filter_by_type(CombatLogEventType::Rejected) {
        println!("  refused in round {}: {}", entry.round, entry.message);
    }
    Ok(result)
}
