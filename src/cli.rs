//! Command-line interface for the tracker
//!
//! Each invocation loads the saved encounter, applies one command, saves
//! what changed and prints the table. `run` replays a JSON script instead.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::combat::{EntityRef, Intent};
use crate::settings::{StepAmounts, TrackerSettings};

/// Tabletop RPG combat tracker
#[derive(Parser, Debug)]
#[command(name = "rpgtracker")]
#[command(about = "Track hit points, status effects and turn order for RPG combat")]
#[command(version)]
pub struct Args {
    /// Directory holding the saved encounter (overrides settings)
    #[arg(long, value_name = "DIR", global = true)]
    pub save_dir: Option<PathBuf>,

    /// Settings file
    #[arg(long, value_name = "FILE", default_value = crate::settings::SETTINGS_FILE, global = true)]
    pub settings: PathBuf,

    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the current encounter
    Show,
    /// Take hit points from a combatant (e.g. `damage e1 15`)
    Damage { target: EntityRef, amount: Option<i32> },
    /// Give hit points back
    Heal { target: EntityRef, amount: Option<i32> },
    /// Spend a player's mana (refused if the pool is too small)
    SpendMana { player: u32, amount: Option<i32> },
    /// Restore a player's mana
    RestoreMana { player: u32, amount: Option<i32> },
    /// Stun a combatant for some rounds
    Stun { target: EntityRef, rounds: Option<i32> },
    /// Start or extend a player's summon
    Summon { player: u32, rounds: Option<i32> },
    /// Add bleed damage per round
    Bleed { target: EntityRef, damage: Option<i32> },
    /// Stop a combatant bleeding
    ClearBleed { target: EntityRef },
    /// Replace a player's notes
    Note { player: u32, text: String },
    /// Add a player character
    AddPlayer {
        name: String,
        #[arg(long, default_value_t = 100)]
        hp: i32,
        #[arg(long, default_value_t = 50)]
        mana: i32,
    },
    /// Add an enemy
    AddEnemy {
        name: String,
        #[arg(long, default_value_t = 100)]
        hp: i32,
    },
    /// Remove a combatant
    Remove { target: EntityRef },
    /// Start arranging a manual turn order
    Order,
    /// Move an entry of the order being arranged
    Move { from: usize, to: usize },
    /// Start the game
    Start {
        /// Use the arranged order instead of a random one
        #[arg(long, conflicts_with = "random")]
        manual: bool,
        /// Shuffle even if settings default to manual
        #[arg(long)]
        random: bool,
        /// Seed for a reproducible shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Pass the turn to the next combatant
    Next,
    /// Restore the default roster and clear the game
    Reset,
    /// Write the settings file with its current (or default) values
    InitSettings,
    /// Run a JSON encounter script without touching the save directory
    Run {
        script: PathBuf,
        /// Write the combat log here as JSON
        #[arg(long, value_name = "OUTPUT_PATH")]
        output: Option<PathBuf>,
    },
}

impl Command {
    /// The intent this command stands for, with omitted amounts filled from
    /// the configured steps. `Show`, `InitSettings` and `Run` have none.
    pub fn to_intent(&self, settings: &TrackerSettings) -> Option<Intent> {
        let StepAmounts {
            hp,
            mana,
            stun,
            summon,
            bleed,
        } = settings.steps.normalized();

        let intent = match self.clone() {
            Command::Show | Command::InitSettings | Command::Run { .. } => return None,
            Command::Damage { target, amount } => Intent::Damage {
                target,
                amount: amount.unwrap_or(hp),
            },
            Command::Heal { target, amount } => Intent::Heal {
                target,
                amount: amount.unwrap_or(hp),
            },
            Command::SpendMana { player, amount } => Intent::SpendMana {
                player,
                amount: amount.unwrap_or(mana),
            },
            Command::RestoreMana { player, amount } => Intent::RestoreMana {
                player,
                amount: amount.unwrap_or(mana),
            },
            Command::Stun { target, rounds } => Intent::Stun {
                target,
                rounds: rounds.unwrap_or(stun),
            },
            Command::Summon { player, rounds } => Intent::Summon {
                player,
                rounds: rounds.unwrap_or(summon),
            },
            Command::Bleed { target, damage } => Intent::Bleed {
                target,
                damage: damage.unwrap_or(bleed),
            },
            Command::ClearBleed { target } => Intent::ClearBleed { target },
            Command::Note { player, text } => Intent::Note { player, text },
            Command::AddPlayer { name, hp, mana } => Intent::AddPlayer {
                name,
                max_hp: hp,
                max_mana: mana,
            },
            Command::AddEnemy { name, hp } => Intent::AddEnemy { name, max_hp: hp },
            Command::Remove { target } => Intent::Remove { target },
            Command::Order => Intent::BeginOrdering,
            Command::Move { from, to } => Intent::Reorder { from, to },
            Command::Start { manual, random, .. } => Intent::Start {
                manual: manual || (!random && settings.start_mode.is_manual()),
            },
            Command::Next => Intent::Advance,
            Command::Reset => Intent::Reset,
        };
        Some(intent)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
