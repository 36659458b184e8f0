//! Tracker settings
//!
//! User preferences stored as RON: where encounters are saved, default step
//! amounts for the adjust commands, and which card rules are enforced.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::encounter::GateRules;

/// Default settings file name, next to the working directory
pub const SETTINGS_FILE: &str = "settings.ron";

/// User-configurable tracker settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Directory holding players.json, enemies.json and session.json
    pub save_dir: PathBuf,
    pub steps: StepAmounts,
    /// Refuse actions a card would have disabled (re-stun, mana while
    /// stunned, summon without enough mana)
    pub enforce_card_gates: bool,
    pub summon_mana_threshold: i32,
    pub start_mode: StartMode,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(".rpgtracker"),
            steps: StepAmounts::default(),
            enforce_card_gates: true,
            summon_mana_threshold: 20,
            start_mode: StartMode::Random,
        }
    }
}

/// Amounts used when a command leaves the amount out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepAmounts {
    pub hp: i32,
    pub mana: i32,
    pub stun: i32,
    pub summon: i32,
    pub bleed: i32,
}

impl Default for StepAmounts {
    fn default() -> Self {
        Self {
            hp: 10,
            mana: 10,
            stun: 1,
            summon: 1,
            bleed: 1,
        }
    }
}

impl StepAmounts {
    /// Steps below 1 are raised to 1
    pub fn normalized(self) -> Self {
        Self {
            hp: self.hp.max(1),
            mana: self.mana.max(1),
            stun: self.stun.max(1),
            summon: self.summon.max(1),
            bleed: self.bleed.max(1),
        }
    }
}

/// How `start` builds the order when not told explicitly
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    Random,
    Manual,
}

impl StartMode {
    pub fn is_manual(&self) -> bool {
        matches!(self, StartMode::Manual)
    }
}

impl TrackerSettings {
    /// Load settings from file, or return default if the file is missing or bad
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<TrackerSettings>(&contents) {
                Ok(mut settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings.steps = settings.steps.normalized();
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn gate_rules(&self) -> GateRules {
        GateRules {
            enabled: self.enforce_card_gates,
            summon_mana_threshold: self.summon_mana_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = TrackerSettings::load(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, TrackerSettings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let settings = TrackerSettings {
            enforce_card_gates: false,
            start_mode: StartMode::Manual,
            ..TrackerSettings::default()
        };

        settings.save(&path).unwrap();

        assert_eq!(TrackerSettings::load(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults_and_raises_steps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "(summon_mana_threshold: 30, steps: (hp: 0))").unwrap();

        let settings = TrackerSettings::load(&path);

        assert_eq!(settings.summon_mana_threshold, 30);
        assert_eq!(settings.steps.hp, 1);
        assert_eq!(settings.steps.mana, 10);
        assert!(settings.enforce_card_gates);
    }
}
