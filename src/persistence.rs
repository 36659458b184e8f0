//! Save/load boundary
//!
//! An encounter is stored as three JSON files in a save directory:
//! `players.json` and `enemies.json` hold the rosters, `session.json` holds
//! the turn order and clock. Roster files carry a schema version and the
//! next id to allocate; a bare JSON array (the older unversioned layout) is
//! still accepted.
//!
//! Loading never fails: anything missing or unreadable falls back to the
//! default roster (per collection) or a not-started session, with a warning.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::combat::components::{default_enemies, default_players};
use crate::combat::{EntityKind, EntityStore, GameClock, Touched, TurnEngine, TurnPhase};
use crate::encounter::Encounter;

pub const SCHEMA_VERSION: u32 = 1;

pub const PLAYERS_FILE: &str = "players.json";
pub const ENEMIES_FILE: &str = "enemies.json";
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "{} uses schema version {found}, newer than supported version {}",
        .path.display(),
        SCHEMA_VERSION
    )]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

/// Versioned roster file
#[derive(Debug, Serialize, Deserialize)]
pub struct RosterFile<T> {
    pub version: u32,
    pub next_id: u32,
    pub entities: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRoster<T> {
    Versioned(RosterFile<T>),
    Legacy(Vec<T>),
}

/// Versioned session file
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionFile {
    pub version: u32,
    pub phase: TurnPhase,
    pub clock: GameClock,
}

/// A directory holding one saved encounter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDir {
    root: PathBuf,
}

impl SaveDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn players_path(&self) -> PathBuf {
        self.root.join(PLAYERS_FILE)
    }

    pub fn enemies_path(&self) -> PathBuf {
        self.root.join(ENEMIES_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load the roster, falling back to defaults per collection
    pub fn load_store(&self) -> EntityStore {
        let (players, next_player_id) =
            load_roster_or(&self.players_path(), "players", default_players);
        let (enemies, next_enemy_id) =
            load_roster_or(&self.enemies_path(), "enemies", default_enemies);
        EntityStore::from_parts(players, enemies, next_player_id, next_enemy_id)
    }

    /// Load the turn engine, falling back to a not-started session
    pub fn load_turns(&self) -> TurnEngine {
        let path = self.session_path();
        if !path.exists() {
            debug!("No session file at {:?}", path);
            return TurnEngine::default();
        }
        match read_session(&path) {
            Ok(session) => TurnEngine::from_parts(session.phase, session.clock),
            Err(e) => {
                warn!("{}; starting a new session", e);
                TurnEngine::default()
            }
        }
    }

    pub fn load_encounter(&self) -> Encounter {
        Encounter::resume(self.load_store(), self.load_turns())
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    pub fn save_players(&self, store: &EntityStore) -> Result<(), PersistError> {
        let file = RosterFile {
            version: SCHEMA_VERSION,
            next_id: store.next_id(EntityKind::Player),
            entities: store.players().iter().collect::<Vec<_>>(),
        };
        write_json_atomic(&self.players_path(), &file)
    }

    pub fn save_enemies(&self, store: &EntityStore) -> Result<(), PersistError> {
        let file = RosterFile {
            version: SCHEMA_VERSION,
            next_id: store.next_id(EntityKind::Enemy),
            entities: store.enemies().iter().collect::<Vec<_>>(),
        };
        write_json_atomic(&self.enemies_path(), &file)
    }

    pub fn save_turns(&self, turns: &TurnEngine) -> Result<(), PersistError> {
        let file = SessionFile {
            version: SCHEMA_VERSION,
            phase: turns.phase().clone(),
            clock: turns.clock(),
        };
        write_json_atomic(&self.session_path(), &file)
    }

    /// Write only the collections an intent touched
    pub fn save_touched(&self, encounter: &Encounter, touched: Touched) -> Result<(), PersistError> {
        if touched.players {
            self.save_players(encounter.store())?;
        }
        if touched.enemies {
            self.save_enemies(encounter.store())?;
        }
        if touched.session {
            self.save_turns(encounter.turns())?;
        }
        if touched.any() {
            debug!("Saved {:?} to {:?}", touched, self.root);
        }
        Ok(())
    }

    pub fn save_all(&self, encounter: &Encounter) -> Result<(), PersistError> {
        self.save_touched(encounter, Touched::ALL)?;
        info!("Saved encounter to {:?}", self.root);
        Ok(())
    }
}

fn load_roster_or<T: DeserializeOwned>(
    path: &Path,
    label: &str,
    fallback: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, u32) {
    if !path.exists() {
        debug!("No {} file at {:?}, using defaults", label, path);
        return (fallback(), 0);
    }
    match read_roster(path) {
        Ok(loaded) => {
            debug!("Loaded {} {} from {:?}", loaded.0.len(), label, path);
            loaded
        }
        Err(e) => {
            warn!("{}; using default {}", e, label);
            (fallback(), 0)
        }
    }
}

/// Read a roster file, accepting both versioned and legacy layouts.
///
/// Returns the entities and the stored id counter (0 when absent; the store
/// raises it past the largest id anyway).
pub fn read_roster<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, u32), PersistError> {
    let contents = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stored: StoredRoster<T> =
        serde_json::from_str(&contents).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    match stored {
        StoredRoster::Versioned(file) if file.version > SCHEMA_VERSION => {
            Err(PersistError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: file.version,
            })
        }
        StoredRoster::Versioned(file) => Ok((file.entities, file.next_id)),
        StoredRoster::Legacy(entities) => {
            info!("Upgrading unversioned roster file {:?}", path);
            Ok((entities, 0))
        }
    }
}

fn read_session(path: &Path) -> Result<SessionFile, PersistError> {
    let contents = fs::read_to_string(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let session: SessionFile =
        serde_json::from_str(&contents).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if session.version > SCHEMA_VERSION {
        return Err(PersistError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: session.version,
        });
    }
    Ok(session)
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_text_atomic(path, &json).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("save.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}
