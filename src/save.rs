//! Best-score persistence
//!
//! One small JSON record: schema version, best score per mode, the entity
//! unlock collection, and player settings. Loading merges whatever was
//! stored over the defaults, so partial or corrupt data never surfaces an
//! error; saving is best-effort and failures are swallowed after a log
//! line. Single attempt per call, no retries.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Current save schema version
pub const SAVE_VERSION: u32 = 1;

/// Default save file name for the native backend
pub const SAVE_FILE: &str = "commute-rush-save.json";

fn default_version() -> u32 {
    SAVE_VERSION
}

/// Color accommodation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindMode {
    #[default]
    Off,
    Protan,
    Deutan,
    Tritan,
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    /// 0..1
    pub bgm: f32,
    /// 0..1
    pub sfx: f32,
    pub low_effects: bool,
    pub color_blind: ColorBlindMode,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            bgm: 0.8,
            sfx: 1.0,
            low_effects: false,
            color_blind: ColorBlindMode::Off,
        }
    }
}

/// Per-entity unlock record (not consulted by the sim core yet)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSave {
    pub discovered: bool,
    pub defeat_count: u32,
    pub favorite: bool,
}

/// Best score per mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestScores {
    pub morning: i64,
    pub night: i64,
    pub day: i64,
}

impl BestScores {
    pub fn get(&self, mode: GameMode) -> i64 {
        match mode {
            GameMode::Morning => self.morning,
            GameMode::Night => self.night,
            GameMode::Day => self.day,
        }
    }

    /// Keep the maximum ever seen
    pub fn merge_max(&mut self, mode: GameMode, score: i64) {
        let slot = match mode {
            GameMode::Morning => &mut self.morning,
            GameMode::Night => &mut self.night,
            GameMode::Day => &mut self.day,
        };
        *slot = (*slot).max(score);
    }
}

/// The whole persisted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    #[serde(default = "default_version")]
    pub version: u32,
    pub best: BestScores,
    pub cards: BTreeMap<String, CardSave>,
    pub settings: SaveSettings,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            best: BestScores::default(),
            cards: BTreeMap::new(),
            settings: SaveSettings::default(),
        }
    }
}

/// Where the JSON record lives. The store itself stays policy-only so
/// tests can run against an in-memory backend.
pub trait StorageBackend {
    fn read(&self) -> Option<String>;
    /// Best-effort write; returns false on failure
    fn write(&self, payload: &str) -> bool;
    fn clear(&self);
}

/// JSON file on disk
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(SAVE_FILE)
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn write(&self, payload: &str) -> bool {
        match fs::write(&self.path, payload) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("save write failed ({}): {e}", self.path.display());
                false
            }
        }
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// In-memory backend for tests
#[derive(Default)]
pub struct MemoryBackend {
    cell: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Option<String> {
        self.cell.borrow().clone()
    }

    fn write(&self, payload: &str) -> bool {
        *self.cell.borrow_mut() = Some(payload.to_string());
        true
    }

    fn clear(&self) {
        *self.cell.borrow_mut() = None;
    }
}

/// Typed access to the save record over a pluggable backend
pub struct SaveStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> SaveStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Defaults merged with whatever was stored; corrupt or missing data
    /// silently falls back to defaults.
    pub fn load(&self) -> SaveData {
        let Some(raw) = self.backend.read() else {
            return SaveData::default();
        };
        match serde_json::from_str::<SaveData>(&raw) {
            Ok(mut data) => {
                // Future schema bumps convert here
                if data.version < SAVE_VERSION {
                    data.version = SAVE_VERSION;
                }
                data
            }
            Err(e) => {
                log::warn!("corrupt save record, using defaults: {e}");
                SaveData::default()
            }
        }
    }

    pub fn save(&self, data: &SaveData) {
        match serde_json::to_string(data) {
            Ok(json) => {
                self.backend.write(&json);
            }
            Err(e) => log::warn!("save serialization failed: {e}"),
        }
    }

    pub fn reset(&self) {
        self.backend.clear();
    }

    /// Store `max(existing, score)` for the mode
    pub fn set_best(&self, mode: GameMode, score: i64) {
        let mut data = self.load();
        data.best.merge_max(mode, score);
        self.save(&data);
    }

    pub fn get_best(&self, mode: GameMode) -> i64 {
        self.load().best.get(mode)
    }

    /// Mark an entity discovered and bump its defeat count
    pub fn unlock_card(&self, card_id: u32) {
        let mut data = self.load();
        let card = data.cards.entry(card_id.to_string()).or_default();
        card.discovered = true;
        card.defeat_count += 1;
        self.save(&data);
    }

    pub fn set_favorite(&self, card_id: u32, favorite: bool) {
        let mut data = self.load();
        data.cards.entry(card_id.to_string()).or_default().favorite = favorite;
        self.save(&data);
    }

    pub fn settings(&self) -> SaveSettings {
        self.load().settings
    }

    /// Read-modify-write on the settings record
    pub fn update_settings(&self, f: impl FnOnce(&mut SaveSettings)) {
        let mut data = self.load();
        f(&mut data.settings);
        self.save(&data);
    }
}
