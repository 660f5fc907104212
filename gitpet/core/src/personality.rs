//! Personality Presets
//!
//! A personality is the bundle of constants a pet is created with: meter
//! capacities, gain/drain rates, evolution thresholds and look. Presets are only
//! consulted at adoption time; afterwards the values live in the pet record.
//!
//! # Preset Files
//!
//! Besides the built-in presets, a preset directory may hold `<name>.toml`
//! files. Any field left out falls back to the `default` preset:
//!
//! ```toml
//! max_food = 150.0
//! food_drain_modifier = 60.0
//! evolution_thresholds = [2.0, 14.0, 60.0]
//! look = "fox"
//! ```
//!
//! Files shadow built-ins of the same name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PetError, Result};

/// Name of the preset used when none is requested
pub const DEFAULT_PERSONALITY: &str = "default";

/// Look used when a record or preset does not name one
pub const DEFAULT_LOOK: &str = "cat";

/// Constants fixed at adoption time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    /// Preset name (filled from the file stem when loaded from disk)
    pub name: String,

    /// Capacity of the food meter
    pub max_food: f64,
    /// Food gained per unit fed (one unit per commit)
    pub food_gain_modifier: f64,
    /// Food lost per day
    pub food_drain_modifier: f64,

    /// Capacity of the energy meter
    pub max_energy: f64,
    /// Energy regained per day (and per nap)
    pub energy_gain_modifier: f64,
    /// Energy lost per file touched
    pub energy_drain_modifier: f64,

    /// Capacity of the excitement meter
    pub max_excitement: f64,
    /// Flat excitement bonus per excite call (and per petting)
    pub excitement_gain_modifier: f64,
    /// Excitement lost per day
    pub excitement_drain_modifier: f64,

    /// Evolution thresholds in days, ascending
    pub evolution_thresholds: Vec<f64>,

    /// Rendering asset set
    pub look: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            name: DEFAULT_PERSONALITY.to_string(),
            max_food: 100.0,
            food_gain_modifier: 10.0,
            food_drain_modifier: 100.0,
            max_energy: 100.0,
            energy_gain_modifier: 100.0,
            energy_drain_modifier: 5.0,
            max_excitement: 100.0,
            excitement_gain_modifier: 0.5,
            excitement_drain_modifier: 100.0,
            evolution_thresholds: vec![1.0, 7.0, 30.0],
            look: DEFAULT_LOOK.to_string(),
        }
    }
}

impl Personality {
    /// Sleeps a lot, gets bored slowly, evolves late
    #[must_use]
    pub fn lazy() -> Self {
        Self {
            name: "lazy".to_string(),
            energy_gain_modifier: 150.0,
            energy_drain_modifier: 10.0,
            excitement_drain_modifier: 40.0,
            food_drain_modifier: 50.0,
            evolution_thresholds: vec![3.0, 14.0, 60.0],
            look: "blob".to_string(),
            ..Self::default()
        }
    }

    /// Craves new lines of code and burns through everything quickly
    #[must_use]
    pub fn hyper() -> Self {
        Self {
            name: "hyper".to_string(),
            max_excitement: 200.0,
            excitement_gain_modifier: 2.0,
            excitement_drain_modifier: 200.0,
            energy_drain_modifier: 2.0,
            evolution_thresholds: vec![0.5, 3.0, 14.0],
            look: "fox".to_string(),
            ..Self::default()
        }
    }

    /// Big stomach, small commits barely register
    #[must_use]
    pub fn glutton() -> Self {
        Self {
            name: "glutton".to_string(),
            max_food: 300.0,
            food_gain_modifier: 5.0,
            food_drain_modifier: 150.0,
            ..Self::default()
        }
    }

    /// Look up a built-in preset
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            DEFAULT_PERSONALITY => Some(Self::default()),
            "lazy" => Some(Self::lazy()),
            "hyper" => Some(Self::hyper()),
            "glutton" => Some(Self::glutton()),
            _ => None,
        }
    }

    /// Names of the built-in presets
    #[must_use]
    pub const fn builtin_names() -> &'static [&'static str] {
        &[DEFAULT_PERSONALITY, "lazy", "hyper", "glutton"]
    }
}

// =============================================================================
// Preset Library
// =============================================================================

/// Resolves preset names against an optional directory of TOML files and the
/// built-in presets
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    preset_dir: Option<PathBuf>,
}

impl PresetLibrary {
    /// Create a library, optionally backed by a preset directory
    #[must_use]
    pub fn new(preset_dir: Option<PathBuf>) -> Self {
        Self { preset_dir }
    }

    /// Directory searched before the built-ins
    #[must_use]
    pub fn preset_dir(&self) -> Option<&Path> {
        self.preset_dir.as_deref()
    }

    /// Load a preset by name
    ///
    /// # Errors
    ///
    /// `PresetNotFound` if neither a file nor a built-in matches, `PresetParse`
    /// or `Io` if the file exists but cannot be used.
    pub fn load_preset(&self, name: &str) -> Result<Personality> {
        if let Some(path) = self.preset_file(name) {
            if path.is_file() {
                let personality = Self::load_file(&path, name)?;
                tracing::debug!(preset = name, path = %path.display(), "Loaded personality file");
                return Ok(personality);
            }
        }

        Personality::builtin(name).ok_or_else(|| PetError::PresetNotFound(name.to_string()))
    }

    /// Every preset name available, built-ins first, sorted and deduplicated
    ///
    /// # Errors
    ///
    /// Fails if the preset directory exists but cannot be listed.
    pub fn available(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Personality::builtin_names()
            .iter()
            .map(|name| (*name).to_string())
            .collect();

        if let Some(dir) = self.preset_dir.as_ref().filter(|dir| dir.is_dir()) {
            let entries = std::fs::read_dir(dir).map_err(|e| PetError::io(dir, e))?;
            for entry in entries {
                let path = entry.map_err(|e| PetError::io(dir, e))?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    if !names.iter().any(|n| n == stem) {
                        names.push(stem.to_string());
                    }
                }
            }
        }

        names[Personality::builtin_names().len()..].sort();
        Ok(names)
    }

    fn preset_file(&self, name: &str) -> Option<PathBuf> {
        // Names double as file stems; refuse anything that could escape the dir
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        self.preset_dir
            .as_ref()
            .map(|dir| dir.join(format!("{name}.toml")))
    }

    fn load_file(path: &Path, name: &str) -> Result<Personality> {
        let content = std::fs::read_to_string(path).map_err(|e| PetError::io(path, e))?;
        let mut personality: Personality =
            toml::from_str(&content).map_err(|source| PetError::PresetParse {
                path: path.to_path_buf(),
                source,
            })?;
        personality.name = name.to_string();
        Ok(personality)
    }
}
