//! Pet Store
//!
//! Durable home of every pet in a repository. The store root (for example
//! `<worktree>/.gitpet`) is always passed in explicitly; nothing here looks at
//! the process working directory.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   pets/
//!     tom.json
//!     felix.json
//! ```
//!
//! # Record Format
//!
//! Each pet is one pretty-printed JSON object. Records without a `version`
//! field are version 1 (the flat layout every version shares); version 2 adds
//! `evolution`, `evolution_thresholds` and `look`, which default to `0`, `[]`
//! and `"cat"` when absent. `last_update` is stored as float Unix seconds.
//!
//! Writes go to a temporary file in the same directory and are renamed over
//! the record, so a crash leaves either the old or the new record, never a
//! torn one.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PetError, Result};
use crate::personality::DEFAULT_LOOK;
use crate::pet::{Meter, PetState};

/// Record version written by this build
pub const RECORD_VERSION: u32 = 2;

/// Version assumed for records that predate the `version` field
const LEGACY_RECORD_VERSION: u32 = 1;

/// Directory under the store root holding one file per pet
const PETS_DIR: &str = "pets";

/// Extension of pet record files
const RECORD_EXTENSION: &str = "json";

// =============================================================================
// Store Trait
// =============================================================================

/// Persistence for named pets
pub trait PetStore {
    /// Store root
    fn root(&self) -> &Path;

    /// Whether the store has been created
    fn is_initialized(&self) -> bool;

    /// Create an empty store
    ///
    /// # Errors
    ///
    /// `StoreAlreadyExists` if the root is already present.
    fn init(&self) -> Result<()>;

    /// Load a pet by name
    ///
    /// # Errors
    ///
    /// `StoreMissing`, `PetNotFound`, or a decode failure.
    fn load(&self, name: &str) -> Result<PetState>;

    /// Save a pet, replacing any previous record atomically
    ///
    /// # Errors
    ///
    /// `StoreMissing` or an I/O failure.
    fn save(&self, pet: &PetState) -> Result<()>;

    /// Names of every stored pet, sorted
    ///
    /// # Errors
    ///
    /// `StoreMissing` or an I/O failure.
    fn list(&self) -> Result<Vec<String>>;

    /// Delete the store and every pet in it. A missing store is not an error.
    ///
    /// # Errors
    ///
    /// I/O failure while removing files.
    fn release(&self) -> Result<()>;
}

/// Check that `name` can be used as a record file stem
///
/// # Errors
///
/// `InvalidPetName` with the reason.
pub fn validate_pet_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.starts_with('.') {
        Some("name starts with a dot")
    } else if name.chars().any(char::is_control) {
        Some("name contains control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(PetError::InvalidPetName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

// =============================================================================
// On-disk Record
// =============================================================================

/// Serialized form of a [`PetState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    /// Record layout version
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Pet name
    pub name: String,

    /// Food capacity
    pub max_food: f64,
    /// Food gained per unit fed
    pub food_gain_modifier: f64,
    /// Food lost per day
    pub food_drain_modifier: f64,
    /// Current food
    pub food: f64,

    /// Energy capacity
    pub max_energy: f64,
    /// Energy regained per day
    pub energy_gain_modifier: f64,
    /// Energy lost per file touched
    pub energy_drain_modifier: f64,
    /// Current energy
    pub energy: f64,

    /// Excitement capacity
    pub max_excitement: f64,
    /// Flat excitement bonus
    pub excitement_gain_modifier: f64,
    /// Excitement lost per day
    pub excitement_drain_modifier: f64,
    /// Current excitement
    pub excitement: f64,

    /// Accumulated evolution
    #[serde(default)]
    pub evolution: f64,
    /// Evolution thresholds
    #[serde(default)]
    pub evolution_thresholds: Vec<f64>,

    /// Last checkpoint
    #[serde(with = "unix_seconds")]
    pub last_update: DateTime<Utc>,

    /// Rendering asset set
    #[serde(default = "default_look")]
    pub look: String,
}

fn legacy_version() -> u32 {
    LEGACY_RECORD_VERSION
}

fn default_look() -> String {
    DEFAULT_LOOK.to_string()
}

/// Just enough of a record to check its version before decoding the rest
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default = "legacy_version")]
    version: u32,
}

impl From<&PetState> for PetRecord {
    fn from(pet: &PetState) -> Self {
        let food = pet.food();
        let energy = pet.energy();
        let excitement = pet.excitement();

        Self {
            version: RECORD_VERSION,
            name: pet.name().to_string(),
            max_food: food.max(),
            food_gain_modifier: food.gain_modifier(),
            food_drain_modifier: food.drain_modifier(),
            food: food.value(),
            max_energy: energy.max(),
            energy_gain_modifier: energy.gain_modifier(),
            energy_drain_modifier: energy.drain_modifier(),
            energy: energy.value(),
            max_excitement: excitement.max(),
            excitement_gain_modifier: excitement.gain_modifier(),
            excitement_drain_modifier: excitement.drain_modifier(),
            excitement: excitement.value(),
            evolution: pet.evolution(),
            evolution_thresholds: pet.evolution_thresholds().to_vec(),
            last_update: pet.last_update(),
            look: pet.look().to_string(),
        }
    }
}

impl From<PetRecord> for PetState {
    fn from(record: PetRecord) -> Self {
        let food = Meter::full(
            record.max_food,
            record.food_gain_modifier,
            record.food_drain_modifier,
        )
        .with_value(record.food);
        let energy = Meter::full(
            record.max_energy,
            record.energy_gain_modifier,
            record.energy_drain_modifier,
        )
        .with_value(record.energy);
        let excitement = Meter::full(
            record.max_excitement,
            record.excitement_gain_modifier,
            record.excitement_drain_modifier,
        )
        .with_value(record.excitement);

        PetState::new(record.name, food, energy, excitement, record.last_update)
            .with_evolution(record.evolution)
            .with_evolution_thresholds(record.evolution_thresholds)
            .with_look(record.look)
    }
}

impl PetRecord {
    /// Decode a record, rejecting versions newer than [`RECORD_VERSION`]
    ///
    /// # Errors
    ///
    /// `UnsupportedRecordVersion` or `Serialization`.
    pub fn from_json(json: &str) -> Result<Self> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version > RECORD_VERSION {
            return Err(PetError::UnsupportedRecordVersion {
                found: probe.version,
                supported: RECORD_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as pretty JSON
    ///
    /// # Errors
    ///
    /// `Serialization` (non-finite numbers cannot be encoded).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `DateTime<Utc>` as float Unix seconds
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_precision_loss)]
    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        let seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) / 1e9;
        serializer.serialize_f64(seconds)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(de::Error::custom("last_update is not a finite number"));
        }

        let whole = seconds.floor();
        let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::from_timestamp(whole as i64, nanos)
            .ok_or_else(|| de::Error::custom(format!("last_update {seconds} is out of range")))
    }
}

// =============================================================================
// File Store
// =============================================================================

/// JSON files under a store root
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pets_dir(&self) -> PathBuf {
        self.root.join(PETS_DIR)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.pets_dir().join(format!("{name}.{RECORD_EXTENSION}"))
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PetError::StoreMissing {
                root: self.root.clone(),
            })
        }
    }
}

impl PetStore for FileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_initialized(&self) -> bool {
        self.pets_dir().is_dir()
    }

    fn init(&self) -> Result<()> {
        if self.root.exists() {
            return Err(PetError::StoreAlreadyExists {
                root: self.root.clone(),
            });
        }

        let pets_dir = self.pets_dir();
        std::fs::create_dir_all(&pets_dir).map_err(|e| PetError::io(&pets_dir, e))?;
        info!(root = %self.root.display(), "Created pet store");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<PetState> {
        validate_pet_name(name)?;
        self.ensure_initialized()?;

        let path = self.record_path(name);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PetError::PetNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(PetError::io(&path, e)),
        };

        let record = PetRecord::from_json(&json)?;
        debug!(pet = name, version = record.version, "Loaded pet record");
        Ok(record.into())
    }

    fn save(&self, pet: &PetState) -> Result<()> {
        validate_pet_name(pet.name())?;
        self.ensure_initialized()?;

        let json = PetRecord::from(pet).to_json()?;
        let pets_dir = self.pets_dir();
        let path = self.record_path(pet.name());

        let mut tmp = NamedTempFile::new_in(&pets_dir).map_err(|e| PetError::io(&pets_dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| PetError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| PetError::io(&path, e.error))?;

        debug!(pet = pet.name(), path = %path.display(), "Saved pet record");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;

        let pets_dir = self.pets_dir();
        let entries = std::fs::read_dir(&pets_dir).map_err(|e| PetError::io(&pets_dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PetError::io(&pets_dir, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_pet_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn release(&self) -> Result<()> {
        if !self.root.exists() {
            debug!(root = %self.root.display(), "No pet store to release");
            return Ok(());
        }

        std::fs::remove_dir_all(&self.root).map_err(|e| PetError::io(&self.root, e))?;
        info!(root = %self.root.display(), "Released pet store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personality::Personality;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap()
    }

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join(".gitpet"));
        (dir, store)
    }

    // =========================================================================
    // Lifecycle Tests
    // =========================================================================

    #[test]
    fn test_init_creates_layout() {
        let (_dir, store) = store();
        assert!(!store.is_initialized());

        store.init().unwrap();
        assert!(store.is_initialized());
        assert!(store.root().join("pets").is_dir());
    }

    #[test]
    fn test_init_twice_fails() {
        let (_dir, store) = store();
        store.init().unwrap();
        assert!(matches!(
            store.init(),
            Err(PetError::StoreAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_operations_require_store() {
        let (_dir, store) = store();
        let pet = PetState::adopt("tom", &Personality::default(), at());

        assert!(matches!(store.load("tom"), Err(PetError::StoreMissing { .. })));
        assert!(matches!(store.save(&pet), Err(PetError::StoreMissing { .. })));
        assert!(matches!(store.list(), Err(PetError::StoreMissing { .. })));
    }

    #[test]
    fn test_release_removes_everything() {
        let (_dir, store) = store();
        store.init().unwrap();
        store
            .save(&PetState::adopt("tom", &Personality::default(), at()))
            .unwrap();

        store.release().unwrap();
        assert!(!store.root().exists());

        // Releasing again is fine
        store.release().unwrap();
    }

    // =========================================================================
    // Record Tests
    // =========================================================================

    #[test]
    fn test_save_then_load_preserves_state() {
        let (_dir, store) = store();
        store.init().unwrap();

        let mut pet = PetState::adopt("tom", &Personality::hyper(), at());
        pet.hunger(0.3);
        pet.exhaust(4.0);
        pet.evolve(2.25);
        store.save(&pet).unwrap();

        assert_eq!(store.load("tom").unwrap(), pet);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let (_dir, store) = store();
        store.init().unwrap();

        let mut pet = PetState::adopt("tom", &Personality::default(), at());
        store.save(&pet).unwrap();
        pet.hunger(0.5);
        store.save(&pet).unwrap();

        assert_eq!(store.load("tom").unwrap().food().value(), 50.0);
        // No temporary files left behind
        assert_eq!(
            std::fs::read_dir(store.root().join("pets")).unwrap().count(),
            1
        );
    }

    #[test]
    fn test_missing_pet() {
        let (_dir, store) = store();
        store.init().unwrap();
        assert!(matches!(
            store.load("ghost"),
            Err(PetError::PetNotFound { name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let (_dir, store) = store();
        store.init().unwrap();
        for name in ["zed", "amy", "tom"] {
            store
                .save(&PetState::adopt(name, &Personality::default(), at()))
                .unwrap();
        }
        std::fs::write(store.root().join("pets").join("README.txt"), "hi").unwrap();

        assert_eq!(store.list().unwrap(), vec!["amy", "tom", "zed"]);
    }

    #[test]
    fn test_legacy_record_gets_defaults() {
        let (_dir, store) = store();
        store.init().unwrap();
        let legacy = r#"{
  "name": "tom",
  "max_food": 100,
  "food_gain_modifier": 10,
  "food_drain_modifier": 100,
  "food": 42.5,
  "max_energy": 100,
  "energy_gain_modifier": 100,
  "energy_drain_modifier": 5,
  "energy": 100,
  "max_excitement": 100,
  "excitement_gain_modifier": 0.5,
  "excitement_drain_modifier": 100,
  "excitement": 12,
  "last_update": 1714818600.5
}"#;
        std::fs::write(store.root().join("pets").join("tom.json"), legacy).unwrap();

        let pet = store.load("tom").unwrap();
        assert_eq!(pet.food().value(), 42.5);
        assert_eq!(pet.evolution(), 0.0);
        assert!(pet.evolution_thresholds().is_empty());
        assert_eq!(pet.look(), "cat");
        assert_eq!(pet.last_update().timestamp(), 1_714_818_600);
        assert_eq!(pet.last_update().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_newer_record_version_rejected() {
        let json = r#"{"version": 99, "name": "tom", "shape": "unknown"}"#;
        assert!(matches!(
            PetRecord::from_json(json),
            Err(PetError::UnsupportedRecordVersion {
                found: 99,
                supported: RECORD_VERSION
            })
        ));
    }

    #[test]
    fn test_corrupted_record() {
        let (_dir, store) = store();
        store.init().unwrap();
        std::fs::write(store.root().join("pets").join("tom.json"), "{ not json").unwrap();
        assert!(matches!(
            store.load("tom"),
            Err(PetError::Serialization(_))
        ));
    }

    #[test]
    fn test_loaded_meters_are_clamped() {
        let mut record = PetRecord::from(&PetState::adopt("tom", &Personality::default(), at()));
        record.food = 500.0;
        record.energy = -3.0;

        let pet = PetState::from(record);
        assert_eq!(pet.food().value(), 100.0);
        assert_eq!(pet.energy().value(), 0.0);
    }

    // =========================================================================
    // Name Validation Tests
    // =========================================================================

    #[test]
    fn test_invalid_names() {
        for name in ["", "  ", "../tom", "a/b", "a\\b", ".hidden", "tab\there"] {
            assert!(
                matches!(validate_pet_name(name), Err(PetError::InvalidPetName { .. })),
                "{name:?} should be rejected"
            );
        }
        validate_pet_name("Tom the 2nd").unwrap();
    }

    #[test]
    fn test_invalid_name_never_touches_disk() {
        let (_dir, store) = store();
        store.init().unwrap();
        assert!(matches!(
            store.load("../../etc/passwd"),
            Err(PetError::InvalidPetName { .. })
        ));
    }
}
