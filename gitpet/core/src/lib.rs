//! Gitpet Core - A Virtual Pet Fed by Repository Activity
//!
//! Commits feed the pet, touched files tire it, inserted lines excite it, and
//! elapsed real time drains it. This crate holds the simulation and the glue
//! to git and disk, with no terminal or argument-parsing code.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Keeper                              │
//! │   load ──► catch up ──► save ──► auto-commit                  │
//! │    │          │          │            │                       │
//! │ ┌──┴──────┐ ┌─┴───────────────┐ ┌────┴──────┐ ┌────────────┐ │
//! │ │PetStore │ │ ActivityReducer │ │ PetStore  │ │AutoCommit  │ │
//! │ │(records)│ │  PetState +     │ │           │ │Sink (git)  │ │
//! │ └─────────┘ │  ActivitySource │ └───────────┘ └────────────┘ │
//! │             └─────────────────┘                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`PetState`]: bounded meters and the evolution accumulator, pure arithmetic
//! - [`ActivityReducer`]: exactly-once catch-up of time and commits
//! - [`Keeper`]: one command end to end
//! - [`FileStore`]: JSON records under an explicit store root
//! - [`GitRepository`]: commit history and auto-commits through `git2`
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::Utc;
//! use gitpet_core::{load_config, FileStore, GitRepository, Keeper};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let repo = GitRepository::discover(".")?;
//! let store = FileStore::new(config.store_root(&repo.workdir()?));
//!
//! let keeper = Keeper::new(store, &repo, &repo, config.identity.clone());
//! let report = keeper.status("tom", Utc::now())?;
//! println!("{} is {}", report.pet.name(), report.pet.mood());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Overview
//!
//! - [`pet`]: meters, moods and the pet state
//! - [`evolution`]: stage arithmetic and evolution events
//! - [`activity`]: commit records, system identity, activity sources
//! - [`reducer`]: the catch-up protocol
//! - [`personality`]: built-in and file-based presets
//! - [`store`]: persistence
//! - [`git`]: history scan and auto-commit
//! - [`keeper`]: command orchestration
//! - [`config`]: TOML/env configuration
//! - [`error`]: error types

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod config;
pub mod error;
pub mod evolution;
pub mod git;
pub mod keeper;
pub mod personality;
pub mod pet;
pub mod reducer;
pub mod store;

pub use activity::{ActivitySource, CommitActivity, CommitAuthor, SystemIdentity};
pub use config::{load_config, load_config_from_path, ConfigOverrides, GitpetConfig};
pub use error::{PetError, Result};
pub use evolution::{EvolutionEvent, EvolutionProgress};
pub use git::{AutoCommitSink, CommitOutcome, GitRepository, NoCommit};
pub use keeper::{Keeper, PetUpdate, StatusReport};
pub use personality::{Personality, PresetLibrary};
pub use pet::{Meter, Mood, PetState};
pub use reducer::{ActivityReducer, CatchUpReport};
pub use store::{FileStore, PetRecord, PetStore};
