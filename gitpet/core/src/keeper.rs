//! Keeper
//!
//! Runs one user command end to end: load the pet, change it, save it, and
//! record the change in version control. The keeper owns its collaborators
//! through traits so tests can drive it with in-memory history.
//!
//! Auto-commit is best-effort. Once a save has succeeded the command has
//! succeeded; a failed commit is logged and surfaced as
//! [`CommitOutcome::Failed`].

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::activity::{ActivitySource, CommitAuthor, SystemIdentity};
use crate::error::Result;
use crate::git::{AutoCommitSink, CommitOutcome};
use crate::personality::Personality;
use crate::pet::PetState;
use crate::reducer::{ActivityReducer, CatchUpReport};
use crate::store::{validate_pet_name, PetStore};

/// Prefix of every automatic commit message
pub const COMMIT_PREFIX: &str = "Gitpet |";

/// Result of a command that changed one pet
#[derive(Debug, Clone, PartialEq)]
pub struct PetUpdate {
    /// Pet as saved
    pub pet: PetState,
    /// What happened to the auto-commit
    pub commit: CommitOutcome,
}

/// Result of `status`
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Pet as saved after catching up
    pub pet: PetState,
    /// What the catch-up applied
    pub catch_up: CatchUpReport,
    /// What happened to the auto-commit
    pub commit: CommitOutcome,
}

/// Orchestrates the store, activity history and auto-commit for each command
pub struct Keeper<S, A, C> {
    store: S,
    activity: A,
    sink: C,
    reducer: ActivityReducer,
    identity: SystemIdentity,
    auto_commit: bool,
}

impl<S, A, C> Keeper<S, A, C>
where
    S: PetStore,
    A: ActivitySource,
    C: AutoCommitSink,
{
    /// Create a keeper with auto-commit enabled
    pub fn new(store: S, activity: A, sink: C, identity: SystemIdentity) -> Self {
        Self {
            store,
            activity,
            sink,
            reducer: ActivityReducer::new(identity.clone()),
            identity,
            auto_commit: true,
        }
    }

    /// Turn auto-commit on or off
    #[must_use]
    pub fn with_auto_commit(mut self, enabled: bool) -> Self {
        self.auto_commit = enabled;
        self
    }

    /// Pet store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the store and a new pet in it
    ///
    /// # Errors
    ///
    /// `InvalidPetName`, `StoreAlreadyExists`, or a save failure (the
    /// half-created store is removed again).
    pub fn adopt(
        &self,
        name: &str,
        personality: &Personality,
        now: DateTime<Utc>,
    ) -> Result<PetUpdate> {
        validate_pet_name(name)?;
        self.store.init()?;

        let pet = PetState::adopt(name, personality, now);
        if let Err(e) = self.store.save(&pet) {
            if let Err(cleanup) = self.store.release() {
                warn!(error = %cleanup, "Could not remove half-created store");
            }
            return Err(e);
        }
        info!(pet = name, personality = %personality.name, "Adopted pet");

        let commit = self.record(
            &format!("{COMMIT_PREFIX} Adopted new pet \"{name}\""),
            &self.identity.author(),
        );
        Ok(PetUpdate { pet, commit })
    }

    /// Catch the pet up with elapsed time and new commits, then save it
    ///
    /// # Errors
    ///
    /// Load, history or save failures. Nothing is saved unless the catch-up
    /// completed.
    pub fn status(&self, name: &str, now: DateTime<Utc>) -> Result<StatusReport> {
        let mut pet = self.store.load(name)?;
        let catch_up = self.reducer.catch_up(&mut pet, now, &self.activity)?;
        self.store.save(&pet)?;

        if let Some(event) = &catch_up.evolution {
            info!(pet = name, stage = event.to_stage, "Pet evolved");
        }

        let commit = self.record(
            &format!("{COMMIT_PREFIX} Updated my needs"),
            &self.identity.for_pet(name),
        );
        Ok(StatusReport {
            pet,
            catch_up,
            commit,
        })
    }

    /// Give the pet some attention
    ///
    /// # Errors
    ///
    /// Load or save failures.
    pub fn pet(&self, name: &str) -> Result<PetUpdate> {
        self.update(name, PetState::pet, &format!("{COMMIT_PREFIX} Petted {name}"))
    }

    /// Let the pet rest
    ///
    /// # Errors
    ///
    /// Load or save failures.
    pub fn nap(&self, name: &str) -> Result<PetUpdate> {
        self.update(name, PetState::nap, &format!("{COMMIT_PREFIX} {name} took a nap"))
    }

    /// Load a pet without changing it
    ///
    /// # Errors
    ///
    /// `StoreMissing`, `PetNotFound` or a decode failure.
    pub fn peek(&self, name: &str) -> Result<PetState> {
        self.store.load(name)
    }

    /// Names of every pet in the store
    ///
    /// # Errors
    ///
    /// `StoreMissing` or an I/O failure.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Delete the store and every pet in it
    ///
    /// # Errors
    ///
    /// I/O failure while removing files.
    pub fn release(&self) -> Result<CommitOutcome> {
        self.store.release()?;
        info!(root = %self.store.root().display(), "Released all pets");
        Ok(self.record(
            &format!("{COMMIT_PREFIX} Released all pets"),
            &self.identity.author(),
        ))
    }

    fn update(&self, name: &str, action: fn(&mut PetState), message: &str) -> Result<PetUpdate> {
        let mut pet = self.store.load(name)?;
        action(&mut pet);
        self.store.save(&pet)?;

        let commit = self.record(message, &self.identity.for_pet(name));
        Ok(PetUpdate { pet, commit })
    }

    fn record(&self, message: &str, author: &CommitAuthor) -> CommitOutcome {
        if !self.auto_commit {
            return CommitOutcome::Disabled;
        }

        match self.sink.commit(self.store.root(), message, author) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, message, "Auto-commit failed, pet state was still saved");
                CommitOutcome::Failed(e.to_string())
            }
        }
    }
}
