//! Activity Reducer (catch-up)
//!
//! Folds everything that happened since a pet's last checkpoint into its state
//! exactly once:
//!
//! 1. Elapsed days since `last_update` drain food and excitement, recharge
//!    energy and grow evolution, all in a single step.
//! 2. Commits are scanned newest first. The scan stops at the first commit
//!    strictly older than the checkpoint; a commit stamped exactly at the
//!    checkpoint is still counted.
//! 3. Commits authored by the system identity are skipped.
//! 4. Every other commit feeds once, exhausts per file touched and excites
//!    per line inserted.
//! 5. The checkpoint moves to `now`.
//!
//! The reducer works on a copy of the pet. If the activity source fails
//! part-way through, the caller's state is left untouched, so re-running
//! replays from the old checkpoint instead of skipping commits.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::activity::{ActivitySource, SystemIdentity};
use crate::error::Result;
use crate::evolution::EvolutionEvent;
use crate::pet::PetState;

/// Milliseconds in one simulated day
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days between two instants. Negative spans (clock moved
/// backwards) count as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    (millis as f64 / MILLIS_PER_DAY).max(0.0)
}

/// Outcome of one catch-up
#[derive(Debug, Clone, PartialEq)]
pub struct CatchUpReport {
    /// Days applied by the time step
    pub elapsed_days: f64,
    /// Commits that fed the pet
    pub processed: usize,
    /// Commits skipped because the system authored them
    pub skipped_self: usize,
    /// Set when the evolution stage increased
    pub evolution: Option<EvolutionEvent>,
    /// Checkpoint after the catch-up
    pub checkpoint: DateTime<Utc>,
}

impl CatchUpReport {
    /// Whether the pet reached a new stage
    #[must_use]
    pub fn evolved(&self) -> bool {
        self.evolution.is_some()
    }
}

/// Replays repository activity into a pet
#[derive(Debug, Clone)]
pub struct ActivityReducer {
    identity: SystemIdentity,
}

impl ActivityReducer {
    /// Create a reducer that ignores commits by `identity`
    #[must_use]
    pub fn new(identity: SystemIdentity) -> Self {
        Self { identity }
    }

    /// Identity whose commits are ignored
    #[must_use]
    pub fn identity(&self) -> &SystemIdentity {
        &self.identity
    }

    /// Catch `pet` up to `now`
    ///
    /// # Errors
    ///
    /// Any error from the activity source. `pet` is only modified when the
    /// whole scan succeeded.
    #[allow(clippy::cast_precision_loss)]
    pub fn catch_up<S>(
        &self,
        pet: &mut PetState,
        now: DateTime<Utc>,
        source: &S,
    ) -> Result<CatchUpReport>
    where
        S: ActivitySource + ?Sized,
    {
        let boundary = pet.last_update();
        let elapsed_days = elapsed_days(boundary, now);

        let mut next = pet.clone();
        let stage_before = next.evolution_stage();
        next.pass_time(elapsed_days);
        let stage_after = next.evolution_stage();

        let mut processed = 0;
        let mut skipped_self = 0;

        for commit in source.commits_newest_first()? {
            let commit = commit?;

            if commit.committed_at < boundary {
                debug!(commit = %commit.id, "Reached checkpoint boundary");
                break;
            }

            if self.identity.is_self(&commit.author) {
                skipped_self += 1;
                debug!(commit = %commit.id, "Skipping self-authored commit");
                continue;
            }

            debug!(
                commit = %commit.id,
                author = %commit.author,
                files = commit.files_touched,
                insertions = commit.lines_inserted,
                summary = %commit.summary,
                "Processing commit"
            );
            next.feed(1.0);
            next.exhaust(commit.files_touched as f64);
            next.excite(commit.lines_inserted as f64);
            processed += 1;
        }

        next.checkpoint(now);
        let checkpoint = next.last_update();
        let evolution = EvolutionEvent::between(stage_before, stage_after, next.evolution());
        *pet = next;

        info!(
            pet = %pet.name(),
            elapsed_days,
            processed,
            skipped_self,
            stage = stage_after,
            "Caught up"
        );

        Ok(CatchUpReport {
            elapsed_days,
            processed,
            skipped_self,
            evolution,
            checkpoint,
        })
    }
}
