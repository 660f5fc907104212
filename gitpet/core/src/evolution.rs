//! Evolution Stages
//!
//! A pet's `evolution` accumulator grows with elapsed real time (one unit per
//! day). Its stage is the number of configured thresholds it has reached.
//!
//! # Threshold Ordering
//!
//! Thresholds are scanned in the order they were configured and the scan stops
//! at the first threshold not yet reached. Presets list them ascending; an
//! unordered list under-counts rather than erroring:
//!
//! | Thresholds | Evolution | Stage |
//! |------------|-----------|-------|
//! | `[]` | any | 0 |
//! | `[1, 5]` | 3.0 | 1 |
//! | `[1, 5]` | 6.0 | 2 |
//! | `[5, 1]` | 3.0 | 0 |
//!
//! # Usage
//!
//! ```
//! use gitpet_core::evolution::{progress_to_next, stage_for};
//!
//! let thresholds = [1.0, 5.0];
//! assert_eq!(stage_for(3.0, &thresholds), 1);
//!
//! let progress = progress_to_next(3.0, &thresholds).unwrap();
//! assert_eq!(progress.target_stage, 2);
//! assert!((progress.days_needed - 2.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Stage reached by `evolution` for the given thresholds
#[must_use]
pub fn stage_for(evolution: f64, thresholds: &[f64]) -> usize {
    thresholds
        .iter()
        .take_while(|&&threshold| threshold <= evolution)
        .count()
}

/// Progress toward the next stage, or `None` once every threshold is reached
#[must_use]
pub fn progress_to_next(evolution: f64, thresholds: &[f64]) -> Option<EvolutionProgress> {
    let stage = stage_for(evolution, thresholds);
    let next = *thresholds.get(stage)?;
    let previous = if stage == 0 {
        0.0
    } else {
        thresholds[stage - 1]
    };

    let range = next - previous;
    let progress = if range > 0.0 {
        ((evolution - previous) / range).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(EvolutionProgress {
        target_stage: stage + 1,
        progress,
        days_needed: (next - evolution).max(0.0),
    })
}

// =============================================================================
// Evolution Event
// =============================================================================

/// Emitted by a catch-up when the pet's stage increased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    /// Stage before the catch-up
    pub from_stage: usize,
    /// Stage after the catch-up
    pub to_stage: usize,
    /// Evolution accumulator after the catch-up
    pub evolution: f64,
}

impl EvolutionEvent {
    /// Build an event if `to_stage` is past `from_stage`
    #[must_use]
    pub fn between(from_stage: usize, to_stage: usize, evolution: f64) -> Option<Self> {
        (to_stage > from_stage).then_some(Self {
            from_stage,
            to_stage,
            evolution,
        })
    }

    /// Number of stages gained at once (a long absence can skip several)
    #[must_use]
    pub fn stages_gained(&self) -> usize {
        self.to_stage.saturating_sub(self.from_stage)
    }
}

// =============================================================================
// Evolution Progress
// =============================================================================

/// How far the pet is between its current stage and the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Stage that will be reached at the next threshold
    pub target_stage: usize,
    /// Fraction of the way from the previous threshold, 0.0-1.0
    pub progress: f64,
    /// Days of elapsed time still needed
    pub days_needed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_empty_thresholds() {
        assert_eq!(stage_for(0.0, &[]), 0);
        assert_eq!(stage_for(1_000.0, &[]), 0);
    }

    #[test]
    fn test_stage_counts_reached_thresholds() {
        let thresholds = [1.0, 5.0];
        assert_eq!(stage_for(0.5, &thresholds), 0);
        assert_eq!(stage_for(1.0, &thresholds), 1);
        assert_eq!(stage_for(3.0, &thresholds), 1);
        assert_eq!(stage_for(5.0, &thresholds), 2);
        assert_eq!(stage_for(6.0, &thresholds), 2);
    }

    #[test]
    fn test_stage_stops_at_first_unreached() {
        // Out-of-order lists under-count
        assert_eq!(stage_for(3.0, &[5.0, 1.0]), 0);
        assert_eq!(stage_for(3.0, &[1.0, 5.0, 2.0]), 1);
    }

    #[test]
    fn test_stage_non_decreasing_with_evolution() {
        let thresholds = [0.5, 1.0, 7.0, 30.0];
        let mut previous = 0;
        for step in 0..400 {
            let stage = stage_for(f64::from(step) * 0.1, &thresholds);
            assert!(stage >= previous);
            previous = stage;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_progress_to_next() {
        let thresholds = [2.0, 6.0];

        let p = progress_to_next(1.0, &thresholds).unwrap();
        assert_eq!(p.target_stage, 1);
        assert!((p.progress - 0.5).abs() < 1e-9);
        assert!((p.days_needed - 1.0).abs() < 1e-9);

        let p = progress_to_next(4.0, &thresholds).unwrap();
        assert_eq!(p.target_stage, 2);
        assert!((p.progress - 0.5).abs() < 1e-9);

        assert!(progress_to_next(6.0, &thresholds).is_none());
        assert!(progress_to_next(0.0, &[]).is_none());
    }

    #[test]
    fn test_event_between() {
        assert!(EvolutionEvent::between(1, 1, 3.0).is_none());
        assert!(EvolutionEvent::between(2, 1, 3.0).is_none());

        let event = EvolutionEvent::between(0, 2, 6.0).unwrap();
        assert_eq!(event.stages_gained(), 2);
        assert_eq!(event.to_stage, 2);
    }
}
