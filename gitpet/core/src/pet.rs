//! Pet State
//!
//! The bounded-meter model of a single pet. Three meters (food, energy,
//! excitement) move between zero and their capacity; an evolution accumulator
//! only ever grows. Nothing here performs I/O: every operation is arithmetic on
//! the in-memory state, so the catch-up reducer can work on a copy and throw it
//! away on failure.
//!
//! # Rates
//!
//! | Operation | Meter | Change |
//! |-----------|-------|--------|
//! | `feed(n)` | food | `+ n * food_gain_modifier` |
//! | `hunger(d)` | food | `- d * food_drain_modifier` |
//! | `recharge(d)` | energy | `+ d * energy_gain_modifier` |
//! | `exhaust(n)` | energy | `- n * energy_drain_modifier` |
//! | `excite(n)` | excitement | `+ n + excitement_gain_modifier` |
//! | `bore(d)` | excitement | `- d * excitement_drain_modifier` |
//! | `evolve(d)` | evolution | `+ d` |
//! | `pet()` | excitement | `+ excitement_gain_modifier` |
//! | `nap()` | energy | `+ energy_gain_modifier` |
//!
//! `excite` adds a flat bonus on every call on top of the unscaled amount.
//!
//! # Usage
//!
//! ```
//! use chrono::Utc;
//! use gitpet_core::personality::Personality;
//! use gitpet_core::pet::PetState;
//!
//! let mut pet = PetState::adopt("tom", &Personality::default(), Utc::now());
//! pet.hunger(150.0);
//! assert_eq!(pet.food().value(), 0.0);
//!
//! pet.feed(1.0);
//! assert_eq!(pet.food().value(), 10.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evolution::{progress_to_next, stage_for, EvolutionProgress};
use crate::personality::Personality;

// =============================================================================
// Meter
// =============================================================================

/// A value clamped to `[0, max]` together with its rate constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    value: f64,
    max: f64,
    gain_modifier: f64,
    drain_modifier: f64,
}

impl Meter {
    /// A meter filled to capacity
    #[must_use]
    pub fn full(max: f64, gain_modifier: f64, drain_modifier: f64) -> Self {
        let max = max.max(0.0);
        Self {
            value: max,
            max,
            gain_modifier,
            drain_modifier,
        }
    }

    /// Replace the current value, clamped into range
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value.max(0.0).min(self.max);
        self
    }

    /// Current value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Capacity
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Rate applied when the meter is filled
    #[must_use]
    pub fn gain_modifier(&self) -> f64 {
        self.gain_modifier
    }

    /// Rate applied when the meter is drained
    #[must_use]
    pub fn drain_modifier(&self) -> f64 {
        self.drain_modifier
    }

    /// Value as a fraction of capacity (0.0 for a zero-capacity meter)
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    /// Add `delta`, stopping at capacity. Negative and NaN deltas count as zero.
    pub fn saturating_add(&mut self, delta: f64) {
        self.value = (self.value + delta.max(0.0)).min(self.max);
    }

    /// Subtract `delta`, stopping at zero. Negative and NaN deltas count as zero.
    pub fn saturating_sub(&mut self, delta: f64) {
        self.value = (self.value - delta.max(0.0)).max(0.0);
    }
}

// =============================================================================
// Mood
// =============================================================================

/// Fraction under which a meter dominates the pet's mood
const LOW_METER: f64 = 0.25;

/// Fraction every meter must reach for the pet to be ecstatic
const HIGH_METER: f64 = 0.75;

/// Coarse summary of the meters, used for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    /// Food is running out
    Starving,
    /// Energy is running out
    Exhausted,
    /// Excitement is running out
    Bored,
    /// Nothing urgent
    Content,
    /// Every meter is high
    Ecstatic,
}

impl Mood {
    /// Short human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Starving => "starving",
            Self::Exhausted => "exhausted",
            Self::Bored => "bored",
            Self::Content => "content",
            Self::Ecstatic => "ecstatic",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Pet State
// =============================================================================

/// One named pet
#[derive(Debug, Clone, PartialEq)]
pub struct PetState {
    name: String,
    food: Meter,
    energy: Meter,
    excitement: Meter,
    evolution: f64,
    evolution_thresholds: Vec<f64>,
    last_update: DateTime<Utc>,
    look: String,
}

impl PetState {
    /// Assemble a pet from its meters. Evolution starts at zero with no
    /// thresholds and the default look.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        food: Meter,
        energy: Meter,
        excitement: Meter,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            food,
            energy,
            excitement,
            evolution: 0.0,
            evolution_thresholds: Vec::new(),
            last_update,
            look: crate::personality::DEFAULT_LOOK.to_string(),
        }
    }

    /// A freshly adopted pet: every meter full, checkpoint at `now`
    #[must_use]
    pub fn adopt(name: impl Into<String>, personality: &Personality, now: DateTime<Utc>) -> Self {
        let food = Meter::full(
            personality.max_food,
            personality.food_gain_modifier,
            personality.food_drain_modifier,
        );
        let energy = Meter::full(
            personality.max_energy,
            personality.energy_gain_modifier,
            personality.energy_drain_modifier,
        );
        let excitement = Meter::full(
            personality.max_excitement,
            personality.excitement_gain_modifier,
            personality.excitement_drain_modifier,
        );

        Self::new(name, food, energy, excitement, now)
            .with_evolution_thresholds(personality.evolution_thresholds.clone())
            .with_look(personality.look.clone())
    }

    /// Restore an accumulated evolution value (negative values become zero)
    #[must_use]
    pub fn with_evolution(mut self, evolution: f64) -> Self {
        self.evolution = evolution.max(0.0);
        self
    }

    /// Set the evolution thresholds
    #[must_use]
    pub fn with_evolution_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.evolution_thresholds = thresholds;
        self
    }

    /// Set the cosmetic look
    #[must_use]
    pub fn with_look(mut self, look: impl Into<String>) -> Self {
        self.look = look.into();
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Pet name, unique within a store
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Food meter
    #[must_use]
    pub fn food(&self) -> &Meter {
        &self.food
    }

    /// Energy meter
    #[must_use]
    pub fn energy(&self) -> &Meter {
        &self.energy
    }

    /// Excitement meter
    #[must_use]
    pub fn excitement(&self) -> &Meter {
        &self.excitement
    }

    /// Accumulated evolution, in days of elapsed time
    #[must_use]
    pub fn evolution(&self) -> f64 {
        self.evolution
    }

    /// Configured evolution thresholds
    #[must_use]
    pub fn evolution_thresholds(&self) -> &[f64] {
        &self.evolution_thresholds
    }

    /// Time of the last checkpoint
    #[must_use]
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Rendering asset set
    #[must_use]
    pub fn look(&self) -> &str {
        &self.look
    }

    // -------------------------------------------------------------------------
    // Meter operations
    // -------------------------------------------------------------------------

    /// Feed `amount` units (one per commit)
    pub fn feed(&mut self, amount: f64) {
        let gain = self.food.gain_modifier;
        self.food.saturating_add(amount * gain);
    }

    /// Drain food for `days` of elapsed time
    pub fn hunger(&mut self, days: f64) {
        let drain = self.food.drain_modifier;
        self.food.saturating_sub(days * drain);
    }

    /// Regain energy for `days` of elapsed time
    pub fn recharge(&mut self, days: f64) {
        let gain = self.energy.gain_modifier;
        self.energy.saturating_add(days * gain);
    }

    /// Drain energy for `amount` units of work (files touched)
    pub fn exhaust(&mut self, amount: f64) {
        let drain = self.energy.drain_modifier;
        self.energy.saturating_sub(amount * drain);
    }

    /// Raise excitement by `amount` (lines inserted) plus the flat gain bonus
    pub fn excite(&mut self, amount: f64) {
        let bonus = self.excitement.gain_modifier;
        self.excitement.saturating_add(amount.max(0.0) + bonus);
    }

    /// Drain excitement for `days` of elapsed time
    pub fn bore(&mut self, days: f64) {
        let drain = self.excitement.drain_modifier;
        self.excitement.saturating_sub(days * drain);
    }

    /// Grow the evolution accumulator; it never decreases
    pub fn evolve(&mut self, days: f64) {
        self.evolution += days.max(0.0);
    }

    /// Manual excitement boost
    pub fn pet(&mut self) {
        let bonus = self.excitement.gain_modifier;
        self.excitement.saturating_add(bonus);
    }

    /// Manual energy boost
    pub fn nap(&mut self) {
        let gain = self.energy.gain_modifier;
        self.energy.saturating_add(gain);
    }

    /// Apply every time-driven change for `days` of elapsed time
    pub fn pass_time(&mut self, days: f64) {
        self.hunger(days);
        self.bore(days);
        self.recharge(days);
        self.evolve(days);
    }

    /// Move the checkpoint to `at`. Earlier times are ignored.
    pub fn checkpoint(&mut self, at: DateTime<Utc>) {
        if at > self.last_update {
            self.last_update = at;
        }
    }

    // -------------------------------------------------------------------------
    // Derived queries
    // -------------------------------------------------------------------------

    /// Number of evolution thresholds reached, scanning in order and stopping
    /// at the first one not yet reached
    #[must_use]
    pub fn evolution_stage(&self) -> usize {
        stage_for(self.evolution, &self.evolution_thresholds)
    }

    /// Progress toward the next stage, if any remain
    #[must_use]
    pub fn evolution_progress(&self) -> Option<EvolutionProgress> {
        progress_to_next(self.evolution, &self.evolution_thresholds)
    }

    /// Mood derived from the meters
    #[must_use]
    pub fn mood(&self) -> Mood {
        let meters = [
            (Mood::Starving, self.food.fraction()),
            (Mood::Exhausted, self.energy.fraction()),
            (Mood::Bored, self.excitement.fraction()),
        ];

        let lowest = meters
            .iter()
            .filter(|(_, fraction)| *fraction < LOW_METER)
            .fold(None, |lowest: Option<(Mood, f64)>, &(mood, fraction)| {
                match lowest {
                    Some((_, current)) if current <= fraction => lowest,
                    _ => Some((mood, fraction)),
                }
            });

        if let Some((mood, _)) = lowest {
            mood
        } else if meters.iter().all(|(_, fraction)| *fraction >= HIGH_METER) {
            Mood::Ecstatic
        } else {
            Mood::Content
        }
    }
}
