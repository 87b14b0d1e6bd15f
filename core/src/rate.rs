//! Rate controller: step ladder and direction commands
//!
//! Small magnitudes change slowly, large ones quickly. The profile picks one
//! ladder (continuous multiplier or discrete frequency); the two are never
//! mixed within a session.

use crate::profile::{LadderRung, PlaybackProfile, RateModel};
use crate::state::{Direction, PlaybackState, Rate};

/// Decade rungs for the discrete jump commands
const JUMP_RUNGS: [f64; 7] = [10.0, 60.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

/// Multiplier-model jump applies this many ladder steps
const MULTIPLIER_JUMP_STEPS: usize = 10;

/// Applies rate commands according to a profile's rate model
#[derive(Debug, Clone, PartialEq)]
pub struct RateController {
    baseline: f64,
    ladder: Vec<LadderRung>,
    top_step: f64,
    max_magnitude: Option<f64>,
    discrete: bool,
}

impl RateController {
    pub fn new(profile: &PlaybackProfile) -> Self {
        Self {
            baseline: profile.baseline,
            ladder: profile.ladder.clone(),
            top_step: profile.top_step,
            max_magnitude: profile.max_magnitude(),
            discrete: matches!(profile.rate_model, RateModel::Frequency { .. }),
        }
    }

    /// The profile's baseline unit
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Increment for one increase/decrease at this magnitude
    pub fn step(&self, magnitude: f64) -> f64 {
        let magnitude = magnitude.abs();
        self.ladder
            .iter()
            .find(|rung| magnitude < rung.below)
            .map(|rung| rung.step)
            .unwrap_or(self.top_step)
    }

    pub fn increase(&self, state: &mut PlaybackState) {
        let current = state.rate.signed();
        let mut next = current + self.step(current);
        // Discrete model never lands on zero when climbing out of reverse
        if self.discrete && current < 0.0 && next >= 0.0 {
            next = 1.0;
        }
        self.store(state, next);
    }

    pub fn decrease(&self, state: &mut PlaybackState) {
        let current = state.rate.signed();
        let mut next = current - self.step(current);
        if self.discrete && current > 0.0 && next <= 0.0 {
            next = -1.0;
        }
        self.store(state, next);
    }

    /// Negate the rate; never leaves it at zero
    pub fn reverse_direction(&self, state: &mut PlaybackState) {
        if state.rate.is_zero() {
            state.rate = Rate::reverse(self.baseline);
        } else {
            state.rate.flip();
        }
    }

    /// `+baseline`
    pub fn reset_to_default(&self, state: &mut PlaybackState) {
        state.rate = Rate::forward(self.baseline);
    }

    /// `|rate|`, or `+baseline` when zero
    pub fn force_positive(&self, state: &mut PlaybackState) {
        let magnitude = self.nonzero_or_baseline(state.rate.magnitude);
        state.rate = Rate::forward(magnitude);
    }

    /// `-|rate|`, or `-baseline` when zero
    pub fn force_negative(&self, state: &mut PlaybackState) {
        let magnitude = self.nonzero_or_baseline(state.rate.magnitude);
        state.rate = Rate::reverse(magnitude);
    }

    /// Zero magnitude, direction kept
    pub fn freeze(&self, state: &mut PlaybackState) {
        state.rate.magnitude = 0.0;
    }

    /// Coarse increase: next decade rung (discrete) or ten steps
    pub fn jump_up(&self, state: &mut PlaybackState) {
        if !self.discrete {
            for _ in 0..MULTIPLIER_JUMP_STEPS {
                self.increase(state);
            }
            return;
        }
        let magnitude = state.rate.magnitude;
        let target = JUMP_RUNGS
            .iter()
            .copied()
            .find(|&rung| magnitude < rung)
            .unwrap_or(JUMP_RUNGS[JUMP_RUNGS.len() - 1]);
        state.rate.magnitude = self.clamp(target);
    }

    /// Coarse decrease: previous decade rung (discrete) or ten steps
    pub fn jump_down(&self, state: &mut PlaybackState) {
        if !self.discrete {
            for _ in 0..MULTIPLIER_JUMP_STEPS {
                self.decrease(state);
            }
            return;
        }
        let magnitude = state.rate.magnitude;
        let target = JUMP_RUNGS[..JUMP_RUNGS.len() - 1]
            .iter()
            .rev()
            .copied()
            .find(|&rung| magnitude > rung)
            .unwrap_or(1.0);
        state.rate.magnitude = self.clamp(target);
    }

    fn nonzero_or_baseline(&self, magnitude: f64) -> f64 {
        if magnitude == 0.0 { self.baseline } else { magnitude }
    }

    fn clamp(&self, magnitude: f64) -> f64 {
        match self.max_magnitude {
            Some(max) => magnitude.min(max),
            None => magnitude,
        }
    }

    fn store(&self, state: &mut PlaybackState, signed: f64) {
        let signed = if self.discrete { signed.round() } else { signed };
        let fallback: Direction = state.rate.direction;
        let mut rate = Rate::from_signed(signed, fallback);
        rate.magnitude = self.clamp(rate.magnitude);
        state.rate = rate;
    }
}
