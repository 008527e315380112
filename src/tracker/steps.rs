//! Sources of progress increments for the advancement step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(test)]
use std::collections::VecDeque;

pub trait StepSource: Send {
    /// Next increment in `[0, max_step)`.
    fn next_step(&mut self, max_step: f64) -> f64;
}

pub struct RandomSteps {
    rng: StdRng,
}

impl RandomSteps {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl StepSource for RandomSteps {
    fn next_step(&mut self, max_step: f64) -> f64 {
        if max_step <= 0.0 || !max_step.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(0.0..max_step)
    }
}

/// Always the same increment.
pub struct FixedStep(pub f64);

impl StepSource for FixedStep {
    fn next_step(&mut self, _max_step: f64) -> f64 {
        self.0
    }
}

/// Replays a script, then falls back to a fixed increment.
#[cfg(test)]
pub struct ScriptedSteps {
    script: VecDeque<f64>,
    fallback: f64,
}

#[cfg(test)]
impl ScriptedSteps {
    pub fn new(script: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self { script: script.into_iter().collect(), fallback }
    }
}

#[cfg(test)]
impl StepSource for ScriptedSteps {
    fn next_step(&mut self, _max_step: f64) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_steps_stay_below_max() {
        let mut s = RandomSteps::seeded(7);
        for _ in 0..1000 {
            let v = s.next_step(20.0);
            assert!((0.0..20.0).contains(&v), "step {v} out of range");
        }
    }

    #[test]
    fn random_steps_with_same_seed_repeat() {
        let mut a = RandomSteps::seeded(42);
        let mut b = RandomSteps::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.next_step(20.0), b.next_step(20.0));
        }
    }

    #[test]
    fn degenerate_max_yields_zero() {
        let mut s = RandomSteps::seeded(1);
        assert_eq!(s.next_step(0.0), 0.0);
        assert_eq!(s.next_step(f64::NAN), 0.0);
    }

    #[test]
    fn scripted_steps_fall_back_after_script() {
        let mut s = ScriptedSteps::new([3.0, 4.0], 1.5);
        assert_eq!(s.next_step(20.0), 3.0);
        assert_eq!(s.next_step(20.0), 4.0);
        assert_eq!(s.next_step(20.0), 1.5);
        assert_eq!(s.next_step(20.0), 1.5);
    }
}
