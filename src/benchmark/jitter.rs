//! Random variance applied to simulated inference latency

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Maximum relative deviation from the base latency (±10%)
pub const JITTER_RANGE: f64 = 0.1;

/// Source of the relative latency variance.
///
/// Implementations return a value in `[-JITTER_RANGE, JITTER_RANGE]`.
pub trait JitterSource: Send + Sync {
    fn variance(&self) -> f64;
}

/// Thread-local RNG; the default for a running server
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn variance(&self) -> f64 {
        rand::thread_rng().gen_range(-JITTER_RANGE..=JITTER_RANGE)
    }
}

/// Reproducible sequence from a fixed seed
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn variance(&self) -> f64 {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(-JITTER_RANGE..=JITTER_RANGE)
    }
}

/// Constant variance, clamped into range
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(f64);

impl FixedJitter {
    pub fn new(variance: f64) -> Self {
        Self(variance.clamp(-JITTER_RANGE, JITTER_RANGE))
    }

    pub fn none() -> Self {
        Self(0.0)
    }
}

impl JitterSource for FixedJitter {
    fn variance(&self) -> f64 {
        self.0
    }
}
