//! Dice - the swappable random number service

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of every random roll made by the engine
pub trait Dice {
    /// Uniform integer in `[min, max]`; returns `min` when the range is empty
    fn rand(&mut self, min: i32, max: i32) -> i32;

    /// Uniform integer in `[1, 100]`
    fn d100(&mut self) -> i32 {
        self.rand(1, 100)
    }

    /// Normally distributed value
    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64;
}

/// Seedable dice backed by ChaCha8
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        SeededDice {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn rand(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // Box-Muller
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * std_dev
    }
}

/// Replays a fixed sequence of results, for exact scenarios.
///
/// Each call to `rand`/`d100` pops the next queued value. Once the queue is
/// empty, rolls return the minimum of the requested range. Empty ranges
/// return `min` without consuming a value.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<i32>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        ScriptedDice {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Queue another result
    pub fn push(&mut self, roll: i32) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn rand(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rolls.pop_front().unwrap_or(min)
    }

    fn gaussian(&mut self, mean: f64, _std_dev: f64) -> f64 {
        mean
    }
}
