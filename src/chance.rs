//! Source of randomness for draws
//!
//! Every random decision the engine makes is either a roll in `[0, 1)` or a
//! uniform pick of an index. Any `rand` generator provides both; [`Scripted`]
//! replays fixed decisions so specific outcomes can be forced.

use rand::{Rng, RngCore};
use std::collections::VecDeque;

pub trait Chance {
    /// Uniform value in `[0, 1)`
    fn roll(&mut self) -> f64;

    /// Uniform index in `[0, len)`; `len` is never zero
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: RngCore> Chance for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays queued rolls and picks in order
///
/// Picks are reduced modulo `len`, so a queued index is always in range.
/// Once a queue runs dry, rolls return `0.0` and picks count upward from zero.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    rolls: VecDeque<f64>,
    picks: VecDeque<usize>,
    fallback: usize,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    pub fn push_roll(&mut self, roll: f64) {
        self.rolls.push_back(roll);
    }

    pub fn push_pick(&mut self, pick: usize) {
        self.picks.push_back(pick);
    }
}

impl Chance for Scripted {
    fn roll(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(0.0)
    }

    fn pick(&mut self, len: usize) -> usize {
        let pick = match self.picks.pop_front() {
            Some(pick) => pick,
            None => {
                self.fallback += 1;
                self.fallback - 1
            }
        };
        pick % len
    }
}
