//! Reveal state machine
//!
//! `Idle → Spinning → Slowing → Revealed(∅) → Revealed({0}) → … → Revealed({0..N-1})`.
//!
//! Transitions after `Spinning` are driven by timers. Each cycle has an id and
//! every timed transition names the cycle it was scheduled for, so a
//! transition for a superseded cycle is ignored.

use crate::prompt::GenerationResult;
use crate::schedule::Step;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a reveal cycle; increases with every generation and reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cycle(pub u64);

impl Cycle {
    fn next(self) -> Self {
        Cycle(self.0 + 1)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    #[default]
    Idle,
    Spinning,
    Slowing,
    /// Result committed; holds the indices revealed so far
    Revealed(BTreeSet<usize>),
}

impl RevealState {
    /// Spinning or slowing; no generation or reset is accepted
    pub fn is_busy(&self) -> bool {
        matches!(self, RevealState::Spinning | RevealState::Slowing)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reveal {
    cycle: Cycle,
    state: RevealState,
    pending: GenerationResult,
    result: GenerationResult,
}

impl Reveal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// The committed result; empty until the cycle reaches `Revealed`
    pub fn result(&self) -> &GenerationResult {
        &self.result
    }

    pub fn revealed(&self) -> Vec<usize> {
        match &self.state {
            RevealState::Revealed(indices) => indices.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Every item of the committed result has been revealed
    pub fn is_complete(&self) -> bool {
        match &self.state {
            RevealState::Revealed(indices) => indices.len() == self.result.len(),
            _ => false,
        }
    }

    /// Start a new cycle that will reveal `result`
    ///
    /// Returns `None` while a cycle is spinning or slowing.
    pub fn begin(&mut self, result: GenerationResult) -> Option<Cycle> {
        if self.is_busy() {
            return None;
        }
        self.cycle = self.cycle.next();
        self.state = RevealState::Spinning;
        self.result.clear();
        self.pending = result;
        Some(self.cycle)
    }

    /// Apply a timed step scheduled for `cycle`
    ///
    /// Returns `false` when the step is stale or does not fit the current state.
    pub fn apply(&mut self, cycle: Cycle, step: Step) -> bool {
        if cycle != self.cycle {
            return false;
        }
        match step {
            Step::Slow if self.state == RevealState::Spinning => {
                self.state = RevealState::Slowing;
                true
            }
            Step::Commit if self.state == RevealState::Slowing => {
                self.result = std::mem::take(&mut self.pending);
                self.state = RevealState::Revealed(BTreeSet::new());
                true
            }
            Step::Reveal(index) => {
                let len = self.result.len();
                match &mut self.state {
                    // Items are revealed strictly in result order
                    RevealState::Revealed(indices) if index == indices.len() && index < len => {
                        indices.insert(index);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Return to `Idle`, dropping the result
    ///
    /// Refused (returns `false`) while spinning or slowing. The cycle id still
    /// advances so timers of the dropped cycle no longer apply.
    pub fn reset(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.cycle = self.cycle.next();
        self.state = RevealState::Idle;
        self.pending.clear();
        self.result.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptItem;

    fn two_items() -> GenerationResult {
        vec![PromptItem::named("A", "a1"), PromptItem::special("s1")]
    }

    #[test]
    fn test_full_cycle() {
        let mut reveal = Reveal::new();
        let cycle = reveal.begin(two_items()).unwrap();
        assert_eq!(reveal.state(), &RevealState::Spinning);
        assert!(reveal.result().is_empty());

        assert!(reveal.apply(cycle, Step::Slow));
        assert_eq!(reveal.state(), &RevealState::Slowing);
        assert!(reveal.result().is_empty());

        assert!(reveal.apply(cycle, Step::Commit));
        assert_eq!(reveal.result().len(), 2);
        assert!(reveal.revealed().is_empty());
        assert!(!reveal.is_complete());

        assert!(reveal.apply(cycle, Step::Reveal(0)));
        assert!(reveal.apply(cycle, Step::Reveal(1)));
        assert_eq!(reveal.revealed(), [0, 1]);
        assert!(reveal.is_complete());
    }

    #[test]
    fn test_busy_refuses_begin_and_reset() {
        let mut reveal = Reveal::new();
        let cycle = reveal.begin(two_items()).unwrap();
        assert!(reveal.begin(two_items()).is_none());
        assert!(!reveal.reset());

        reveal.apply(cycle, Step::Slow);
        assert!(reveal.begin(two_items()).is_none());
        assert!(!reveal.reset());
        assert_eq!(reveal.cycle(), cycle);
    }

    #[test]
    fn test_stale_steps_ignored() {
        let mut reveal = Reveal::new();
        let old = reveal.begin(two_items()).unwrap();
        reveal.apply(old, Step::Slow);
        reveal.apply(old, Step::Commit);

        let new = reveal.begin(vec![PromptItem::special("s2")]).unwrap();
        assert!(new > old);
        assert!(!reveal.apply(old, Step::Slow));
        assert!(!reveal.apply(old, Step::Reveal(0)));
        assert_eq!(reveal.state(), &RevealState::Spinning);
    }

    #[test]
    fn test_out_of_order_reveal_ignored() {
        let mut reveal = Reveal::new();
        let cycle = reveal.begin(two_items()).unwrap();
        assert!(!reveal.apply(cycle, Step::Commit));
        reveal.apply(cycle, Step::Slow);
        reveal.apply(cycle, Step::Commit);
        assert!(!reveal.apply(cycle, Step::Reveal(1)));
        assert!(reveal.apply(cycle, Step::Reveal(0)));
        assert!(!reveal.apply(cycle, Step::Reveal(0)));
        assert!(!reveal.apply(cycle, Step::Reveal(2)));
    }

    #[test]
    fn test_reset_after_reveal() {
        let mut reveal = Reveal::new();
        let cycle = reveal.begin(two_items()).unwrap();
        reveal.apply(cycle, Step::Slow);
        reveal.apply(cycle, Step::Commit);
        reveal.apply(cycle, Step::Reveal(0));

        assert!(reveal.reset());
        assert_eq!(reveal.state(), &RevealState::Idle);
        assert!(reveal.result().is_empty());
        assert!(!reveal.apply(cycle, Step::Reveal(1)));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&RevealState::Spinning).unwrap();
        assert_eq!(json, r#""spinning""#);
        let json = serde_json::to_string(&RevealState::Revealed([0, 1].into())).unwrap();
        assert_eq!(json, r#"{"revealed":[0,1]}"#);
    }
}
