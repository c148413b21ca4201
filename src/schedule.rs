/// Reveal timing
use std::time::Duration;

/// Delays of a reveal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Full-speed spinning before the reel starts slowing
    pub spin: Duration,
    /// Slowing before the result is committed
    pub slow: Duration,
    /// Gap between two consecutive item reveals
    pub stagger: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            spin: Duration::from_millis(1500),
            slow: Duration::from_millis(1000),
            stagger: Duration::from_millis(500),
        }
    }
}

/// A scheduled transition of the reveal state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Slow,
    Commit,
    Reveal(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStep {
    /// Offset from the start of the cycle
    pub at: Duration,
    pub step: Step,
}

impl Timing {
    /// Every delay multiplied by `factor`
    ///
    /// A negative or NaN factor gives zero delays. Products too large for a
    /// `Duration` saturate at `Duration::MAX`.
    pub fn scaled(self, factor: f64) -> Self {
        Timing {
            spin: scale(self.spin, factor),
            slow: scale(self.slow, factor),
            stagger: scale(self.stagger, factor),
        }
    }

    /// Offset at which the result becomes visible
    pub fn commit_at(&self) -> Duration {
        self.spin.saturating_add(self.slow)
    }

    /// Offset at which item `index` is revealed
    pub fn reveal_at(&self, index: usize) -> Duration {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.commit_at().saturating_add(self.stagger.saturating_mul(index))
    }

    /// Offset at which the last of `items` is revealed
    pub fn total(&self, items: usize) -> Duration {
        self.reveal_at(items.saturating_sub(1))
    }

    /// Transitions of one cycle in firing order
    pub fn plan(&self, items: usize) -> Vec<ScheduledStep> {
        let mut steps = Vec::with_capacity(items + 2);
        steps.push(ScheduledStep {
            at: self.spin,
            step: Step::Slow,
        });
        steps.push(ScheduledStep {
            at: self.commit_at(),
            step: Step::Commit,
        });
        steps.extend((0..items).map(|index| ScheduledStep {
            at: self.reveal_at(index),
            step: Step::Reveal(index),
        }));
        steps
    }
}

fn scale(duration: Duration, factor: f64) -> Duration {
    if factor.is_nan() || factor <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(duration.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_for_three_items() {
        let plan = Timing::default().plan(3);
        let offsets: Vec<_> = plan.iter().map(|s| (s.at.as_millis(), s.step)).collect();
        assert_eq!(
            offsets,
            [
                (1500, Step::Slow),
                (2500, Step::Commit),
                (2500, Step::Reveal(0)),
                (3000, Step::Reveal(1)),
                (3500, Step::Reveal(2)),
            ]
        );
    }

    #[test]
    fn test_total() {
        let timing = Timing::default();
        assert_eq!(timing.total(1), Duration::from_millis(2500));
        assert_eq!(timing.total(3), Duration::from_millis(3500));
        assert_eq!(timing.total(0), Duration::from_millis(2500));
    }

    #[test]
    fn test_scaled() {
        let timing = Timing::default().scaled(0.5);
        assert_eq!(timing.spin, Duration::from_millis(750));
        assert_eq!(timing.total(2), Duration::from_millis(1500));
    }

    #[test]
    fn test_scaled_out_of_range_factors() {
        for factor in [-1.0, f64::NAN, f64::NEG_INFINITY, 0.0] {
            let timing = Timing::default().scaled(factor);
            assert_eq!(timing.total(3), Duration::ZERO, "factor {}", factor);
        }
        let timing = Timing::default().scaled(f64::INFINITY);
        assert_eq!(timing.spin, Duration::MAX);
        assert_eq!(timing.stagger, Duration::MAX);
        assert_eq!(timing.total(3), Duration::MAX);
    }
}
