//! Budget accounting for the search loop
//!
//! A [`BudgetTracker`] is created at the start of every search and asked,
//! between iterations, whether another iteration still fits.

use std::time::{Duration, Instant};

use crate::config::Budget;

/// Tracks how much of a [`Budget`] one search has consumed.
#[derive(Debug, Clone)]
pub struct BudgetTracker {
    budget: Budget,
    break_time: Duration,
    /// Current iteration or forward-model-call limit
    limit: u64,
    deadline: Instant,
    iterations: u64,
    fm_calls: u64,
    iteration_time: Duration,
}

impl BudgetTracker {
    /// Starts tracking `budget` now
    pub fn new(budget: Budget, break_ms: u64) -> Self {
        let limit = match budget {
            Budget::Iterations(n) | Budget::ForwardModelCalls(n) => u64::from(n),
            Budget::TimeMillis(_) => 0,
        };
        let deadline = Instant::now() + budget.as_duration().unwrap_or_default();
        BudgetTracker {
            budget,
            break_time: Duration::from_millis(break_ms),
            limit,
            deadline,
            iterations: 0,
            fm_calls: 0,
            iteration_time: Duration::ZERO,
        }
    }

    /// Records a completed iteration, its duration and the forward model
    /// calls it made.
    ///
    /// An iteration that ends on an already expanded terminal node makes no
    /// calls; it is still charged one so that a solved tree cannot keep a
    /// call budget open forever.
    pub fn record_iteration(&mut self, elapsed: Duration, fm_calls: u64) {
        self.iterations += 1;
        self.fm_calls += fm_calls.max(1);
        self.iteration_time += elapsed;
    }

    /// Average duration of the iterations recorded so far
    pub fn average_iteration_time(&self) -> Duration {
        if self.iterations == 0 {
            return Duration::ZERO;
        }
        let nanos = self.iteration_time.as_nanos() / u128::from(self.iterations);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// True if no further iteration should start.
    ///
    /// A time budget stops once the remaining time is no more than the break
    /// time or twice the average iteration, whichever is larger.
    pub fn exhausted(&self) -> bool {
        match self.budget {
            Budget::Iterations(_) => self.iterations >= self.limit,
            Budget::ForwardModelCalls(_) => self.fm_calls >= self.limit,
            Budget::TimeMillis(_) => {
                let remaining = self.deadline.saturating_duration_since(Instant::now());
                let margin = self.break_time.max(self.average_iteration_time() * 2);
                remaining <= margin
            }
        }
    }

    /// Grants one more full budget increment.
    ///
    /// Count budgets raise their limit by the original amount, a time budget
    /// restarts its clock. Returns false if the budget is empty and topping it
    /// up would change nothing.
    pub fn top_up(&mut self) -> bool {
        match self.budget {
            Budget::Iterations(0) | Budget::ForwardModelCalls(0) | Budget::TimeMillis(0) => false,
            Budget::Iterations(n) | Budget::ForwardModelCalls(n) => {
                self.limit += u64::from(n);
                true
            }
            Budget::TimeMillis(_) => {
                self.deadline = Instant::now() + self.budget.as_duration().unwrap_or_default();
                true
            }
        }
    }

    /// Iterations recorded so far
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Forward model calls charged so far
    pub fn fm_calls(&self) -> u64 {
        self.fm_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_budget_counts_iterations() {
        let mut tracker = BudgetTracker::new(Budget::Iterations(2), 0);
        assert!(!tracker.exhausted());
        tracker.record_iteration(Duration::from_micros(5), 3);
        assert!(!tracker.exhausted());
        tracker.record_iteration(Duration::from_micros(5), 3);
        assert!(tracker.exhausted());

        assert!(tracker.top_up());
        assert!(!tracker.exhausted());
    }

    #[test]
    fn forward_model_budget_counts_calls() {
        let mut tracker = BudgetTracker::new(Budget::ForwardModelCalls(5), 0);
        tracker.record_iteration(Duration::ZERO, 4);
        assert!(!tracker.exhausted());
        tracker.record_iteration(Duration::ZERO, 1);
        assert!(tracker.exhausted());
        assert_eq!(tracker.iterations(), 2);
    }

    #[test]
    fn call_free_iterations_are_still_charged() {
        let mut tracker = BudgetTracker::new(Budget::ForwardModelCalls(3), 0);
        for _ in 0..3 {
            tracker.record_iteration(Duration::ZERO, 0);
        }
        assert!(tracker.exhausted());
        assert_eq!(tracker.fm_calls(), 3);
    }

    #[test]
    fn time_budget_respects_break_time() {
        let tracker = BudgetTracker::new(Budget::TimeMillis(5), 50);
        assert!(tracker.exhausted());

        let tracker = BudgetTracker::new(Budget::TimeMillis(60_000), 10);
        assert!(!tracker.exhausted());
    }

    #[test]
    fn time_budget_reserves_twice_the_average_iteration() {
        let mut tracker = BudgetTracker::new(Budget::TimeMillis(60_000), 0);
        tracker.record_iteration(Duration::from_secs(40), 0);
        assert_eq!(tracker.average_iteration_time(), Duration::from_secs(40));
        assert!(tracker.exhausted());
    }

    #[test]
    fn empty_budget_cannot_be_topped_up() {
        let mut tracker = BudgetTracker::new(Budget::Iterations(0), 0);
        assert!(tracker.exhausted());
        assert!(!tracker.top_up());
        assert!(tracker.exhausted());
    }
}
