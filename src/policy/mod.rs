//! Policies for the phases of the search
//!
//! This module contains the building blocks of one iteration:
//! - Selection policies: which expanded child to descend into
//! - Expansion policies: which unexpanded action to try next
//! - Simulation: how to play out a rollout from a new node
//! - Backpropagation policies: how to update node statistics

pub mod backpropagation;
pub mod expansion;
pub mod selection;
pub mod simulation;

pub use backpropagation::{BackpropagationPolicy, StandardPolicy};
pub use expansion::{ExpansionPolicy, HighestScoreExpansion};
pub use selection::{AdversarialUcbPolicy, SelectionPolicy};
pub use simulation::{Rollout, WeightedRolloutPolicy};
