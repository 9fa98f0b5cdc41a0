//! Reviewer assignment engine
//!
//! Selection is split from persistence: [`ReviewerPicker`] samples ids from
//! a candidate pool, [`eligibility`] builds the pool, and
//! [`AssignmentEngine`] validates state and commits through the PR store.

pub mod eligibility;
pub mod engine;
pub mod picker;

pub use eligibility::{candidate_pool, Exclusions};
pub use engine::{AssignmentEngine, Reassignment, MAX_REVIEWERS};
pub use picker::ReviewerPicker;
