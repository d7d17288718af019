//! Covariant return-type specialization over override groups.
//!
//! Every slot's return type is narrowed to the join of what its own body returns and what every
//! overrider returns. A join that has no unique answer pins the slot to its declared type and is
//! reported as a [`SpecializationCollision`]; no other slot is affected.

#![forbid(unsafe_code)]

mod decision;
mod error;
mod graph;
mod plan;
mod solve;

pub use crate::decision::SpecializationDecision;
pub use crate::error::SpecializationCollision;
pub use crate::graph::OverrideGraph;
pub use crate::plan::{SpecializationPlan, Specializer};
