//! Resolution of call sites against a built [`Hierarchy`].
//!
//! All queries go through a per-run [`ResolutionContext`] which owns the hierarchy and the memo
//! table. Every query is a pure function of the hierarchy and its inputs, so the context can be
//! shared across threads and results can be cached or recomputed interchangeably.
//!
//! Failures never abort: a query that cannot be answered precisely returns
//! [`Resolution::Unresolved`] and the caller leaves that call site alone.

#![forbid(unsafe_code)]

mod array_clone;
mod call_site;
mod context;
mod field;
mod miranda;
mod resolution;
mod select;
mod super_call;

pub use crate::array_clone::resolve_array_clone;
pub use crate::call_site::{CallSite, Receiver};
pub use crate::context::ResolutionContext;
pub use crate::field::{FieldResolution, FieldSearch};
pub use crate::miranda::DispatchTargets;
pub use crate::resolution::{Resolution, UnresolvedReference};

pub use devirt_descriptor::CallKind;
pub use devirt_hierarchy::Hierarchy;
