//! Immutable class/interface graph for whole-program dispatch analysis.
//!
//! The graph is built once from the loader's [`ClassDescriptor`]s and is read-only afterwards.
//! Superclass edges form a tree rooted at the universal base type; interface edges form a DAG.
//! Names that are referenced but never defined become [`ClassKind::External`] nodes so that
//! queries degrade conservatively instead of failing.
//!
//! [`ClassDescriptor`]: devirt_descriptor::ClassDescriptor

#![forbid(unsafe_code)]

mod builder;
mod error;
mod graph;
mod iter;
mod lub;

pub use crate::builder::HierarchyBuilder;
pub use crate::error::HierarchyError;
pub use crate::graph::{
    ClassId, ClassKind, ClassNode, DispatchKind, FieldId, FieldSlot, Hierarchy, MethodId,
    MethodSlot,
};
pub use crate::iter::{Ancestors, SuperclassChain, Subtypes};
