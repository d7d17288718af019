use devirt_hierarchy::{ClassId, MethodId};
use thiserror::Error;

/// Overriders of one slot demand return types with no unique nearest common supertype below the
/// slot's declared type. The slot keeps its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("return types of {slot:?} overriders have no unique join: {candidates:?}")]
pub struct SpecializationCollision {
    pub slot: MethodId,
    /// The minimal common supertypes that tied.
    pub candidates: Vec<ClassId>,
}
