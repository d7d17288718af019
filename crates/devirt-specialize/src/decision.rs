use devirt_hierarchy::ClassId;

use crate::error::SpecializationCollision;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecializationDecision {
    /// The slot may be declared to return this narrower class.
    Specialized(ClassId),
    Unchanged,
    /// Narrowing was attempted and backed off to the declared type.
    Conflict(SpecializationCollision),
}

impl SpecializationDecision {
    pub fn specialized(&self) -> Option<ClassId> {
        match self {
            SpecializationDecision::Specialized(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SpecializationDecision::Conflict(_))
    }
}
