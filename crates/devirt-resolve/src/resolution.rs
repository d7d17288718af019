use devirt_descriptor::FieldType;
use devirt_hierarchy::{ClassId, MethodId};
use thiserror::Error;

/// Outcome of resolving one call. Immutable and cheap to clone, so it is safe to cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The concrete body that runs.
    Method(MethodId),
    /// `clone()` on an array; the result has exactly the receiver's array type.
    ArrayClone(FieldType),
    Unresolved(UnresolvedReference),
}

impl Resolution {
    pub fn method(&self) -> Option<MethodId> {
        match self {
            Resolution::Method(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved(_))
    }

    pub fn unresolved(&self) -> Option<&UnresolvedReference> {
        match self {
            Resolution::Unresolved(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<UnresolvedReference> for Resolution {
    fn from(reason: UnresolvedReference) -> Self {
        Resolution::Unresolved(reason)
    }
}

/// Why a query could not be answered. Non-fatal: the affected call site is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvedReference {
    #[error("type {0:?} is outside the analyzed program")]
    ExternalType(ClassId),
    #[error("type {name} is not known to the hierarchy")]
    UnknownType { name: String },
    #[error("several equally specific interface defaults apply: {candidates:?}")]
    Ambiguous { candidates: Vec<MethodId> },
    #[error("no body applies to the abstract slot {declaration:?}")]
    AbstractSlot { declaration: Option<MethodId> },
    #[error("no matching method")]
    NotFound,
    #[error("{runtime:?} is not a subtype of {static_type:?}")]
    NotASubtype {
        runtime: ClassId,
        static_type: ClassId,
    },
    #[error("receiver is not an array")]
    NotAnArray,
}
