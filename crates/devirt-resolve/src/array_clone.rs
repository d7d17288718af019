use devirt_descriptor::FieldType;

use crate::resolution::UnresolvedReference;

/// Result type of `clone()` on `receiver`.
///
/// Cloning an array yields an array of exactly the receiver's type, never the root type.
pub fn resolve_array_clone(receiver: &FieldType) -> Result<FieldType, UnresolvedReference> {
    if receiver.is_array() {
        Ok(receiver.clone())
    } else {
        Err(UnresolvedReference::NotAnArray)
    }
}
