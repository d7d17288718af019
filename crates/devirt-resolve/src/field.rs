use devirt_hierarchy::{ClassId, FieldId, Hierarchy};

use crate::context::ResolutionContext;
use crate::resolution::UnresolvedReference;

/// Which fields a lookup may match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSearch {
    Instance,
    Static,
    Any,
}

impl FieldSearch {
    fn accepts(self, is_static: bool) -> bool {
        match self {
            FieldSearch::Instance => !is_static,
            FieldSearch::Static => is_static,
            FieldSearch::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolution {
    Field(FieldId),
    Unresolved(UnresolvedReference),
}

impl FieldResolution {
    pub fn field(&self) -> Option<FieldId> {
        match self {
            FieldResolution::Field(id) => Some(*id),
            FieldResolution::Unresolved(_) => None,
        }
    }
}

impl ResolutionContext {
    /// Finds the field a reference `owner.name` denotes.
    ///
    /// Lookup order is the class itself, then its direct superinterfaces (recursively), then its
    /// superclass. Instance fields are never found through interfaces.
    pub fn resolve_field(&self, owner: ClassId, name: &str, search: FieldSearch) -> FieldResolution {
        match lookup_field(self.hierarchy(), owner, name, search) {
            Ok(Some(id)) => FieldResolution::Field(id),
            Ok(None) => FieldResolution::Unresolved(UnresolvedReference::NotFound),
            Err(external) => {
                FieldResolution::Unresolved(UnresolvedReference::ExternalType(external))
            }
        }
    }
}

fn lookup_field(
    hierarchy: &Hierarchy,
    class: ClassId,
    name: &str,
    search: FieldSearch,
) -> Result<Option<FieldId>, ClassId> {
    let node = hierarchy.class(class);
    if node.is_external() {
        // Nothing more is known above the synthetic root.
        return if class == hierarchy.root() {
            Ok(None)
        } else {
            Err(class)
        };
    }

    if let Some(id) = node.fields().iter().copied().find(|id| {
        let slot = hierarchy.field(*id);
        slot.name == name && search.accepts(slot.is_static)
    }) {
        return Ok(Some(id));
    }

    if search != FieldSearch::Instance {
        for iface in hierarchy.direct_interfaces_of(class) {
            if let Some(id) = lookup_field(hierarchy, *iface, name, search)? {
                return Ok(Some(id));
            }
        }
    }

    match hierarchy.superclass_of(class) {
        Some(parent) => lookup_field(hierarchy, parent, name, search),
        None => Ok(None),
    }
}
