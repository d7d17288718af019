//! Method selection: which declaration a receiver of a given type finds for a signature.

use devirt_descriptor::MethodSig;
use devirt_hierarchy::{ClassId, DispatchKind, Hierarchy, MethodId, MethodSlot};

/// Result of selecting a method as if the runtime receiver were exactly `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    Body(MethodId),
    /// The nearest applicable declaration has no body.
    Abstract(MethodId),
    /// Walked into a type whose members are unknown.
    External(ClassId),
    /// Several maximally specific defaults, nearest first.
    Ambiguous(Vec<MethodId>),
    Missing,
}

/// Selects the instance method a receiver of runtime type `start` would run.
///
/// The superclass chain wins over interfaces; an abstract redeclaration on the chain stops the
/// walk. Failing that, the maximally specific interface declarations decide: exactly one default
/// selects it, several unrelated defaults are ambiguous.
pub(crate) fn select_virtual(hierarchy: &Hierarchy, start: ClassId, sig: &MethodSig) -> Selection {
    let root = hierarchy.root();
    for class in hierarchy.superclass_chain(start) {
        if class != root && hierarchy.class(class).is_external() {
            return Selection::External(class);
        }
        if let Some(id) = hierarchy.declared_method(class, sig, MethodSlot::is_overridable) {
            return if hierarchy.method(id).has_body {
                Selection::Body(id)
            } else {
                Selection::Abstract(id)
            };
        }
    }

    let distances = hierarchy.interface_distances(start);
    if let Some((external, _)) = distances
        .iter()
        .find(|(iface, _)| hierarchy.class(*iface).is_external())
    {
        return Selection::External(*external);
    }

    let candidates: Vec<MethodId> = distances
        .iter()
        .filter_map(|(iface, _)| hierarchy.declared_method(*iface, sig, MethodSlot::is_overridable))
        .collect();
    let maximal: Vec<MethodId> = candidates
        .iter()
        .copied()
        .filter(|candidate| {
            let owner = hierarchy.method(*candidate).owner;
            !candidates.iter().any(|other| {
                let other_owner = hierarchy.method(*other).owner;
                other_owner != owner && hierarchy.is_subtype(other_owner, owner)
            })
        })
        .collect();

    let defaults: Vec<MethodId> = maximal
        .iter()
        .copied()
        .filter(|id| hierarchy.method(*id).has_body)
        .collect();
    match defaults.as_slice() {
        [single] => Selection::Body(*single),
        [_, _, ..] => Selection::Ambiguous(defaults),
        [] => match maximal.first() {
            Some(first) => Selection::Abstract(*first),
            None if hierarchy.class(root).is_external() => Selection::External(root),
            None => Selection::Missing,
        },
    }
}

/// Static methods are found on the class itself or inherited along the superclass chain.
pub(crate) fn select_static(hierarchy: &Hierarchy, start: ClassId, sig: &MethodSig) -> Selection {
    let root = hierarchy.root();
    for class in hierarchy.superclass_chain(start) {
        if class != root && hierarchy.class(class).is_external() {
            return Selection::External(class);
        }
        if let Some(id) =
            hierarchy.declared_method(class, sig, |m| m.kind == DispatchKind::Static)
        {
            return Selection::Body(id);
        }
    }
    if hierarchy.class(root).is_external() {
        Selection::External(root)
    } else {
        Selection::Missing
    }
}

/// Private methods and constructors bind to the exact class named at the call site.
pub(crate) fn select_direct(hierarchy: &Hierarchy, class: ClassId, sig: &MethodSig) -> Selection {
    if hierarchy.class(class).is_external() {
        return Selection::External(class);
    }
    let found = hierarchy
        .declared_method(class, sig, |m| m.kind == DispatchKind::Private)
        .or_else(|| hierarchy.declared_method(class, sig, |m| m.kind != DispatchKind::Static));
    match found {
        Some(id) if hierarchy.method(id).has_body => Selection::Body(id),
        Some(id) => Selection::Abstract(id),
        None => Selection::Missing,
    }
}

/// The declaration a call through `static_type` is written against, whether or not it has a body.
pub(crate) fn bound_declaration(
    hierarchy: &Hierarchy,
    static_type: ClassId,
    sig: &MethodSig,
) -> Option<MethodId> {
    hierarchy
        .superclass_chain(static_type)
        .find_map(|class| hierarchy.declared_method(class, sig, MethodSlot::is_overridable))
        .or_else(|| {
            hierarchy
                .interface_distances(static_type)
                .into_iter()
                .find_map(|(iface, _)| {
                    hierarchy.declared_method(iface, sig, MethodSlot::is_overridable)
                })
        })
}
