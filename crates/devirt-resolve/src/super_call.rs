use devirt_descriptor::{CallKind, MethodSig};
use devirt_hierarchy::ClassId;

use crate::context::{settle, ResolutionContext};
use crate::resolution::{Resolution, UnresolvedReference};
use crate::select;

impl ResolutionContext {
    /// `super.m()` from `caller`: selection starts at the caller's superclass and never dispatches.
    pub(crate) fn resolve_super(&self, caller: ClassId, sig: &MethodSig) -> Resolution {
        let hierarchy = self.hierarchy();
        if hierarchy.class(caller).is_external() {
            return UnresolvedReference::ExternalType(caller).into();
        }
        match hierarchy.superclass_of(caller) {
            Some(parent) => settle(select::select_virtual(hierarchy, parent, sig)),
            None => UnresolvedReference::NotFound.into(),
        }
    }

    /// Whether a `super` call in `caller` could be rewritten as a plain virtual call.
    ///
    /// That holds when virtual dispatch from `caller` can only ever reach the body the `super`
    /// call runs, which in practice means `caller` and all its subclasses inherit that body.
    pub fn can_desuperify(&self, caller: ClassId, sig: &MethodSig) -> bool {
        let Resolution::Method(target) = self.resolve(caller, sig, CallKind::Super) else {
            return false;
        };
        let dispatch = self.dispatch_targets(caller, sig);
        dispatch.single() == Some(target)
    }
}
