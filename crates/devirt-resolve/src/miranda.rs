//! Resolution through abstract classes and interfaces.
//!
//! A call whose static type is abstract or an interface has no body of its own to run. It still
//! resolves precisely when every concrete type below the static type selects the same body.

use devirt_descriptor::{CallKind, MethodSig};
use devirt_hierarchy::{ClassId, MethodId};

use crate::context::{settle, ResolutionContext};
use crate::resolution::{Resolution, UnresolvedReference};
use crate::select::{self, Selection};

/// The set of bodies a virtual call through some static type can reach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTargets {
    /// Distinct targets in discovery order.
    pub targets: Vec<MethodId>,
    /// False when some concrete subtype could not be resolved, or when the static type itself is
    /// external.
    pub complete: bool,
}

impl DispatchTargets {
    /// The unique target, if the set is complete and has exactly one member.
    pub fn single(&self) -> Option<MethodId> {
        match (self.complete, self.targets.as_slice()) {
            (true, [only]) => Some(*only),
            _ => None,
        }
    }
}

impl ResolutionContext {
    pub(crate) fn resolve_virtual(&self, static_type: ClassId, sig: &MethodSig) -> Resolution {
        let hierarchy = self.hierarchy();
        let selection = select::select_virtual(hierarchy, static_type, sig);
        let node = hierarchy.class(static_type);
        match selection {
            Selection::Abstract(_) | Selection::Missing if !node.is_concrete() => {
                let targets = self.dispatch_targets(static_type, sig);
                if let Some(single) = targets.single() {
                    tracing::trace!(
                        target = "devirt.resolve",
                        static_type = %node.name,
                        method = %hierarchy.display_method(single),
                        "abstract slot has a single implementation"
                    );
                    return Resolution::Method(single);
                }
                settle(selection)
            }
            other => settle(other),
        }
    }

    /// Every body a virtual call through `static_type` may reach at run time.
    pub fn dispatch_targets(&self, static_type: ClassId, sig: &MethodSig) -> DispatchTargets {
        let hierarchy = self.hierarchy();
        if hierarchy.class(static_type).is_external() {
            return DispatchTargets::default();
        }

        let mut out = DispatchTargets {
            targets: Vec::new(),
            complete: true,
        };
        for sub in hierarchy.concrete_subtypes(static_type) {
            match self.resolve(sub, sig, CallKind::Virtual) {
                Resolution::Method(id) => {
                    if !out.targets.contains(&id) {
                        out.targets.push(id);
                    }
                }
                _ => out.complete = false,
            }
        }
        out
    }

    /// Resolves a virtual call for a receiver known to have exactly the type `runtime`.
    pub fn resolve_dispatch(
        &self,
        static_type: ClassId,
        runtime: ClassId,
        sig: &MethodSig,
    ) -> Resolution {
        if !self.hierarchy().is_subtype(runtime, static_type) {
            return UnresolvedReference::NotASubtype {
                runtime,
                static_type,
            }
            .into();
        }
        self.resolve(runtime, sig, CallKind::Virtual)
    }
}
