use std::collections::HashMap;

use devirt_descriptor::{CallKind, MethodSig};
use devirt_hierarchy::{ClassId, Hierarchy, MethodId};
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::call_site::{CallSite, Receiver};
use crate::resolution::{Resolution, UnresolvedReference};
use crate::select::{self, Selection};

type MemoKey = (ClassId, MethodSig, CallKind);

/// Owns the hierarchy for one analysis run together with the resolution memo table.
///
/// Concurrent readers share the memo; a miss computes without holding the lock, so two threads may
/// race to fill the same entry. Both compute the same value, and the first insert wins.
#[derive(Debug)]
pub struct ResolutionContext {
    hierarchy: Hierarchy,
    memo: RwLock<HashMap<MemoKey, Resolution>>,
}

impl ResolutionContext {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            memo: RwLock::new(HashMap::new()),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn into_hierarchy(self) -> Hierarchy {
        self.hierarchy
    }

    /// Number of memoized `(type, signature, kind)` answers.
    pub fn cached_len(&self) -> usize {
        self.memo.read().len()
    }

    /// Resolves a call written against `static_type`.
    ///
    /// For [`CallKind::Super`], `static_type` is the class containing the call.
    pub fn resolve(&self, static_type: ClassId, sig: &MethodSig, kind: CallKind) -> Resolution {
        let key = (static_type, sig.clone(), kind);
        if let Some(hit) = self.memo.read().get(&key) {
            return hit.clone();
        }

        let computed = self.compute(static_type, sig, kind);
        self.memo.write().entry(key).or_insert(computed).clone()
    }

    fn compute(&self, static_type: ClassId, sig: &MethodSig, kind: CallKind) -> Resolution {
        match kind {
            CallKind::Virtual | CallKind::Interface => self.resolve_virtual(static_type, sig),
            CallKind::Static => {
                settle(select::select_static(&self.hierarchy, static_type, sig))
            }
            CallKind::Direct => settle(select::select_direct(&self.hierarchy, static_type, sig)),
            CallKind::Super => self.resolve_super(static_type, sig),
        }
    }

    /// The declaration a call through `static_type` binds to, with or without a body.
    pub fn bound_declaration(&self, static_type: ClassId, sig: &MethodSig) -> Option<MethodId> {
        select::bound_declaration(&self.hierarchy, static_type, sig)
    }

    pub fn resolve_call_site(&self, site: &CallSite) -> Resolution {
        let resolution = match &site.receiver {
            Receiver::Unknown(name) => UnresolvedReference::UnknownType { name: name.clone() }.into(),
            Receiver::Array(ty) if site.sig.is_clone() => match crate::resolve_array_clone(ty) {
                Ok(result) => Resolution::ArrayClone(result),
                Err(reason) => reason.into(),
            },
            // Every other method on an array is inherited from the root type.
            Receiver::Array(_) => self.resolve(self.hierarchy.root(), &site.sig, site.kind),
            Receiver::Class(owner) => match (site.kind, site.caller) {
                (CallKind::Super, Some(caller)) => self.resolve(caller, &site.sig, CallKind::Super),
                (CallKind::Super, None) => {
                    settle(select::select_virtual(&self.hierarchy, *owner, &site.sig))
                }
                (kind, _) => self.resolve(*owner, &site.sig, kind),
            },
        };

        if let Some(reason) = resolution.unresolved() {
            tracing::trace!(
                target = "devirt.resolve",
                call_site = %site.id,
                %reason,
                "call site left unresolved"
            );
        }
        resolution
    }

    /// Resolves every call site in parallel. Output order matches `sites`.
    pub fn resolve_all(&self, sites: &[CallSite]) -> Vec<Resolution> {
        let resolutions: Vec<Resolution> = sites
            .par_iter()
            .map(|site| self.resolve_call_site(site))
            .collect();

        let resolved = resolutions.iter().filter(|r| r.is_resolved()).count();
        tracing::debug!(
            target = "devirt.resolve",
            call_sites = sites.len(),
            resolved,
            memo_entries = self.cached_len(),
            "resolved call sites"
        );
        resolutions
    }
}

pub(crate) fn settle(selection: Selection) -> Resolution {
    match selection {
        Selection::Body(id) => Resolution::Method(id),
        Selection::Abstract(id) => UnresolvedReference::AbstractSlot {
            declaration: Some(id),
        }
        .into(),
        Selection::External(class) => UnresolvedReference::ExternalType(class).into(),
        Selection::Ambiguous(candidates) => UnresolvedReference::Ambiguous { candidates }.into(),
        Selection::Missing => UnresolvedReference::NotFound.into(),
    }
}
