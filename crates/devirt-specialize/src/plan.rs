use std::collections::HashMap;

use devirt_descriptor::{CallKind, FieldType, ReturnType};
use devirt_hierarchy::MethodId;
use devirt_resolve::{CallSite, Receiver, ResolutionContext};
use rayon::prelude::*;

use crate::decision::SpecializationDecision;
use crate::graph::OverrideGraph;
use crate::solve::solve_group;

/// Runs return-type specialization over a whole program.
#[derive(Debug, Clone)]
pub struct Specializer {
    enabled: bool,
}

impl Default for Specializer {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Specializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A disabled specializer leaves every slot [`SpecializationDecision::Unchanged`].
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn run(&self, ctx: &ResolutionContext, call_sites: &[CallSite]) -> SpecializationPlan {
        let hierarchy = ctx.hierarchy();
        let mut decisions: Vec<(MethodId, SpecializationDecision)> = hierarchy
            .methods()
            .map(|(id, _)| (id, SpecializationDecision::Unchanged))
            .collect();

        if self.enabled {
            let graph = OverrideGraph::build(ctx);
            let groups = graph.groups();
            // Each group writes only its own slots.
            let solved: Vec<Vec<(MethodId, SpecializationDecision)>> = groups
                .par_iter()
                .map(|group| solve_group(hierarchy, &graph, group))
                .collect();
            for (slot, decision) in solved.into_iter().flatten() {
                decisions[slot.index()].1 = decision;
            }
            tracing::debug!(
                target = "devirt.specialize",
                groups = groups.len(),
                "solved override groups"
            );
        }

        let returns: Vec<ReturnType> = hierarchy
            .methods()
            .map(|(id, slot)| match &decisions[id.index()].1 {
                SpecializationDecision::Specialized(ty) => {
                    ReturnType::Type(FieldType::object(hierarchy.name(*ty)))
                }
                _ => slot.return_type.clone(),
            })
            .collect();

        let mut licensed: HashMap<MethodId, Vec<String>> = HashMap::new();
        for site in call_sites {
            let Some(slot) = bound_slot(ctx, site) else {
                continue;
            };
            if decisions[slot.index()].1.specialized().is_some() {
                licensed.entry(slot).or_default().push(site.id.clone());
            }
        }

        let plan = SpecializationPlan {
            decisions,
            returns,
            licensed,
        };
        tracing::info!(
            target = "devirt.specialize",
            specialized = plan.specialized_count(),
            conflicts = plan.conflicts().count(),
            licensed_call_sites = plan.licensed.values().map(Vec::len).sum::<usize>(),
            "return type specialization finished"
        );
        plan
    }
}

/// The slot whose declared return type a call site observes.
fn bound_slot(ctx: &ResolutionContext, site: &CallSite) -> Option<MethodId> {
    let Receiver::Class(owner) = site.receiver else {
        return None;
    };
    match site.kind {
        CallKind::Virtual | CallKind::Interface => ctx.bound_declaration(owner, &site.sig),
        CallKind::Static | CallKind::Direct | CallKind::Super => {
            ctx.resolve_call_site(site).method()
        }
    }
}

/// Per-slot outcome of one specialization run.
#[derive(Debug, Clone)]
pub struct SpecializationPlan {
    /// Indexed by method id.
    decisions: Vec<(MethodId, SpecializationDecision)>,
    returns: Vec<ReturnType>,
    licensed: HashMap<MethodId, Vec<String>>,
}

impl SpecializationPlan {
    pub fn specialize(&self, slot: MethodId) -> &SpecializationDecision {
        &self.decisions[slot.index()].1
    }

    /// Return type the slot ends up declared with: the narrowed class, or the original type.
    pub fn effective_return(&self, slot: MethodId) -> &ReturnType {
        &self.returns[slot.index()]
    }

    /// Ids of the call sites that observe this slot's narrowed return type.
    pub fn licensed_call_sites(&self, slot: MethodId) -> &[String] {
        self.licensed.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn decisions(&self) -> impl Iterator<Item = (MethodId, &SpecializationDecision)> + '_ {
        self.decisions.iter().map(|(slot, decision)| (*slot, decision))
    }

    pub fn conflicts(&self) -> impl Iterator<Item = (MethodId, &SpecializationDecision)> + '_ {
        self.decisions().filter(|(_, d)| d.is_conflict())
    }

    pub fn specialized_count(&self) -> usize {
        self.decisions
            .iter()
            .filter(|(_, d)| d.specialized().is_some())
            .count()
    }
}
