use std::collections::VecDeque;

use devirt_descriptor::CallKind;
use devirt_hierarchy::{ClassId, Hierarchy, MethodId, MethodSlot};
use devirt_resolve::ResolutionContext;
use rayon::prelude::*;

/// Which slots override which, across the whole program.
///
/// An edge `d -> m` means a call bound to `d` may run `m`. Edges come from two sources: a
/// declaration in a proper supertype with the same signature, and an interface declaration whose
/// implementing class inherits its body from a superclass outside that interface.
#[derive(Debug, Clone)]
pub struct OverrideGraph {
    slots: Vec<MethodId>,
    overriders: Vec<Vec<MethodId>>,
    overridden: Vec<Vec<MethodId>>,
    /// Interface declarations with a concrete implementor whose body could not be resolved.
    unknown_implementors: Vec<bool>,
}

/// Edges contributed by one class.
#[derive(Default)]
struct ClassEdges {
    edges: Vec<(MethodId, MethodId)>,
    unknown_implementors: Vec<MethodId>,
}

impl OverrideGraph {
    pub fn build(ctx: &ResolutionContext) -> Self {
        let hierarchy = ctx.hierarchy();
        let per_class: Vec<ClassEdges> = hierarchy
            .classes()
            .map(|(id, _)| id)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|class| {
                let mut out = implementation_edges(ctx, class);
                out.edges.extend(supertype_edges(hierarchy, class));
                out
            })
            .collect();

        let mut graph = Self {
            slots: hierarchy.methods().map(|(id, _)| id).collect(),
            overriders: vec![Vec::new(); hierarchy.method_count()],
            overridden: vec![Vec::new(); hierarchy.method_count()],
            unknown_implementors: vec![false; hierarchy.method_count()],
        };
        for class in per_class {
            for (declaration, overrider) in class.edges {
                let down = &mut graph.overriders[declaration.index()];
                if !down.contains(&overrider) {
                    down.push(overrider);
                    graph.overridden[overrider.index()].push(declaration);
                }
            }
            for declaration in class.unknown_implementors {
                graph.unknown_implementors[declaration.index()] = true;
            }
        }
        graph
    }

    /// Slots a call bound to `slot` may dispatch to, excluding `slot` itself.
    pub fn overriders(&self, slot: MethodId) -> &[MethodId] {
        &self.overriders[slot.index()]
    }

    pub fn overridden(&self, slot: MethodId) -> &[MethodId] {
        &self.overridden[slot.index()]
    }

    /// Whether some concrete class implementing the slot's interface runs a body the program
    /// cannot see, such as one inherited from an external superclass.
    pub fn has_unknown_implementors(&self, slot: MethodId) -> bool {
        self.unknown_implementors[slot.index()]
    }

    /// Connected components of the graph, each sorted by id.
    ///
    /// The first member of a group is its writer of record. Groups come out ordered by that member.
    pub fn groups(&self) -> Vec<Vec<MethodId>> {
        let count = self.overriders.len();
        let mut seen = vec![false; count];
        let mut groups = Vec::new();

        for start in 0..count {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut group = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                group.push(self.slots[current]);
                let neighbours = self.overriders[current]
                    .iter()
                    .chain(self.overridden[current].iter());
                for next in neighbours {
                    if !seen[next.index()] {
                        seen[next.index()] = true;
                        queue.push_back(next.index());
                    }
                }
            }
            group.sort();
            groups.push(group);
        }
        groups
    }
}

fn supertype_edges(hierarchy: &Hierarchy, class: ClassId) -> Vec<(MethodId, MethodId)> {
    let mut out = Vec::new();
    for &method in hierarchy.class(class).methods() {
        let slot = hierarchy.method(method);
        if !slot.is_overridable() {
            continue;
        }
        for ancestor in hierarchy.ancestors(class) {
            if let Some(declaration) =
                hierarchy.declared_method(ancestor, &slot.sig, MethodSlot::is_overridable)
            {
                out.push((declaration, method));
            }
        }
    }
    out
}

fn implementation_edges(ctx: &ResolutionContext, class: ClassId) -> ClassEdges {
    let hierarchy = ctx.hierarchy();
    let node = hierarchy.class(class);
    let mut out = ClassEdges::default();
    if node.is_interface() || node.is_external() {
        return out;
    }

    for iface in hierarchy.ancestors(class) {
        if !hierarchy.class(iface).is_interface() {
            continue;
        }
        for &declaration in hierarchy.class(iface).methods() {
            let slot = hierarchy.method(declaration);
            if !slot.is_overridable() {
                continue;
            }
            let Some(body) = ctx.resolve(class, &slot.sig, CallKind::Virtual).method() else {
                if node.is_concrete() {
                    tracing::trace!(
                        target = "devirt.specialize",
                        slot = %hierarchy.display_method(declaration),
                        implementor = %node.name,
                        "implementor body is unknown"
                    );
                    out.unknown_implementors.push(declaration);
                }
                continue;
            };
            if body != declaration && !hierarchy.is_subtype(hierarchy.method(body).owner, iface) {
                out.edges.push((declaration, body));
            }
        }
    }
    out
}
