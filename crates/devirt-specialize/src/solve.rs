use std::collections::HashMap;

use devirt_hierarchy::{ClassId, Hierarchy, MethodId};

use crate::decision::SpecializationDecision;
use crate::error::SpecializationCollision;
use crate::graph::OverrideGraph;

/// Lattice value of one slot's return type during the fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chosen {
    /// Nothing returned yet (abstract slot with no overriders seen).
    Bottom,
    Type(ClassId),
    /// Not expressible as a class; the slot keeps its declared type and so must every overridden slot.
    Top,
}

#[derive(Debug)]
struct SlotState {
    value: Chosen,
    pinned: bool,
    collision: Option<SpecializationCollision>,
}

/// Solves one override group to its fixed point.
///
/// Values only move up the lattice and each slot is bounded by its declared type, so the loop
/// terminates. Slots are visited deepest owner first, which settles acyclic groups in one pass.
///
/// If any slot would be narrowed to a type its store cannot load, the whole group keeps its
/// declared return types.
pub(crate) fn solve_group(
    hierarchy: &Hierarchy,
    graph: &OverrideGraph,
    group: &[MethodId],
) -> Vec<(MethodId, SpecializationDecision)> {
    let mut order = group.to_vec();
    order.sort_by_cached_key(|m| {
        let owner = hierarchy.method(*m).owner;
        (std::cmp::Reverse(hierarchy.ancestors(owner).count()), *m)
    });

    let mut state: HashMap<MethodId, SlotState> = group
        .iter()
        .map(|m| (*m, initial_state(hierarchy, graph, *m)))
        .collect();

    loop {
        let mut changed = false;
        for &slot in &order {
            if state[&slot].pinned {
                continue;
            }
            // Unpinned slots always have a class return type.
            let Some(declared) = hierarchy.method(slot).return_class else {
                continue;
            };

            let mut value = state[&slot].value;
            let mut collision = None;
            for overrider in graph.overriders(slot) {
                let other = state.get(overrider).map_or(Chosen::Top, |s| s.value);
                match join(hierarchy, declared, value, other) {
                    Ok(joined) => value = joined,
                    Err(candidates) => {
                        collision = Some(SpecializationCollision { slot, candidates });
                        break;
                    }
                }
            }
            if let Chosen::Type(ty) = value {
                if !hierarchy.is_subtype(ty, declared) {
                    value = Chosen::Top;
                }
            }

            let Some(entry) = state.get_mut(&slot) else {
                continue;
            };
            if let Some(collision) = collision {
                tracing::debug!(
                    target = "devirt.specialize",
                    slot = %hierarchy.display_method(slot),
                    candidates = ?collision
                        .candidates
                        .iter()
                        .map(|c| hierarchy.name(*c))
                        .collect::<Vec<_>>(),
                    "return type collision; keeping declared type"
                );
                entry.value = Chosen::Type(declared);
                entry.pinned = true;
                entry.collision = Some(collision);
                changed = true;
            } else if entry.value != value {
                entry.value = value;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let hidden = order.iter().find_map(|slot| match state[slot].value {
        Chosen::Type(ty)
            if Some(ty) != hierarchy.method(*slot).return_class
                && !is_visible(hierarchy, *slot, ty) =>
        {
            Some((*slot, ty))
        }
        _ => None,
    });
    if let Some((slot, ty)) = hidden {
        tracing::debug!(
            target = "devirt.specialize",
            slot = %hierarchy.display_method(slot),
            narrowed = %hierarchy.name(ty),
            group_size = group.len(),
            "narrowed type is not visible from the slot's store; keeping the group"
        );
        return group
            .iter()
            .map(|m| (*m, SpecializationDecision::Unchanged))
            .collect();
    }

    group
        .iter()
        .map(|slot| {
            let declared = hierarchy.method(*slot).return_class;
            let decision = match state.remove(slot) {
                Some(SlotState {
                    collision: Some(collision),
                    ..
                }) => SpecializationDecision::Conflict(collision),
                Some(SlotState {
                    value: Chosen::Type(ty),
                    ..
                }) if Some(ty) != declared => SpecializationDecision::Specialized(ty),
                _ => SpecializationDecision::Unchanged,
            };
            (*slot, decision)
        })
        .collect()
}

fn initial_state(hierarchy: &Hierarchy, graph: &OverrideGraph, slot: MethodId) -> SlotState {
    let method = hierarchy.method(slot);
    let pinned = |value| SlotState {
        value,
        pinned: true,
        collision: None,
    };

    let Some(declared) = method.return_class else {
        return pinned(Chosen::Top);
    };
    // Members of external supertypes are unknown, so the slot may override something unseen.
    if hierarchy.has_external_ancestor(method.owner) || graph.has_unknown_implementors(slot) {
        return pinned(Chosen::Type(declared));
    }

    let value = if method.has_body {
        let inferred = method
            .inferred_return
            .filter(|ty| hierarchy.is_subtype(*ty, declared))
            .unwrap_or(declared);
        Chosen::Type(inferred)
    } else {
        Chosen::Bottom
    };
    SlotState {
        value,
        pinned: false,
        collision: None,
    }
}

fn join(
    hierarchy: &Hierarchy,
    declared: ClassId,
    a: Chosen,
    b: Chosen,
) -> Result<Chosen, Vec<ClassId>> {
    match (a, b) {
        (Chosen::Top, _) | (_, Chosen::Top) => Ok(Chosen::Top),
        (Chosen::Bottom, other) | (other, Chosen::Bottom) => Ok(other),
        (Chosen::Type(x), Chosen::Type(y)) if x == y => Ok(a),
        (Chosen::Type(x), Chosen::Type(y)) => {
            let common = hierarchy.minimal_common_supertypes(&[x, y], Some(declared));
            match common.as_slice() {
                [single] => Ok(Chosen::Type(*single)),
                [] => Ok(Chosen::Top),
                _ => Err(common),
            }
        }
    }
}

/// A narrowed type must be loadable wherever the slot's class is.
fn is_visible(hierarchy: &Hierarchy, slot: MethodId, ty: ClassId) -> bool {
    match hierarchy.store_of(ty) {
        None => true,
        Some(store) => {
            store == hierarchy.root_store()
                || Some(store) == hierarchy.store_of(hierarchy.method(slot).owner)
        }
    }
}
