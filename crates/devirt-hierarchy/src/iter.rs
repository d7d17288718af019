use std::collections::{HashSet, VecDeque};

use crate::graph::{ClassId, Hierarchy};

/// A class followed by its superclasses, ending at the root.
#[derive(Clone)]
pub struct SuperclassChain<'h> {
    hierarchy: &'h Hierarchy,
    next: Option<ClassId>,
}

impl<'h> SuperclassChain<'h> {
    pub(crate) fn new(hierarchy: &'h Hierarchy, start: ClassId) -> Self {
        Self {
            hierarchy,
            next: Some(start),
        }
    }
}

impl Iterator for SuperclassChain<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self.hierarchy.superclass_of(current);
        Some(current)
    }
}

/// Lazy walk over every proper supertype of a class.
///
/// Superclasses come first (nearest first), then interfaces in breadth-first order. Each type is
/// yielded once even when reachable along several paths. Every call to [`Hierarchy::ancestors`]
/// starts a fresh walk in the same order; clones continue independently from where they were made.
#[derive(Clone)]
pub struct Ancestors<'h> {
    hierarchy: &'h Hierarchy,
    next_super: Option<ClassId>,
    pending: VecDeque<ClassId>,
    seen: HashSet<ClassId>,
}

impl<'h> Ancestors<'h> {
    pub(crate) fn new(hierarchy: &'h Hierarchy, start: ClassId) -> Self {
        Self {
            hierarchy,
            next_super: hierarchy.superclass_of(start),
            pending: hierarchy.direct_interfaces_of(start).iter().copied().collect(),
            seen: HashSet::from([start]),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        if let Some(current) = self.next_super {
            self.next_super = self.hierarchy.superclass_of(current);
            self.pending
                .extend(self.hierarchy.direct_interfaces_of(current).iter().copied());
            self.seen.insert(current);
            return Some(current);
        }

        while let Some(iface) = self.pending.pop_front() {
            if !self.seen.insert(iface) {
                continue;
            }
            self.pending
                .extend(self.hierarchy.direct_interfaces_of(iface).iter().copied());
            return Some(iface);
        }
        None
    }
}

/// Depth-first walk over a type and everything below it.
#[derive(Clone)]
pub struct Subtypes<'h> {
    hierarchy: &'h Hierarchy,
    stack: Vec<ClassId>,
    seen: HashSet<ClassId>,
}

impl<'h> Subtypes<'h> {
    pub(crate) fn new(hierarchy: &'h Hierarchy, start: ClassId) -> Self {
        Self {
            hierarchy,
            stack: vec![start],
            seen: HashSet::new(),
        }
    }
}

impl Iterator for Subtypes<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        while let Some(current) = self.stack.pop() {
            if !self.seen.insert(current) {
                continue;
            }
            // Reverse so children are visited in declaration order.
            self.stack
                .extend(self.hierarchy.subclasses_of(current).iter().rev().copied());
            return Some(current);
        }
        None
    }
}
