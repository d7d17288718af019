use std::collections::{HashMap, VecDeque};
use std::fmt;

use devirt_descriptor::{FieldType, MethodSig, ReturnType};

use crate::iter::{Ancestors, SuperclassChain, Subtypes};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or(u32::MAX))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a [`ClassNode`] inside one [`Hierarchy`].
    ClassId
);
arena_id!(
    /// Index of a [`MethodSlot`] inside one [`Hierarchy`].
    MethodId
);
arena_id!(FieldId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    AbstractClass,
    Interface,
    /// Referenced but not part of the input. Its members and supertypes are unknown.
    External,
}

#[derive(Debug, Clone)]
pub struct ClassNode {
    pub name: String,
    pub kind: ClassKind,
    pub(crate) super_class: Option<ClassId>,
    pub(crate) interfaces: Vec<ClassId>,
    pub(crate) methods: Vec<MethodId>,
    pub(crate) fields: Vec<FieldId>,
    /// `None` for external nodes.
    pub store: Option<String>,
}

impl ClassNode {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_external(&self) -> bool {
        self.kind == ClassKind::External
    }

    /// Whether instances of exactly this type can exist.
    pub fn is_concrete(&self) -> bool {
        self.kind == ClassKind::Class
    }

    pub fn methods(&self) -> &[MethodId] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldId] {
        &self.fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    Virtual,
    Interface,
    Static,
    Private,
}

#[derive(Debug, Clone)]
pub struct MethodSlot {
    pub owner: ClassId,
    pub sig: MethodSig,
    pub return_type: ReturnType,
    /// Class node of the declared return type, when it is a class/interface reference.
    pub return_class: Option<ClassId>,
    /// Class node of the type inferred for the body's returned values.
    pub inferred_return: Option<ClassId>,
    pub has_body: bool,
    pub kind: DispatchKind,
}

impl MethodSlot {
    /// Instance methods that take part in virtual dispatch.
    pub fn is_overridable(&self) -> bool {
        matches!(self.kind, DispatchKind::Virtual | DispatchKind::Interface)
    }
}

#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub owner: ClassId,
    pub name: String,
    pub ty: FieldType,
    pub is_static: bool,
}

/// The built class graph. Immutable once constructed; share it by reference across threads.
#[derive(Debug)]
pub struct Hierarchy {
    pub(crate) classes: Vec<ClassNode>,
    pub(crate) methods: Vec<MethodSlot>,
    pub(crate) fields: Vec<FieldSlot>,
    pub(crate) by_name: HashMap<String, ClassId>,
    pub(crate) subclasses: Vec<Vec<ClassId>>,
    pub(crate) root: ClassId,
    pub(crate) root_store: String,
}

impl Hierarchy {
    pub fn root(&self) -> ClassId {
        self.root
    }

    pub fn root_store(&self) -> &str {
        &self.root_store
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn class(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.index()]
    }

    pub fn name(&self, id: ClassId) -> &str {
        &self.classes[id.index()].name
    }

    pub fn method(&self, id: MethodId) -> &MethodSlot {
        &self.methods[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldSlot {
        &self.fields[id.index()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassNode)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, node)| (ClassId::from_index(idx), node))
    }

    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &MethodSlot)> + '_ {
        self.methods
            .iter()
            .enumerate()
            .map(|(idx, slot)| (MethodId::from_index(idx), slot))
    }

    pub fn external_classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes()
            .filter(|(_, node)| node.is_external())
            .map(|(id, _)| id)
    }

    pub fn superclass_of(&self, id: ClassId) -> Option<ClassId> {
        self.class(id).super_class
    }

    pub fn direct_interfaces_of(&self, id: ClassId) -> &[ClassId] {
        &self.class(id).interfaces
    }

    /// Direct subclasses of a class, or direct implementors and subinterfaces of an interface.
    pub fn subclasses_of(&self, id: ClassId) -> &[ClassId] {
        &self.subclasses[id.index()]
    }

    /// `id` followed by its superclasses up to the root.
    pub fn superclass_chain(&self, id: ClassId) -> SuperclassChain<'_> {
        SuperclassChain::new(self, id)
    }

    /// All proper supertypes: the superclass chain first, then interfaces breadth-first.
    pub fn ancestors(&self, id: ClassId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    /// `id` and every type below it, each visited once.
    pub fn subtypes(&self, id: ClassId) -> Subtypes<'_> {
        Subtypes::new(self, id)
    }

    /// Types below (or equal to) `id` that can be instantiated.
    pub fn concrete_subtypes(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        self.subtypes(id)
            .filter(move |sub| self.class(*sub).is_concrete())
    }

    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || sup == self.root || self.ancestors(sub).any(|a| a == sup)
    }

    /// Whether some supertype of `id` (or `id` itself) is outside the analyzed program.
    ///
    /// The synthetic root does not count: every type has it.
    pub fn has_external_ancestor(&self, id: ClassId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|a| a != self.root && self.class(a).is_external())
    }

    /// Every interface above `id`, paired with its distance in interface edges, nearest first.
    ///
    /// Interfaces reached through a superclass count the superclass hops too, so a class's own
    /// interfaces are closer than the ones it inherits.
    /// Ties keep discovery order, which follows the declaration order of `implements` clauses.
    pub fn interface_distances(&self, id: ClassId) -> Vec<(ClassId, usize)> {
        // iface -> (distance, discovery sequence)
        let mut best: HashMap<ClassId, (usize, usize)> = HashMap::new();
        let mut queue: VecDeque<(ClassId, usize)> = VecDeque::new();

        if self.class(id).is_interface() {
            queue.push_back((id, 0));
        }
        for (depth, class) in self.superclass_chain(id).enumerate() {
            for iface in self.direct_interfaces_of(class) {
                queue.push_back((*iface, depth + 1));
            }
        }

        // Distances through superclasses are not monotone in queue order, so relax until stable.
        while let Some((iface, dist)) = queue.pop_front() {
            let seq = match best.get(&iface) {
                Some((known, _)) if *known <= dist => continue,
                Some((_, seq)) => *seq,
                None => best.len(),
            };
            best.insert(iface, (dist, seq));
            for sup in self.direct_interfaces_of(iface) {
                queue.push_back((*sup, dist + 1));
            }
        }

        let mut out: Vec<(ClassId, usize, usize)> = best
            .into_iter()
            .map(|(iface, (dist, seq))| (iface, dist, seq))
            .collect();
        out.sort_by_key(|(_, dist, seq)| (*dist, *seq));
        out.into_iter().map(|(iface, dist, _)| (iface, dist)).collect()
    }

    /// First method declared directly on `class` with signature `sig` that satisfies `filter`.
    pub fn declared_method(
        &self,
        class: ClassId,
        sig: &MethodSig,
        filter: impl Fn(&MethodSlot) -> bool,
    ) -> Option<MethodId> {
        self.class(class)
            .methods
            .iter()
            .copied()
            .find(|m| {
                let slot = self.method(*m);
                slot.sig == *sig && filter(slot)
            })
    }

    /// Store a type is packaged in; `None` for external types.
    pub fn store_of(&self, id: ClassId) -> Option<&str> {
        self.class(id).store.as_deref()
    }

    /// Human readable `Owner.name(params)` for diagnostics.
    pub fn display_method(&self, id: MethodId) -> String {
        let slot = self.method(id);
        format!("{}.{}", self.name(slot.owner), slot.sig)
    }
}
