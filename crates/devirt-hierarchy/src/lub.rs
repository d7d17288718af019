use std::collections::BTreeSet;

use crate::graph::{ClassId, Hierarchy};

impl Hierarchy {
    /// Minimal common supertypes of `types`, optionally restricted to subtypes of `bound`.
    ///
    /// The result is sorted by id. It is empty only when `types` is empty or no common supertype
    /// lies under `bound`.
    pub fn minimal_common_supertypes(
        &self,
        types: &[ClassId],
        bound: Option<ClassId>,
    ) -> Vec<ClassId> {
        let Some((first, rest)) = types.split_first() else {
            return Vec::new();
        };

        let mut common: BTreeSet<ClassId> = self.self_and_ancestors(*first);
        for ty in rest {
            let others = self.self_and_ancestors(*ty);
            common.retain(|c| others.contains(c));
            if common.is_empty() {
                break;
            }
        }
        if let Some(bound) = bound {
            common.retain(|c| self.is_subtype(*c, bound));
        }

        common
            .iter()
            .copied()
            .filter(|c| {
                !common
                    .iter()
                    .any(|other| other != c && self.is_subtype(*other, *c))
            })
            .collect()
    }

    /// Least upper bound: the unique nearest common ancestor of `types`, if there is one.
    ///
    /// Two classes that both implement the same pair of unrelated interfaces have no unique
    /// nearest ancestor; that case returns `None`.
    pub fn lub(&self, types: &[ClassId]) -> Option<ClassId> {
        match self.minimal_common_supertypes(types, None).as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    fn self_and_ancestors(&self, id: ClassId) -> BTreeSet<ClassId> {
        let mut set: BTreeSet<ClassId> = self.ancestors(id).collect();
        set.insert(id);
        set.insert(self.root);
        set
    }
}
