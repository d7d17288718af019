use std::collections::HashMap;

use devirt_descriptor::{
    ClassDescriptor, DescriptorError, FieldType, MethodSig, ReturnType, DEFAULT_STORE,
};
use rayon::prelude::*;

use crate::error::HierarchyError;
use crate::graph::{
    ClassId, ClassKind, ClassNode, DispatchKind, FieldId, FieldSlot, Hierarchy, MethodId,
    MethodSlot,
};

/// Builds a [`Hierarchy`] from the complete set of class descriptors of a program.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    root_type: String,
    root_store: String,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new("java/lang/Object")
    }
}

struct ParsedMethod {
    sig: MethodSig,
    return_type: ReturnType,
    has_body: bool,
    is_static: bool,
    is_private: bool,
    inferred_return: Option<String>,
}

struct ParsedField {
    name: String,
    ty: FieldType,
    is_static: bool,
}

struct ParsedClass {
    methods: Vec<ParsedMethod>,
    fields: Vec<ParsedField>,
}

impl HierarchyBuilder {
    pub fn new(root_type: impl Into<String>) -> Self {
        Self {
            root_type: root_type.into(),
            root_store: DEFAULT_STORE.to_string(),
        }
    }

    #[must_use]
    pub fn with_root_store(mut self, store: impl Into<String>) -> Self {
        self.root_store = store.into();
        self
    }

    pub fn build(&self, descriptors: &[ClassDescriptor]) -> Result<Hierarchy, HierarchyError> {
        // Member descriptors are independent of each other; parse them in parallel and keep input
        // order so the first failure reported is the first one in the input.
        let parsed: Vec<Result<ParsedClass, HierarchyError>> =
            descriptors.par_iter().map(parse_class).collect();

        let mut state = BuildState {
            classes: Vec::with_capacity(descriptors.len() + 1),
            methods: Vec::new(),
            fields: Vec::new(),
            by_name: HashMap::with_capacity(descriptors.len() + 1),
            root: None,
        };

        let mut members = Vec::with_capacity(descriptors.len());
        for (desc, parsed) in descriptors.iter().zip(parsed) {
            if state.by_name.contains_key(&desc.name) {
                return Err(HierarchyError::DuplicateClassDefinition {
                    name: desc.name.clone(),
                });
            }
            let kind = if desc.is_interface() {
                ClassKind::Interface
            } else if desc.is_abstract() {
                ClassKind::AbstractClass
            } else {
                ClassKind::Class
            };
            let store = desc
                .store
                .clone()
                .unwrap_or_else(|| self.root_store.clone());
            state.push_class(desc.name.clone(), kind, Some(store));
            members.push(parsed?);
        }

        let root = match state.by_name.get(&self.root_type) {
            Some(id) => *id,
            None => state.push_class(self.root_type.clone(), ClassKind::External, None),
        };
        state.root = Some(root);

        for (idx, (desc, parsed)) in descriptors.iter().zip(members).enumerate() {
            let id = ClassId::from_index(idx);
            let super_class = if id == root {
                if let Some(super_name) = &desc.super_name {
                    tracing::warn!(
                        target = "devirt.hierarchy",
                        root = %desc.name,
                        super_name = %super_name,
                        "ignoring superclass declared on the root type"
                    );
                }
                None
            } else {
                match desc.super_name.as_deref().filter(|name| !name.is_empty()) {
                    Some(name) => Some(state.intern(name)),
                    None => Some(root),
                }
            };
            let interfaces: Vec<ClassId> = desc
                .interfaces
                .iter()
                .map(|name| state.intern(name))
                .collect();

            let is_interface = desc.is_interface();
            let mut method_ids = Vec::with_capacity(parsed.methods.len());
            for method in parsed.methods {
                let kind = if method.sig.is_initializer() || method.is_private {
                    DispatchKind::Private
                } else if method.is_static {
                    DispatchKind::Static
                } else if is_interface {
                    DispatchKind::Interface
                } else {
                    DispatchKind::Virtual
                };
                let return_class = method.return_type.class_name().map(|n| state.intern(n));
                let inferred_return = method.inferred_return.as_deref().map(|n| state.intern(n));
                method_ids.push(MethodId::from_index(state.methods.len()));
                state.methods.push(MethodSlot {
                    owner: id,
                    sig: method.sig,
                    return_type: method.return_type,
                    return_class,
                    inferred_return,
                    has_body: method.has_body,
                    kind,
                });
            }

            let mut field_ids = Vec::with_capacity(parsed.fields.len());
            for field in parsed.fields {
                field_ids.push(FieldId::from_index(state.fields.len()));
                state.fields.push(FieldSlot {
                    owner: id,
                    name: field.name,
                    ty: field.ty,
                    is_static: field.is_static,
                });
            }

            let node = &mut state.classes[idx];
            node.super_class = super_class;
            node.interfaces = interfaces;
            node.methods = method_ids;
            node.fields = field_ids;
        }

        detect_cycles(&state.classes)?;

        let mut subclasses = vec![Vec::new(); state.classes.len()];
        for (idx, node) in state.classes.iter().enumerate() {
            let id = ClassId::from_index(idx);
            for sup in node.super_class.iter().chain(node.interfaces.iter()) {
                let children: &mut Vec<ClassId> = &mut subclasses[sup.index()];
                if !children.contains(&id) {
                    children.push(id);
                }
            }
        }

        let hierarchy = Hierarchy {
            classes: state.classes,
            methods: state.methods,
            fields: state.fields,
            by_name: state.by_name,
            subclasses,
            root,
            root_store: self.root_store.clone(),
        };

        tracing::info!(
            target = "devirt.hierarchy",
            classes = descriptors.len(),
            external = hierarchy.external_classes().count(),
            methods = hierarchy.method_count(),
            "built class hierarchy"
        );
        Ok(hierarchy)
    }
}

struct BuildState {
    classes: Vec<ClassNode>,
    methods: Vec<MethodSlot>,
    fields: Vec<FieldSlot>,
    by_name: HashMap<String, ClassId>,
    root: Option<ClassId>,
}

impl BuildState {
    fn push_class(&mut self, name: String, kind: ClassKind, store: Option<String>) -> ClassId {
        let id = ClassId::from_index(self.classes.len());
        self.by_name.insert(name.clone(), id);
        self.classes.push(ClassNode {
            name,
            kind,
            super_class: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            store,
        });
        id
    }

    /// Look up `name`, creating an external node for names the input never defines.
    fn intern(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = self.push_class(name.to_string(), ClassKind::External, None);
        self.classes[id.index()].super_class = self.root;
        tracing::trace!(target = "devirt.hierarchy", name, "referenced type is external");
        id
    }
}

fn parse_class(desc: &ClassDescriptor) -> Result<ParsedClass, HierarchyError> {
    let member_error = |member: &str, source: DescriptorError| HierarchyError::Descriptor {
        class: desc.name.clone(),
        member: member.to_string(),
        source,
    };

    let methods = desc
        .methods
        .iter()
        .map(|m| {
            let parsed = m.parsed_descriptor().map_err(|e| member_error(&m.name, e))?;
            Ok(ParsedMethod {
                sig: MethodSig::new(m.name.clone(), parsed.params),
                return_type: parsed.return_type,
                has_body: m.has_body(),
                is_static: m.is_static(),
                is_private: m.is_private(),
                inferred_return: m.inferred_return.clone(),
            })
        })
        .collect::<Result<Vec<_>, HierarchyError>>()?;

    let fields = desc
        .fields
        .iter()
        .map(|f| {
            let ty = f.parsed_descriptor().map_err(|e| member_error(&f.name, e))?;
            Ok(ParsedField {
                name: f.name.clone(),
                ty,
                is_static: f.is_static(),
            })
        })
        .collect::<Result<Vec<_>, HierarchyError>>()?;

    Ok(ParsedClass { methods, fields })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Colored DFS over superclass and interface edges together.
fn detect_cycles(classes: &[ClassNode]) -> Result<(), HierarchyError> {
    let supertype_at = |node: usize, edge: usize| -> Option<ClassId> {
        let node = &classes[node];
        node.super_class
            .iter()
            .chain(node.interfaces.iter())
            .nth(edge)
            .copied()
    };

    let mut marks = vec![Mark::Unvisited; classes.len()];
    for start in 0..classes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::OnStack;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(&(node, edge)) = stack.last() {
            let Some(next) = supertype_at(node, edge) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let next = next.index();
            match marks[next] {
                Mark::Unvisited => {
                    marks[next] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::OnStack => {
                    let from = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                    let mut path: Vec<String> = stack[from..]
                        .iter()
                        .map(|(n, _)| classes[*n].name.clone())
                        .collect();
                    path.push(classes[next].name.clone());
                    return Err(HierarchyError::Cycle { path });
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}
