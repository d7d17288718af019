use devirt_descriptor::DescriptorError;
use thiserror::Error;

/// Fatal hierarchy construction failures. Any of these aborts the whole analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("cycle in type hierarchy: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
    #[error("duplicate definition of class {name}")]
    DuplicateClassDefinition { name: String },
    #[error("invalid descriptor for {class}.{member}: {source}")]
    Descriptor {
        class: String,
        member: String,
        #[source]
        source: DescriptorError,
    },
}
