use devirt_descriptor::{CallKind, CallSiteDescriptor, DescriptorError, FieldType, MethodSig};
use devirt_hierarchy::{ClassId, Hierarchy};

/// Static receiver of a call, bound against the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    Class(ClassId),
    Array(FieldType),
    /// Named a type that is not in the hierarchy at all.
    Unknown(String),
}

/// A call site with its names bound to hierarchy nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub id: String,
    pub caller: Option<ClassId>,
    pub receiver: Receiver,
    pub sig: MethodSig,
    pub kind: CallKind,
}

impl CallSite {
    /// Binds a loader-level call site. Only malformed descriptors are errors; names missing from
    /// the hierarchy bind to [`Receiver::Unknown`] and resolve as unresolved later.
    pub fn bind(
        hierarchy: &Hierarchy,
        descriptor: &CallSiteDescriptor,
    ) -> Result<Self, DescriptorError> {
        let receiver = match descriptor.receiver()? {
            ty @ FieldType::Array(_) => Receiver::Array(ty),
            FieldType::Object(name) => match hierarchy.lookup(&name) {
                Some(id) => Receiver::Class(id),
                None => Receiver::Unknown(name),
            },
            FieldType::Base(_) => {
                return Err(DescriptorError::InvalidClassName(descriptor.owner.clone()))
            }
        };

        Ok(Self {
            id: descriptor.id.clone(),
            caller: descriptor
                .caller
                .as_deref()
                .and_then(|name| hierarchy.lookup(name)),
            receiver,
            sig: descriptor.sig()?,
            kind: descriptor.kind,
        })
    }
}
