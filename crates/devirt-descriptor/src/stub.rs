use serde::{Deserialize, Serialize};

use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodType};
use crate::error::Result;
use crate::signature::MethodSig;

/// Store used for classes that do not name one.
pub const DEFAULT_STORE: &str = "classes";

/// JVM access flag bits (JVMS 4.1, 4.5, 4.6).
pub mod access {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_NATIVE: u16 = 0x0100;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
}

/// One class or interface as handed over by the bytecode loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub super_name: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub access_flags: u16,
    #[serde(default)]
    pub methods: Vec<MethodDescriptorStub>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptorStub>,
    /// Name of the store (dex store / module) the class is packaged in.
    #[serde(default)]
    pub store: Option<String>,
}

impl ClassDescriptor {
    /// A concrete class extending `super_name`.
    pub fn class(name: impl Into<String>, super_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: Some(super_name.into()),
            interfaces: Vec::new(),
            access_flags: access::ACC_PUBLIC,
            methods: Vec::new(),
            fields: Vec::new(),
            store: None,
        }
    }

    /// An interface; interfaces have no explicit superclass.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: None,
            interfaces: Vec::new(),
            access_flags: access::ACC_PUBLIC | access::ACC_INTERFACE | access::ACC_ABSTRACT,
            methods: Vec::new(),
            fields: Vec::new(),
            store: None,
        }
    }

    /// The universal base type: a class with no superclass.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            super_name: None,
            ..Self::class(name, String::new())
        }
    }

    #[must_use]
    pub fn with_abstract(mut self) -> Self {
        self.access_flags |= access::ACC_ABSTRACT;
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptorStub) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptorStub) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn in_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & access::ACC_INTERFACE != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access_flags & (access::ACC_ABSTRACT | access::ACC_INTERFACE) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptorStub {
    pub name: String,
    /// JVM method descriptor, e.g. `(I)Lcom/example/Base;`.
    pub descriptor: String,
    #[serde(default)]
    pub access_flags: u16,
    /// Internal name of the most precise type returned by the body, as computed by a local type
    /// inference run over the method's code. `None` when unknown.
    #[serde(default)]
    pub inferred_return: Option<String>,
}

impl MethodDescriptorStub {
    /// A public instance method with a body.
    pub fn concrete(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: access::ACC_PUBLIC,
            inferred_return: None,
        }
    }

    /// A public instance method without a body.
    pub fn abstract_method(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags: access::ACC_PUBLIC | access::ACC_ABSTRACT,
            ..Self::concrete(name, descriptor)
        }
    }

    pub fn static_method(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags: access::ACC_PUBLIC | access::ACC_STATIC,
            ..Self::concrete(name, descriptor)
        }
    }

    pub fn private_method(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags: access::ACC_PRIVATE,
            ..Self::concrete(name, descriptor)
        }
    }

    #[must_use]
    pub fn returning(mut self, inferred: impl Into<String>) -> Self {
        self.inferred_return = Some(inferred.into());
        self
    }

    pub fn has_body(&self) -> bool {
        self.access_flags & access::ACC_ABSTRACT == 0
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & access::ACC_STATIC != 0
    }

    pub fn is_private(&self) -> bool {
        self.access_flags & access::ACC_PRIVATE != 0
    }

    pub fn parsed_descriptor(&self) -> Result<MethodType> {
        parse_method_descriptor(&self.descriptor)
    }

    pub fn sig(&self) -> Result<MethodSig> {
        MethodSig::from_descriptor(self.name.clone(), &self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptorStub {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub access_flags: u16,
}

impl FieldDescriptorStub {
    pub fn instance(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access_flags: access::ACC_PUBLIC,
        }
    }

    pub fn static_field(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags: access::ACC_PUBLIC | access::ACC_STATIC | access::ACC_FINAL,
            ..Self::instance(name, descriptor)
        }
    }

    pub fn is_static(&self) -> bool {
        self.access_flags & access::ACC_STATIC != 0
    }

    pub fn parsed_descriptor(&self) -> Result<FieldType> {
        parse_field_descriptor(&self.descriptor)
    }
}
