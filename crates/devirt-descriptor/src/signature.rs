use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{parse_method_descriptor, FieldType};
use crate::error::Result;

/// The override key of a method: its name plus ordered parameter types.
///
/// The return type is deliberately not part of the key, so an override with a narrower return
/// type (covariant override) shares the signature of the method it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<FieldType>,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, params: Vec<FieldType>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Build a signature from a method name and a full method descriptor, dropping the return type.
    pub fn from_descriptor(name: impl Into<String>, descriptor: &str) -> Result<Self> {
        let parsed = parse_method_descriptor(descriptor)?;
        Ok(Self::new(name, parsed.params))
    }

    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }

    /// `clone()` with no parameters; the only method arrays answer specially.
    pub fn is_clone(&self) -> bool {
        self.name == "clone" && self.params.is_empty()
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}
