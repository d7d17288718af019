use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::FieldType;
use crate::error::Result;
use crate::signature::MethodSig;
use crate::stub::ClassDescriptor;

/// How a call site dispatches, mirroring the JVM invoke opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Virtual,
    Interface,
    Static,
    /// Private methods and constructors (`invoke-direct` / `invokespecial` on the exact class).
    Direct,
    Super,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallKind::Virtual => "virtual",
            CallKind::Interface => "interface",
            CallKind::Static => "static",
            CallKind::Direct => "direct",
            CallKind::Super => "super",
        })
    }
}

/// A call site observed in the program under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteDescriptor {
    pub id: String,
    /// Class containing the call; required for `super` calls.
    #[serde(default)]
    pub caller: Option<String>,
    /// Static receiver type: an internal class name or an array descriptor.
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub kind: CallKind,
}

impl CallSiteDescriptor {
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        kind: CallKind,
    ) -> Self {
        Self {
            id: id.into(),
            caller: None,
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            kind,
        }
    }

    #[must_use]
    pub fn from_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn receiver(&self) -> Result<FieldType> {
        FieldType::from_owner(&self.owner)
    }

    pub fn sig(&self) -> Result<MethodSig> {
        MethodSig::from_descriptor(self.name.clone(), &self.descriptor)
    }
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to read program file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse program description: {0}")]
    Json(#[from] serde_json::Error),
}

/// The complete input of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default)]
    pub call_sites: Vec<CallSiteDescriptor>,
}

impl ProgramDescriptor {
    pub fn from_json_str(text: &str) -> std::result::Result<Self, ProgramError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> std::result::Result<Self, ProgramError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
