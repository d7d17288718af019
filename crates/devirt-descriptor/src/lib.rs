//! Input model for the devirtualization engine.
//!
//! Class, method and field descriptors are produced by an external bytecode loader. This crate
//! only owns their shape, the JVM descriptor grammar used to encode member types, and the JSON
//! interchange format used by the CLI.

#![forbid(unsafe_code)]

mod descriptor;
mod error;
mod program;
mod signature;
mod stub;

pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodType, ReturnType};
pub use crate::error::{DescriptorError, Result};
pub use crate::program::{CallKind, CallSiteDescriptor, ProgramDescriptor, ProgramError};
pub use crate::signature::MethodSig;
pub use crate::stub::{
    access, ClassDescriptor, FieldDescriptorStub, MethodDescriptorStub, DEFAULT_STORE,
};
