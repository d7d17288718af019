use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DescriptorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

/// A JVM field type: primitive, class/interface reference, or array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn object(internal_name: impl Into<String>) -> Self {
        FieldType::Object(internal_name.into())
    }

    pub fn array_of(component: FieldType) -> Self {
        FieldType::Array(Box::new(component))
    }

    /// Parse the owner of a member reference.
    ///
    /// Owners are plain internal names (`com/example/Foo`) except for array receivers, which use
    /// the field descriptor form (`[Lcom/example/Foo;`).
    pub fn from_owner(owner: &str) -> Result<Self> {
        if owner.starts_with('[') {
            return parse_field_descriptor(owner);
        }
        validate_class_name(owner)?;
        Ok(FieldType::Object(owner.to_string()))
    }

    /// Internal name of the referenced class, if this is a class/interface reference.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            FieldType::Object(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldType::Base(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    pub fn component(&self) -> Option<&FieldType> {
        match self {
            FieldType::Array(component) => Some(component),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.descriptor_char()),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

impl ReturnType {
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ReturnType::Type(ty) => ty.class_name(),
            ReturnType::Void => None,
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// Parameter and return types of a method, as encoded by `(params)ret`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodType {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodType> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    if rest.is_empty() {
        return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
    }

    let (return_type, rest) = if let Some(rest) = rest.strip_prefix('V') {
        (ReturnType::Void, rest)
    } else {
        let (ty, rest) = parse_field_type(rest)?;
        (ReturnType::Type(ty), rest)
    };

    if !rest.is_empty() {
        return Err(DescriptorError::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodType {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let Some(first) = input.chars().next() else {
        return Err(DescriptorError::InvalidDescriptor(input.to_string()));
    };
    let rest = &input[first.len_utf8()..];
    let base = |b| Ok((FieldType::Base(b), rest));
    match first {
        'B' => base(BaseType::Byte),
        'C' => base(BaseType::Char),
        'D' => base(BaseType::Double),
        'F' => base(BaseType::Float),
        'I' => base(BaseType::Int),
        'J' => base(BaseType::Long),
        'S' => base(BaseType::Short),
        'Z' => base(BaseType::Boolean),
        'L' => {
            let Some(end) = rest.find(';') else {
                return Err(DescriptorError::InvalidDescriptor(input.to_string()));
            };
            let name = &rest[..end];
            validate_class_name(name)
                .map_err(|_| DescriptorError::InvalidDescriptor(input.to_string()))?;
            Ok((FieldType::Object(name.to_string()), &rest[end + 1..]))
        }
        '[' => {
            let (component, rest) = parse_field_type(rest)?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(DescriptorError::InvalidDescriptor(input.to_string())),
    }
}

/// Internal names are `/`-separated and must not contain descriptor punctuation.
pub(crate) fn validate_class_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.ends_with('/')
        || name.contains("//")
        || name.contains([';', '[', '.', '(', ')']);
    if invalid {
        return Err(DescriptorError::InvalidClassName(name.to_string()));
    }
    Ok(())
}
