use thiserror::Error;

pub type Result<T> = std::result::Result<T, DescriptorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid class name: {0:?}")]
    InvalidClassName(String),
}
