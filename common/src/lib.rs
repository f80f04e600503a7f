#![forbid(unsafe_code)]

pub mod endpoint;
pub mod memory;
pub mod types;

/// Boxed error used wherever a collaborator's failure crosses a capability
/// boundary without a concrete type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
