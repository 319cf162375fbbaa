//! Declarative report definitions built through validated, consuming steps.

pub mod error;
pub mod types;

pub use error::DefinitionError;
pub use types::*;
