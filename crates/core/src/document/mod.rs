//! Report document model: sections of key-value, table, chart and
//! financial-statement groups, ready for a PDF/HTML/JSON renderer.

pub mod error;
pub mod types;

pub use error::DocumentError;
pub use types::*;
