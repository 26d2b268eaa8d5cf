//! fg-core: shared foundation for flowgraph.
//!
//! Contains:
//! - value (metadata values, ordered metadata maps and patches, IIP payloads)
//! - error (shared error types)

pub mod error;
pub mod value;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FgError, FgResult};
pub use value::*;
