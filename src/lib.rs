//! Tool calling for LLM agents: schemas from Rust functions, validated
//! arguments, and retry-aware execution.
//!

pub use sextant_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use sextant_internal::prelude::*;
}
