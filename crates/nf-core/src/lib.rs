//! nf-core: stable foundation for nitroflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - kinds (gases, manure types, pathway stages, application methods)
//! - error (shared error types)

pub mod error;
pub mod kinds;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{NfError, NfResult};
pub use kinds::*;
pub use numeric::*;
