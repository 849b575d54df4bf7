//! dw-core: shared foundation for the ductwork engine.
//!
//! Contains:
//! - ids (entity identifiers shared by the model and graph layers)
//! - numeric (Real, finiteness check, angle helpers)
//! - units (uom lengths + canvas scale conversion)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::DwError;
pub use ids::*;
pub use numeric::*;
pub use units::*;
