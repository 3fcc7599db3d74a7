#![deny(missing_docs)]

//! Shared error, RNG and provenance types for the BPN annealing workspace.

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{BpnError, ErrorInfo};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::RngHandle;
