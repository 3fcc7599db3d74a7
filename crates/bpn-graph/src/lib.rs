#![deny(missing_docs)]

//! Interaction/annotation topologies consumed by the BPN annealer.
//!
//! Two layouts of the same data are provided: [`AnnotatedInteractionsGraph`]
//! keeps owned identifiers and ordered sets, [`AnnotatedInteractionsArray`]
//! flattens everything into index arrays for large networks.

mod array;
mod builder;
mod graph;
mod hash;
mod ids;

pub use array::AnnotatedInteractionsArray;
pub use builder::{InteractionsBuilder, InteractionsInput};
pub use graph::AnnotatedInteractionsGraph;
pub use hash::canonical_hash;
pub use ids::{GeneId, Interaction, ProcessId, ProcessLink};
