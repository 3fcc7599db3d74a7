//! Search-space states: link selections, parameters and their composition.

/// Dense-array link selection.
pub mod array_links;
/// Object-graph link selection.
pub mod graph_links;
/// Shared link-selection contract.
pub mod links;
/// Composed links + parameters state.
pub mod overall;
/// Model parameters and their proposal grids.
pub mod parameters;

pub use array_links::ArrayLinksState;
pub use graph_links::PlnLinksState;
pub use links::{LinkToggle, LinksState};
pub use overall::{ArrayOverallState, OverallState, PlnOverallState, StateDelta, TransitionKind};
pub use parameters::{
    ParameterDelta, ParameterDistribution, ParameterName, ParameterSpace, ParameterValues,
    ParametersState,
};
