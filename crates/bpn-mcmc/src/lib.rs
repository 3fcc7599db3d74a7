#![deny(missing_docs)]

//! Simulated-annealing search over process linkage networks.
//!
//! A state pairs a selection of process links with the model parameters
//! `alpha`, `beta` and `link_prior`. [`SimulatedAnnealing`] proposes single
//! link toggles or single parameter moves and accepts them under a linearly
//! falling temperature, reporting accepted states to a [`StateRecorder`].

/// Generic annealing state machine.
pub mod annealing;
/// YAML configuration schema and defaults.
pub mod config;
/// Likelihood of observed interaction activity.
pub mod likelihood;
/// Run manifest serialization helpers.
pub mod manifest;
/// Accepted-state recorders.
pub mod recorder;
/// `run_graph`/`run_array` entry points.
pub mod runner;
/// Links, parameters and overall states.
pub mod states;

pub use annealing::{
    AnnealState, AnnealSummary, ArraySimulatedAnnealing, PlnSimulatedAnnealing,
    SimulatedAnnealing, StepOutcome,
};
pub use config::{AnnealConfig, OutputConfig, ParameterConfig, ParameterGrids, SeedPolicy, NUM_STEPS};
pub use likelihood::{log_likelihood, InteractionCounts, LOG_ZERO};
pub use manifest::RunManifest;
pub use recorder::{AcceptedState, PlnStateRecorder, RecorderSummary, StateRecorder};
pub use runner::{run_array, run_graph, RunSummary, StateLayout};
pub use states::{
    ArrayLinksState, ArrayOverallState, LinksState, OverallState, ParameterName, ParameterSpace,
    ParameterValues, ParametersState, PlnLinksState, PlnOverallState, StateDelta, TransitionKind,
};
