use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bpn_core::{BpnError, RngHandle, RunProvenance, SchemaVersion};
use bpn_graph::{AnnotatedInteractionsArray, AnnotatedInteractionsGraph, ProcessLink};
use serde::{Deserialize, Serialize};

use crate::annealing::{AnnealState, SimulatedAnnealing};
use crate::annealing::{ArraySimulatedAnnealing, PlnSimulatedAnnealing};
use crate::config::{AnnealConfig, OutputConfig};
use crate::manifest::RunManifest;
use crate::recorder::{PlnStateRecorder, RecorderSummary};
use crate::states::{ParameterValues, TransitionKind};

/// Topology layout a run operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateLayout {
    /// [`AnnotatedInteractionsGraph`] with ordered link sets.
    Graph,
    /// [`AnnotatedInteractionsArray`] with index arrays.
    Array,
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Steps taken.
    pub steps: usize,
    /// Proposals accepted.
    pub accepted: usize,
    /// Acceptance rate per transition kind.
    pub acceptance_rates: BTreeMap<TransitionKind, f64>,
    /// Links selected in the final state.
    pub final_links: Vec<ProcessLink>,
    /// Parameter values of the final state.
    pub final_parameters: ParameterValues,
    /// Log-likelihood of the final state.
    pub final_log_likelihood: f64,
    /// Aggregates collected by the state recorder.
    pub recorder: RecorderSummary,
    /// Transition trace CSV, if written.
    pub trace_path: Option<PathBuf>,
    /// Recorder summary JSON, if written.
    pub recorder_path: Option<PathBuf>,
    /// Manifest path, if written.
    pub manifest_path: Option<PathBuf>,
}

/// Anneals over the object-graph layout with a random source seeded by `seed`.
pub fn run_graph(
    config: &AnnealConfig,
    seed: u64,
    topology: Arc<AnnotatedInteractionsGraph>,
) -> Result<RunSummary, BpnError> {
    let links = topology.links().to_vec();
    let topology_hash = topology.canonical_hash();
    let annealer =
        PlnSimulatedAnnealing::from_graph(topology, config, RngHandle::from_seed(seed))?;
    execute(
        annealer,
        config,
        seed,
        StateLayout::Graph,
        &links,
        topology_hash,
    )
}

/// Anneals over the dense-array layout with a random source seeded by `seed`.
pub fn run_array(
    config: &AnnealConfig,
    seed: u64,
    topology: Arc<AnnotatedInteractionsArray>,
) -> Result<RunSummary, BpnError> {
    let links = topology.links().to_vec();
    let topology_hash = topology.canonical_hash().to_owned();
    let annealer =
        ArraySimulatedAnnealing::from_array(topology, config, RngHandle::from_seed(seed))?;
    execute(
        annealer,
        config,
        seed,
        StateLayout::Array,
        &links,
        topology_hash,
    )
}

fn execute<S: AnnealState>(
    mut annealer: SimulatedAnnealing<S, PlnStateRecorder, RngHandle>,
    config: &AnnealConfig,
    seed: u64,
    layout: StateLayout,
    links: &[ProcessLink],
    topology_hash: String,
) -> Result<RunSummary, BpnError> {
    let anneal = annealer.run()?;
    let (state, recorder, _) = annealer.into_parts();
    let final_links: Vec<ProcessLink> = state
        .selected_link_indices()
        .into_iter()
        .filter_map(|index| links.get(index).cloned())
        .collect();
    let final_parameters = state.parameter_values();

    let mut summary = RunSummary {
        steps: anneal.steps,
        accepted: anneal.accepted,
        acceptance_rates: anneal.acceptance_rates,
        final_links,
        final_parameters,
        final_log_likelihood: anneal.final_log_likelihood,
        recorder: recorder.summary(),
        trace_path: None,
        recorder_path: None,
        manifest_path: None,
    };

    if let Some(run_dir) = config.output.run_directory.as_deref() {
        let paths = write_outputs(&recorder, run_dir, &config.output)?;
        let manifest = RunManifest {
            config: config.clone(),
            layout,
            master_seed: seed,
            seed_label: config.seed_policy.label.clone(),
            provenance: provenance(topology_hash, seed),
            steps: summary.steps,
            accepted: summary.accepted,
            final_log_likelihood: summary.final_log_likelihood,
            final_links: summary.final_links.clone(),
            final_parameters,
            trace_file: Some(config.output.trace_file.clone()),
            recorder_file: Some(config.output.recorder_file.clone()),
        };
        manifest.write(&paths.manifest)?;
        tracing::info!(run_directory = %run_dir.display(), "run artefacts written");
        summary.trace_path = Some(paths.trace);
        summary.recorder_path = Some(paths.recorder);
        summary.manifest_path = Some(paths.manifest);
    }
    Ok(summary)
}

struct OutputPaths {
    trace: PathBuf,
    recorder: PathBuf,
    manifest: PathBuf,
}

fn write_outputs(
    recorder: &PlnStateRecorder,
    run_dir: &Path,
    output: &OutputConfig,
) -> Result<OutputPaths, BpnError> {
    fs::create_dir_all(run_dir).map_err(|err| BpnError::serde_at("run-dir-create", err, run_dir))?;
    let paths = OutputPaths {
        trace: run_dir.join(&output.trace_file),
        recorder: run_dir.join(&output.recorder_file),
        manifest: run_dir.join(&output.manifest_file),
    };
    recorder
        .write_csv(&paths.trace)
        .map_err(|err| BpnError::serde_at("trace-write", err, &paths.trace))?;
    recorder.write_json(&paths.recorder)?;
    Ok(paths)
}

fn provenance(topology_hash: String, seed: u64) -> RunProvenance {
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_owned(),
        env!("CARGO_PKG_VERSION").to_owned(),
    );
    RunProvenance {
        schema_version: SchemaVersion::default(),
        topology_hash,
        seed,
        created_at: chrono::Utc::now().to_rfc3339(),
        tool_versions,
    }
}
