use std::fs;
use std::path::{Path, PathBuf};

use bpn_core::{BpnError, RunProvenance};
use bpn_graph::ProcessLink;
use serde::{Deserialize, Serialize};

use crate::config::AnnealConfig;
use crate::runner::StateLayout;
use crate::states::ParameterValues;

/// Structured manifest describing a completed annealing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: AnnealConfig,
    /// Topology layout the run walked.
    pub layout: StateLayout,
    /// Seed of the run's random source.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Schema, topology hash, seed and creation time.
    pub provenance: RunProvenance,
    /// Steps taken.
    pub steps: usize,
    /// Proposals accepted.
    pub accepted: usize,
    /// Log-likelihood of the final state.
    pub final_log_likelihood: f64,
    /// Links selected in the final state.
    pub final_links: Vec<ProcessLink>,
    /// Parameter values of the final state.
    pub final_parameters: ParameterValues,
    /// Transition trace (relative to the run directory).
    pub trace_file: Option<PathBuf>,
    /// Recorder summary (relative to the run directory).
    pub recorder_file: Option<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), BpnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BpnError::serde_at("manifest-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| BpnError::serde_at("manifest-serialize", err, path))?;
        fs::write(path, json).map_err(|err| BpnError::serde_at("manifest-write", err, path))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, BpnError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| BpnError::serde_at("manifest-read", err, path))?;
        serde_json::from_str(&contents)
            .map_err(|err| BpnError::serde_at("manifest-parse", err, path))
    }
}
