use std::fs;
use std::path::{Path, PathBuf};

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::ProcessLink;
use serde::{Deserialize, Serialize};

/// Default number of annealing steps.
pub const NUM_STEPS: usize = 100_000;

/// YAML-configurable parameters governing an annealing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealConfig {
    /// Number of annealing steps; the temperature falls by `1 / num_steps` per step.
    #[serde(default = "default_num_steps")]
    pub num_steps: usize,
    /// Activity at or above which a gene counts as active.
    #[serde(default = "default_active_gene_threshold")]
    pub active_gene_threshold: f64,
    /// Ratio of link transitions to parameter transitions.
    #[serde(default = "default_transition_ratio")]
    pub transition_ratio: f64,
    /// Links selected at the start of the run (graph layout seed).
    #[serde(default)]
    pub selected_links: Option<Vec<ProcessLink>>,
    /// Link indices selected at the start of the run (array layout seed).
    #[serde(default)]
    pub selected_link_indices: Option<Vec<usize>>,
    /// Freeze the link selection so only parameters move.
    #[serde(default)]
    pub links_fixed: bool,
    /// Model parameters and their proposal grids.
    #[serde(default)]
    pub parameters: ParameterConfig,
    /// Master seed and label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Output directory configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_num_steps() -> usize {
    NUM_STEPS
}

fn default_active_gene_threshold() -> f64 {
    1.0
}

fn default_transition_ratio() -> f64 {
    9.0
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            num_steps: default_num_steps(),
            active_gene_threshold: default_active_gene_threshold(),
            transition_ratio: default_transition_ratio(),
            selected_links: None,
            selected_link_indices: None,
            links_fixed: false,
            parameters: ParameterConfig::default(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AnnealConfig {
    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BpnError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|err| BpnError::Serde(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, BpnError> {
        let contents =
            fs::read_to_string(path).map_err(|err| BpnError::serde_at("config-read", err, path))?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            BpnError::Serde(info) => {
                BpnError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Rejects configurations that cannot drive a run.
    pub fn validate(&self) -> Result<(), BpnError> {
        check_num_steps(self.num_steps)?;
        check_transition_ratio(self.transition_ratio)?;
        if self.active_gene_threshold.is_nan() {
            return Err(BpnError::config(
                "invalid-active-gene-threshold",
                "active_gene_threshold must be a number",
            ));
        }
        if self.selected_links.is_some() && self.selected_link_indices.is_some() {
            return Err(BpnError::Config(
                ErrorInfo::new(
                    "conflicting-link-seeds",
                    "selected_links and selected_link_indices are mutually exclusive",
                )
                .with_hint("seed the run with either link names or link indices"),
            ));
        }
        self.parameters.validate()
    }
}

/// Fixed parameter values and proposal grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParameterConfig {
    /// Fixed false-positive rate; drawn from its grid when absent.
    #[serde(default)]
    pub alpha: Option<f64>,
    /// Fixed false-negative rate; drawn from its grid when absent.
    #[serde(default)]
    pub beta: Option<f64>,
    /// Fixed link prior; drawn from its grid when absent.
    #[serde(default)]
    pub link_prior: Option<f64>,
    /// Admissible values explored by parameter transitions.
    #[serde(default)]
    pub distributions: ParameterGrids,
}

impl ParameterConfig {
    /// Checks fixed values lie in `[0, 1]`, and the grids of the free
    /// parameters are non-empty and lie in `[0, 1]`. Grids of fixed
    /// parameters are never read and are not checked.
    pub fn validate(&self) -> Result<(), BpnError> {
        let parameters = [
            ("alpha", self.alpha, &self.distributions.alpha),
            ("beta", self.beta, &self.distributions.beta),
            ("link_prior", self.link_prior, &self.distributions.link_prior),
        ];
        for (name, fixed, grid) in parameters {
            match fixed {
                Some(value) => check_probability(name, value)?,
                None => check_grid(name, grid)?,
            }
        }
        Ok(())
    }
}

/// Ordered grids of admissible parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrids {
    /// Grid for the false-positive rate.
    #[serde(default = "default_grid")]
    pub alpha: Vec<f64>,
    /// Grid for the false-negative rate.
    #[serde(default = "default_grid")]
    pub beta: Vec<f64>,
    /// Grid for the link prior.
    #[serde(default = "default_grid")]
    pub link_prior: Vec<f64>,
}

/// Nineteen evenly spaced points `0.05, 0.10, ..., 0.95`.
pub fn default_grid() -> Vec<f64> {
    (1..20).map(|k| k as f64 / 20.0).collect()
}

impl Default for ParameterGrids {
    fn default() -> Self {
        Self {
            alpha: default_grid(),
            beta: default_grid(),
            link_prior: default_grid(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0B9E_5EED_2011_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts. Nothing is written when absent.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Accepted-transition trace, relative to `run_directory`.
    #[serde(default = "default_trace_filename")]
    pub trace_file: PathBuf,
    /// Recorder summary, relative to `run_directory`.
    #[serde(default = "default_recorder_filename")]
    pub recorder_file: PathBuf,
    /// Manifest filename, relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
}

fn default_trace_filename() -> PathBuf {
    PathBuf::from("trace.csv")
}

fn default_recorder_filename() -> PathBuf {
    PathBuf::from("recorder.json")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            trace_file: default_trace_filename(),
            recorder_file: default_recorder_filename(),
            manifest_file: default_manifest_filename(),
        }
    }
}

pub(crate) fn check_num_steps(num_steps: usize) -> Result<(), BpnError> {
    if num_steps == 0 {
        return Err(BpnError::Config(
            ErrorInfo::new("invalid-num-steps", "num_steps must be positive")
                .with_context("num_steps", "0"),
        ));
    }
    Ok(())
}

pub(crate) fn check_transition_ratio(ratio: f64) -> Result<(), BpnError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(BpnError::Config(
            ErrorInfo::new(
                "invalid-transition-ratio",
                "transition_ratio must be a positive finite number",
            )
            .with_context("transition_ratio", ratio.to_string()),
        ));
    }
    Ok(())
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), BpnError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BpnError::Config(
            ErrorInfo::new("invalid-parameter", "parameter values must lie in [0, 1]")
                .with_context("parameter", name)
                .with_context("value", value.to_string()),
        ));
    }
    Ok(())
}

pub(crate) fn check_grid(name: &str, grid: &[f64]) -> Result<(), BpnError> {
    if grid.is_empty() {
        return Err(BpnError::Config(
            ErrorInfo::new(
                "invalid-parameter-distribution",
                "parameter distributions need at least one value",
            )
            .with_context("parameter", name),
        ));
    }
    for &value in grid {
        if !(0.0..=1.0).contains(&value) {
            return Err(BpnError::Config(
                ErrorInfo::new(
                    "invalid-parameter-distribution",
                    "parameter distribution values must lie in [0, 1]",
                )
                .with_context("parameter", name)
                .with_context("value", value.to_string()),
            ));
        }
    }
    Ok(())
}
