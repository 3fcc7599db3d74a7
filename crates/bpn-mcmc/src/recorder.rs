use std::collections::BTreeMap;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

use bpn_core::BpnError;
use bpn_graph::ProcessLink;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher24;

use crate::states::{ParameterName, ParameterValues, TransitionKind};

/// State handed to a recorder each time a proposal is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedState {
    /// Zero-based step at which the proposal was accepted.
    pub step: usize,
    /// Temperature in effect for that step.
    pub temperature: f64,
    /// Kind of transition that was accepted.
    pub transition: TransitionKind,
    /// Selected link indices after the transition.
    pub selected_links: Vec<usize>,
    /// Parameter values after the transition.
    pub parameters: ParameterValues,
    /// Log-likelihood of the accepted state.
    pub log_likelihood: f64,
}

/// Sink for accepted states. Called synchronously from the annealing loop,
/// so implementations should only buffer or aggregate.
pub trait StateRecorder {
    /// Records one accepted state.
    fn record_state(&mut self, state: &AcceptedState);
}

impl StateRecorder for Vec<AcceptedState> {
    fn record_state(&mut self, state: &AcceptedState) {
        self.push(state.clone());
    }
}

impl<T: StateRecorder + ?Sized> StateRecorder for &mut T {
    fn record_state(&mut self, state: &AcceptedState) {
        (**self).record_state(state);
    }
}

/// One row of the accepted-transition trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Step of the accepted transition.
    pub step: usize,
    /// Temperature in effect.
    pub temperature: f64,
    /// Transition kind.
    pub transition: TransitionKind,
    /// Number of selected links after the transition.
    pub num_selected: usize,
    /// Parameter values after the transition.
    pub parameters: ParameterValues,
    /// Log-likelihood after the transition.
    pub log_likelihood: f64,
}

/// Selection frequency of one link over all accepted states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFrequency {
    /// The link.
    pub link: ProcessLink,
    /// Fraction of accepted states selecting it.
    pub frequency: f64,
}

/// Frequency of one grid value of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFrequency {
    /// Grid value.
    pub value: f64,
    /// Fraction of accepted states holding it.
    pub frequency: f64,
}

/// Highest-likelihood accepted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestState {
    /// Step at which it was accepted.
    pub step: usize,
    /// Its log-likelihood.
    pub log_likelihood: f64,
    /// Its selected links.
    pub links: Vec<ProcessLink>,
    /// Its parameter values.
    pub parameters: ParameterValues,
}

/// Aggregates exported by [`PlnStateRecorder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderSummary {
    /// Number of accepted states recorded.
    pub records: u64,
    /// Distinct link selections among them.
    pub unique_selections: usize,
    /// Per-link selection frequencies, in candidate order.
    pub link_frequencies: Vec<LinkFrequency>,
    /// Per-parameter value frequencies over each grid.
    pub parameter_frequencies: BTreeMap<ParameterName, Vec<ValueFrequency>>,
    /// Best accepted state, if any.
    pub best: Option<BestState>,
}

/// Recorder accumulating link and parameter statistics over accepted states.
///
/// Distinct selections are kept as 64-bit fingerprints, so that set grows
/// by one word per new selection. The transition trace keeps one
/// [`TransitionRecord`] per accepted step and is the dominant cost on long
/// runs.
#[derive(Debug, Clone)]
pub struct PlnStateRecorder {
    links: Vec<ProcessLink>,
    distributions: BTreeMap<ParameterName, Vec<f64>>,
    link_selection_counts: Vec<u64>,
    parameter_value_counts: BTreeMap<ParameterName, Vec<u64>>,
    records: u64,
    unique_selections: IndexSet<u64>,
    best: Option<AcceptedState>,
    transitions: Vec<TransitionRecord>,
}

impl PlnStateRecorder {
    /// Creates a recorder over the candidate `links` and the parameter grids.
    pub fn new(links: &[ProcessLink], distributions: BTreeMap<ParameterName, Vec<f64>>) -> Self {
        let parameter_value_counts = distributions
            .iter()
            .map(|(name, grid)| (*name, vec![0; grid.len()]))
            .collect();
        Self {
            links: links.to_vec(),
            link_selection_counts: vec![0; links.len()],
            distributions,
            parameter_value_counts,
            records: 0,
            unique_selections: IndexSet::new(),
            best: None,
            transitions: Vec::new(),
        }
    }

    /// Number of accepted states recorded so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Accepted-transition trace in step order.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Times each candidate link was selected in an accepted state.
    pub fn link_selection_counts(&self) -> &[u64] {
        &self.link_selection_counts
    }

    /// Computes the exported aggregates.
    pub fn summary(&self) -> RecorderSummary {
        let denominator = self.records.max(1) as f64;
        let link_frequencies = self
            .links
            .iter()
            .zip(&self.link_selection_counts)
            .map(|(link, count)| LinkFrequency {
                link: link.clone(),
                frequency: *count as f64 / denominator,
            })
            .collect();
        let parameter_frequencies = self
            .distributions
            .iter()
            .map(|(name, grid)| {
                let counts = &self.parameter_value_counts[name];
                let values = grid
                    .iter()
                    .zip(counts)
                    .map(|(value, count)| ValueFrequency {
                        value: *value,
                        frequency: *count as f64 / denominator,
                    })
                    .collect();
                (*name, values)
            })
            .collect();
        let best = self.best.as_ref().map(|state| BestState {
            step: state.step,
            log_likelihood: state.log_likelihood,
            links: state
                .selected_links
                .iter()
                .filter_map(|index| self.links.get(*index).cloned())
                .collect(),
            parameters: state.parameters,
        });
        RecorderSummary {
            records: self.records,
            unique_selections: self.unique_selections.len(),
            link_frequencies,
            parameter_frequencies,
            best,
        }
    }

    /// Writes the accepted-transition trace as CSV.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(
            file,
            "step,temperature,transition,num_selected,alpha,beta,link_prior,log_likelihood"
        )?;
        for record in &self.transitions {
            writeln!(
                file,
                "{},{:.6},{},{},{},{},{},{:.6}",
                record.step,
                record.temperature,
                record.transition,
                record.num_selected,
                record.parameters.alpha,
                record.parameters.beta,
                record.parameters.link_prior,
                record.log_likelihood
            )?;
        }
        Ok(())
    }

    /// Writes [`summary`](Self::summary) as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), BpnError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| BpnError::serde_at("recorder-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(&self.summary())
            .map_err(|err| BpnError::serde_at("recorder-serialize", err, path))?;
        fs::write(path, json).map_err(|err| BpnError::serde_at("recorder-write", err, path))
    }
}

impl StateRecorder for PlnStateRecorder {
    fn record_state(&mut self, state: &AcceptedState) {
        self.records += 1;
        for &index in &state.selected_links {
            if let Some(count) = self.link_selection_counts.get_mut(index) {
                *count += 1;
            }
        }
        for (name, grid) in &self.distributions {
            let value = state.parameters.get(*name);
            let position = grid
                .iter()
                .position(|candidate| (candidate - value).abs() <= f64::EPSILON);
            if let (Some(position), Some(counts)) =
                (position, self.parameter_value_counts.get_mut(name))
            {
                counts[position] += 1;
            }
        }
        self.unique_selections
            .insert(selection_fingerprint(&state.selected_links));
        let improved = self
            .best
            .as_ref()
            .map(|best| state.log_likelihood > best.log_likelihood)
            .unwrap_or(true);
        if improved {
            self.best = Some(state.clone());
        }
        self.transitions.push(TransitionRecord {
            step: state.step,
            temperature: state.temperature,
            transition: state.transition,
            num_selected: state.selected_links.len(),
            parameters: state.parameters,
            log_likelihood: state.log_likelihood,
        });
    }
}

fn selection_fingerprint(selected: &[usize]) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(0x706c6e2d6c696e6b, 0x73656c6563746564);
    selected.hash(&mut hasher);
    hasher.finish()
}
