use std::fmt;
use std::sync::{Arc, OnceLock};

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::{AnnotatedInteractionsArray, AnnotatedInteractionsGraph, ProcessLink};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_transition_ratio, AnnealConfig};
use crate::likelihood::{self, InteractionCounts};
use crate::states::array_links::ArrayLinksState;
use crate::states::graph_links::PlnLinksState;
use crate::states::links::{LinkToggle, LinksState};
use crate::states::parameters::{ParameterDelta, ParameterSpace, ParametersState};

/// Which sub-state a transition perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// One link toggled.
    Link,
    /// One parameter moved.
    Parameter,
}

impl TransitionKind {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Link => "link",
            TransitionKind::Parameter => "parameter",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition that produced a state from its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StateDelta {
    /// A link was toggled.
    Link(LinkToggle),
    /// A parameter moved.
    Parameter(ParameterDelta),
}

impl StateDelta {
    /// Kind of the transition.
    pub fn kind(&self) -> TransitionKind {
        match self {
            StateDelta::Link(_) => TransitionKind::Link,
            StateDelta::Parameter(_) => TransitionKind::Parameter,
        }
    }
}

/// Links plus parameters: one point of the annealing search space.
///
/// `P` defaults to the grid-backed [`ParametersState`]; any
/// [`ParameterSpace`] can stand in for it. States are immutable once built. [`create_new_state`](Self::create_new_state)
/// returns a successor differing in exactly one link or one parameter, and
/// the log-likelihood is computed at most once per instance.
#[derive(Debug, Clone)]
pub struct OverallState<L, P = ParametersState> {
    links_state: L,
    parameters_state: P,
    transition_ratio: f64,
    links_fixed: bool,
    delta: Option<StateDelta>,
    log_likelihood: OnceLock<f64>,
}

/// Overall state over the object-graph layout.
pub type PlnOverallState = OverallState<PlnLinksState>;

/// Overall state over the dense-array layout.
pub type ArrayOverallState = OverallState<ArrayLinksState>;

impl<L: LinksState, P: ParameterSpace> OverallState<L, P> {
    /// Composes a state. Fails when the ratio is not positive, or when
    /// neither the links nor any parameter can move.
    pub fn new(
        links_state: L,
        parameters_state: P,
        transition_ratio: f64,
        links_fixed: bool,
    ) -> Result<Self, BpnError> {
        check_transition_ratio(transition_ratio)?;
        let state = Self {
            links_state,
            parameters_state,
            transition_ratio,
            links_fixed,
            delta: None,
            log_likelihood: OnceLock::new(),
        };
        if !state.link_transitions_enabled() && !state.parameters_state.has_free_parameters() {
            return Err(BpnError::Config(
                ErrorInfo::new(
                    "nothing-to-anneal",
                    "links are fixed or absent and every parameter is fixed",
                )
                .with_context("num_links", state.links_state.num_links().to_string())
                .with_context("links_fixed", links_fixed.to_string()),
            ));
        }
        Ok(state)
    }

    /// Link selection of this state.
    pub fn links_state(&self) -> &L {
        &self.links_state
    }

    /// Parameter sub-state of this state.
    pub fn parameters_state(&self) -> &P {
        &self.parameters_state
    }

    /// Ratio of link transitions to parameter transitions.
    pub fn transition_ratio(&self) -> f64 {
        self.transition_ratio
    }

    /// Whether the link selection is frozen.
    pub fn links_fixed(&self) -> bool {
        self.links_fixed
    }

    /// Transition that produced this state; `None` for an initial state.
    pub fn delta(&self) -> Option<&StateDelta> {
        self.delta.as_ref()
    }

    /// Whether link transitions can be proposed.
    pub fn link_transitions_enabled(&self) -> bool {
        !self.links_fixed && self.links_state.num_links() > 0
    }

    /// Probability of a link transition when both kinds are possible: `r / (r + 1)`.
    pub fn link_transition_probability(&self) -> f64 {
        self.transition_ratio / (self.transition_ratio + 1.0)
    }

    fn choose_transition<R: Rng + ?Sized>(&self, rng: &mut R) -> TransitionKind {
        match (
            self.link_transitions_enabled(),
            self.parameters_state.has_free_parameters(),
        ) {
            (true, true) => {
                if rng.gen::<f64>() < self.link_transition_probability() {
                    TransitionKind::Link
                } else {
                    TransitionKind::Parameter
                }
            }
            (true, false) => TransitionKind::Link,
            _ => TransitionKind::Parameter,
        }
    }

    /// Proposes a successor state with exactly one link or parameter changed.
    pub fn create_new_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self, BpnError> {
        let (links_state, parameters_state, delta) = match self.choose_transition(rng) {
            TransitionKind::Link => {
                let (links, toggle) = self.links_state.propose_transition(rng)?;
                (links, self.parameters_state.clone(), StateDelta::Link(toggle))
            }
            TransitionKind::Parameter => {
                let (parameters, change) = self.parameters_state.propose_transition(rng)?;
                (
                    self.links_state.clone(),
                    parameters,
                    StateDelta::Parameter(change),
                )
            }
        };
        Ok(Self {
            links_state,
            parameters_state,
            transition_ratio: self.transition_ratio,
            links_fixed: self.links_fixed,
            delta: Some(delta),
            log_likelihood: OnceLock::new(),
        })
    }

    /// Counts feeding the likelihood.
    pub fn interaction_counts(&self) -> InteractionCounts {
        self.links_state.interaction_counts()
    }

    /// Log-likelihood of the observed activity given this state.
    pub fn calc_log_likelihood(&self) -> f64 {
        *self.log_likelihood.get_or_init(|| {
            likelihood::log_likelihood(
                &self.links_state.interaction_counts(),
                &self.parameters_state.values(),
            )
        })
    }
}

impl PlnOverallState {
    /// Builds the initial graph-layout state from a validated configuration.
    ///
    /// Seeds come from `selected_links`, or from `selected_link_indices`
    /// mapped through the topology.
    pub fn from_config<R: Rng + ?Sized>(
        topology: Arc<AnnotatedInteractionsGraph>,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> Result<Self, BpnError> {
        config.validate()?;
        let parameters = ParametersState::new(&config.parameters, rng)?;
        let seed: Option<Vec<ProcessLink>> = match (
            &config.selected_links,
            &config.selected_link_indices,
        ) {
            (Some(links), _) => Some(links.clone()),
            (None, Some(indices)) => Some(
                indices
                    .iter()
                    .map(|&index| {
                        topology.links().get(index).cloned().ok_or_else(|| {
                            BpnError::Config(
                                ErrorInfo::new(
                                    "unknown-seed-link-index",
                                    "seed link index is not a candidate link",
                                )
                                .with_context("index", index.to_string()),
                            )
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (None, None) => None,
        };
        let links = PlnLinksState::new(topology, config.active_gene_threshold, seed.as_deref())?;
        Self::new(links, parameters, config.transition_ratio, config.links_fixed)
    }
}

impl ArrayOverallState {
    /// Builds the initial array-layout state from a validated configuration.
    ///
    /// Seeds come from `selected_link_indices`, or from `selected_links`
    /// mapped to their indices.
    pub fn from_config<R: Rng + ?Sized>(
        topology: Arc<AnnotatedInteractionsArray>,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> Result<Self, BpnError> {
        config.validate()?;
        let parameters = ParametersState::new(&config.parameters, rng)?;
        let seed: Option<Vec<usize>> = match (
            &config.selected_links,
            &config.selected_link_indices,
        ) {
            (_, Some(indices)) => Some(indices.clone()),
            (Some(links), None) => Some(
                links
                    .iter()
                    .map(|link| {
                        topology.link_index(link).ok_or_else(|| {
                            BpnError::Config(
                                ErrorInfo::new(
                                    "unknown-seed-link",
                                    "seed link is not a candidate link",
                                )
                                .with_context("link", link.to_string()),
                            )
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (None, None) => None,
        };
        let links =
            ArrayLinksState::new(topology, config.active_gene_threshold, seed.as_deref())?;
        Self::new(links, parameters, config.transition_ratio, config.links_fixed)
    }
}
