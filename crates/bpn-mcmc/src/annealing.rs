use std::collections::BTreeMap;
use std::sync::Arc;

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::{AnnotatedInteractionsArray, AnnotatedInteractionsGraph};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_num_steps, AnnealConfig};
use crate::recorder::{AcceptedState, PlnStateRecorder, StateRecorder};
use crate::states::{
    ArrayOverallState, LinksState, OverallState, ParameterSpace, ParameterValues,
    PlnOverallState, StateDelta, TransitionKind,
};

/// Contract between the annealer and the states it walks.
pub trait AnnealState: Sized {
    /// Proposes a successor; `self` is left untouched.
    fn create_new_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self, BpnError>;

    /// Log-likelihood of this state. Must never be NaN.
    fn calc_log_likelihood(&self) -> f64;

    /// Transition that produced this state.
    fn delta(&self) -> Option<&StateDelta>;

    /// Selected link indices in ascending order.
    fn selected_link_indices(&self) -> Vec<usize>;

    /// Current parameter values.
    fn parameter_values(&self) -> ParameterValues;
}

impl<L: LinksState, P: ParameterSpace> AnnealState for OverallState<L, P> {
    fn create_new_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self, BpnError> {
        OverallState::create_new_state(self, rng)
    }

    fn calc_log_likelihood(&self) -> f64 {
        OverallState::calc_log_likelihood(self)
    }

    fn delta(&self) -> Option<&StateDelta> {
        OverallState::delta(self)
    }

    fn selected_link_indices(&self) -> Vec<usize> {
        self.links_state().selected_indices()
    }

    fn parameter_values(&self) -> ParameterValues {
        self.parameters_state().values()
    }
}

/// What happened during one annealing step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub step: usize,
    /// Temperature in effect for the acceptance test.
    pub temperature: f64,
    /// Kind of transition proposed.
    pub transition: TransitionKind,
    /// Whether the proposal replaced the current state.
    pub accepted: bool,
    /// `proposed - current` log-likelihood.
    pub delta_log: f64,
    /// Log-likelihood of the current state after the step.
    pub log_likelihood: f64,
}

/// Totals reported once a run finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealSummary {
    /// Steps taken.
    pub steps: usize,
    /// Proposals accepted.
    pub accepted: usize,
    /// Acceptance rate per transition kind.
    pub acceptance_rates: BTreeMap<TransitionKind, f64>,
    /// Log-likelihood of the final state.
    pub final_log_likelihood: f64,
}

/// Simulated-annealing search over a state space.
///
/// The temperature starts at 1 and falls linearly by `1 / num_steps` per
/// step, reaching exactly 0 after the last one. A proposal is accepted when
/// it improves the log-likelihood, or otherwise when the temperature exceeds
/// a uniform draw.
#[derive(Debug)]
pub struct SimulatedAnnealing<S, G, R> {
    current_state: S,
    state_recorder: G,
    rng: R,
    num_steps: usize,
    steps_taken: usize,
    temperature: f64,
    step_size: f64,
    proposed: BTreeMap<TransitionKind, usize>,
    accepted: BTreeMap<TransitionKind, usize>,
    last_transition_info: Option<StepOutcome>,
}

/// Annealer over the object-graph layout.
pub type PlnSimulatedAnnealing<R> = SimulatedAnnealing<PlnOverallState, PlnStateRecorder, R>;

/// Annealer over the dense-array layout.
pub type ArraySimulatedAnnealing<R> = SimulatedAnnealing<ArrayOverallState, PlnStateRecorder, R>;

impl<S: AnnealState, G: StateRecorder, R: Rng> SimulatedAnnealing<S, G, R> {
    /// Creates an annealer at temperature 1. Fails when `num_steps` is zero.
    pub fn new(
        initial_state: S,
        state_recorder: G,
        num_steps: usize,
        rng: R,
    ) -> Result<Self, BpnError> {
        check_num_steps(num_steps)?;
        Ok(Self {
            current_state: initial_state,
            state_recorder,
            rng,
            num_steps,
            steps_taken: 0,
            temperature: 1.0,
            step_size: 1.0 / num_steps as f64,
            proposed: BTreeMap::new(),
            accepted: BTreeMap::new(),
            last_transition_info: None,
        })
    }

    /// Proposes one transition and applies the acceptance rule at the
    /// current temperature. Does not cool.
    pub fn next_state(&mut self) -> Result<StepOutcome, BpnError> {
        if self.is_done() {
            return Err(BpnError::State(
                ErrorInfo::new("annealing-complete", "no steps remain")
                    .with_context("num_steps", self.num_steps.to_string()),
            ));
        }
        let proposed_state = self.current_state.create_new_state(&mut self.rng)?;
        let transition = proposed_state.delta().map(StateDelta::kind).ok_or_else(|| {
            BpnError::State(ErrorInfo::new(
                "missing-delta",
                "proposed state does not record its transition",
            ))
        })?;
        let current_log = self.current_state.calc_log_likelihood();
        let proposed_log = proposed_state.calc_log_likelihood();
        let delta_log = proposed_log - current_log;
        let accepted = delta_log > 0.0 || self.temperature > self.rng.gen::<f64>();

        *self.proposed.entry(transition).or_insert(0) += 1;
        let log_likelihood = if accepted {
            *self.accepted.entry(transition).or_insert(0) += 1;
            self.current_state = proposed_state;
            self.state_recorder.record_state(&AcceptedState {
                step: self.steps_taken,
                temperature: self.temperature,
                transition,
                selected_links: self.current_state.selected_link_indices(),
                parameters: self.current_state.parameter_values(),
                log_likelihood: proposed_log,
            });
            tracing::debug!(
                step = self.steps_taken,
                temperature = self.temperature,
                %transition,
                delta_log,
                log_likelihood = proposed_log,
                "accepted proposal"
            );
            proposed_log
        } else {
            tracing::debug!(
                step = self.steps_taken,
                temperature = self.temperature,
                %transition,
                delta_log,
                log_likelihood = current_log,
                "rejected proposal"
            );
            current_log
        };

        let outcome = StepOutcome {
            step: self.steps_taken,
            temperature: self.temperature,
            transition,
            accepted,
            delta_log,
            log_likelihood,
        };
        self.last_transition_info = Some(outcome);
        Ok(outcome)
    }

    /// One transition followed by one cooling decrement.
    pub fn step(&mut self) -> Result<StepOutcome, BpnError> {
        let outcome = self.next_state()?;
        self.steps_taken += 1;
        self.temperature = if self.steps_taken >= self.num_steps {
            0.0
        } else {
            1.0 - self.steps_taken as f64 * self.step_size
        };
        Ok(outcome)
    }

    /// Runs the remaining steps.
    pub fn run(&mut self) -> Result<AnnealSummary, BpnError> {
        tracing::info!(
            num_steps = self.num_steps,
            start_step = self.steps_taken,
            log_likelihood = self.current_state.calc_log_likelihood(),
            "annealing started"
        );
        while !self.is_done() {
            self.step()?;
        }
        let summary = self.summary();
        tracing::info!(
            steps = summary.steps,
            accepted = summary.accepted,
            final_log_likelihood = summary.final_log_likelihood,
            "annealing finished"
        );
        Ok(summary)
    }

    /// Totals so far.
    pub fn summary(&self) -> AnnealSummary {
        AnnealSummary {
            steps: self.steps_taken,
            accepted: self.accepted.values().sum(),
            acceptance_rates: self.acceptance_rates(),
            final_log_likelihood: self.current_state.calc_log_likelihood(),
        }
    }

    /// Whether every step has been taken.
    pub fn is_done(&self) -> bool {
        self.steps_taken >= self.num_steps
    }

    /// Accepted / proposed per transition kind.
    pub fn acceptance_rates(&self) -> BTreeMap<TransitionKind, f64> {
        self.proposed
            .iter()
            .map(|(kind, proposed)| {
                let accepted = self.accepted.get(kind).copied().unwrap_or(0);
                (*kind, accepted as f64 / *proposed as f64)
            })
            .collect()
    }

    /// Current state.
    pub fn current_state(&self) -> &S {
        &self.current_state
    }

    /// Recorder notified on each acceptance.
    pub fn state_recorder(&self) -> &G {
        &self.state_recorder
    }

    /// Current temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Per-step temperature decrement.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Configured number of steps.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Steps taken so far.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Outcome of the most recent step.
    pub fn last_transition_info(&self) -> Option<&StepOutcome> {
        self.last_transition_info.as_ref()
    }

    /// Releases the final state, the recorder and the random source.
    pub fn into_parts(self) -> (S, G, R) {
        (self.current_state, self.state_recorder, self.rng)
    }
}

impl<R: Rng> PlnSimulatedAnnealing<R> {
    /// Builds the initial state and a [`PlnStateRecorder`] from `config`.
    pub fn from_graph(
        topology: Arc<AnnotatedInteractionsGraph>,
        config: &AnnealConfig,
        mut rng: R,
    ) -> Result<Self, BpnError> {
        let links = topology.links().to_vec();
        let state = PlnOverallState::from_config(topology, config, &mut rng)?;
        let recorder = PlnStateRecorder::new(
            &links,
            state.parameters_state().get_parameter_distributions(),
        );
        Self::new(state, recorder, config.num_steps, rng)
    }
}

impl<R: Rng> ArraySimulatedAnnealing<R> {
    /// Builds the initial state and a [`PlnStateRecorder`] from `config`.
    pub fn from_array(
        topology: Arc<AnnotatedInteractionsArray>,
        config: &AnnealConfig,
        mut rng: R,
    ) -> Result<Self, BpnError> {
        let links = topology.links().to_vec();
        let state = ArrayOverallState::from_config(topology, config, &mut rng)?;
        let recorder = PlnStateRecorder::new(
            &links,
            state.parameters_state().get_parameter_distributions(),
        );
        Self::new(state, recorder, config.num_steps, rng)
    }
}
