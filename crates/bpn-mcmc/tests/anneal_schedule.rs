use rand::rngs::mock::StepRng;
use rand::Rng;

use bpn_core::{BpnError, RngHandle};
use bpn_mcmc::{
    AcceptedState, AnnealState, ParameterName, ParameterValues, PlnSimulatedAnnealing,
    SimulatedAnnealing, StateDelta,
};
use bpn_mcmc::states::ParameterDelta;


/// One-dimensional state whose log-likelihood moves by `slope` per transition.
#[derive(Debug, Clone)]
struct LineState {
    value: f64,
    slope: f64,
    delta: Option<StateDelta>,
}

impl LineState {
    fn start(slope: f64) -> Self {
        Self {
            value: 0.0,
            slope,
            delta: None,
        }
    }
}

impl AnnealState for LineState {
    fn create_new_state<R: Rng + ?Sized>(&self, _rng: &mut R) -> Result<Self, BpnError> {
        Ok(Self {
            value: self.value + self.slope,
            slope: self.slope,
            delta: Some(StateDelta::Parameter(ParameterDelta {
                name: ParameterName::Alpha,
                previous: self.value,
                proposed: self.value + self.slope,
            })),
        })
    }

    fn calc_log_likelihood(&self) -> f64 {
        self.value
    }

    fn delta(&self) -> Option<&StateDelta> {
        self.delta.as_ref()
    }

    fn selected_link_indices(&self) -> Vec<usize> {
        Vec::new()
    }

    fn parameter_values(&self) -> ParameterValues {
        ParameterValues {
            alpha: 0.5,
            beta: 0.5,
            link_prior: 0.5,
        }
    }
}

fn high_draws() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

fn line_annealer<R: Rng>(
    slope: f64,
    num_steps: usize,
    rng: R,
) -> SimulatedAnnealing<LineState, Vec<AcceptedState>, R> {
    SimulatedAnnealing::new(LineState::start(slope), Vec::new(), num_steps, rng).unwrap()
}

#[test]
fn temperature_falls_linearly_to_zero() {
    let mut annealer = line_annealer(1.0, 8, RngHandle::from_seed(5));
    assert_eq!(annealer.temperature(), 1.0);
    assert_eq!(annealer.step_size(), 0.125);
    for k in 1..=8 {
        let outcome = annealer.step().unwrap();
        assert_eq!(outcome.step, k - 1);
        let expected = 1.0 - k as f64 * 0.125;
        assert!((annealer.temperature() - expected).abs() < 1e-12);
    }
    assert!(annealer.is_done());
    assert_eq!(annealer.temperature(), 0.0);
    assert_eq!(annealer.steps_taken(), 8);
}

#[test]
fn run_takes_exactly_num_steps() {
    let config = fixtures::fixed_parameter_config(37);
    let mut annealer = PlnSimulatedAnnealing::from_graph(
        fixtures::pathway_graph(),
        &config,
        RngHandle::from_seed(11),
    )
    .unwrap();
    let summary = annealer.run().unwrap();
    assert_eq!(summary.steps, 37);
    assert_eq!(annealer.temperature(), 0.0);
    let err = annealer.next_state().unwrap_err();
    assert_eq!(err.info().code, "annealing-complete");
}

#[test]
fn strict_improvements_are_always_accepted() {
    let mut records: Vec<AcceptedState> = Vec::new();
    let mut annealer =
        SimulatedAnnealing::new(LineState::start(1.0), &mut records, 5, high_draws()).unwrap();
    let summary = annealer.run().unwrap();
    assert_eq!(summary.accepted, 5);
    assert_eq!(summary.final_log_likelihood, 5.0);
    drop(annealer);
    assert_eq!(records.len(), 5);
    assert_eq!(
        records.iter().map(|r| r.step).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn worse_states_need_temperature_above_the_draw() {
    let mut annealer = line_annealer(-1.0, 4, high_draws());
    // At temperature 1 even a draw just below 1 is beaten.
    assert!(annealer.step().unwrap().accepted);
    for _ in 1..4 {
        let outcome = annealer.step().unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.delta_log, -1.0);
        assert_eq!(outcome.log_likelihood, -1.0);
    }
    assert_eq!(annealer.state_recorder().len(), 1);
    assert_eq!(annealer.last_transition_info().unwrap().step, 3);
}

#[test]
fn equal_likelihood_is_not_an_improvement() {
    let mut annealer = line_annealer(0.0, 2, high_draws());
    assert!(annealer.step().unwrap().accepted);
    assert!(!annealer.step().unwrap().accepted);
}

#[test]
fn zero_steps_is_rejected() {
    let err = SimulatedAnnealing::new(
        LineState::start(1.0),
        Vec::<AcceptedState>::new(),
        0,
        high_draws(),
    )
    .unwrap_err();
    assert!(matches!(err, BpnError::Config(_)));
    assert_eq!(err.info().code, "invalid-num-steps");
}
