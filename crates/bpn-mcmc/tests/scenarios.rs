use std::collections::BTreeMap;

use rand::rngs::mock::StepRng;
use rand::Rng;

use bpn_core::{BpnError, RngHandle};
use bpn_graph::ProcessLink;
use bpn_mcmc::states::ParameterDelta;
use bpn_mcmc::{
    run_graph, AcceptedState, AnnealConfig, OverallState, ParameterConfig, ParameterName,
    ParameterSpace, ParameterValues, PlnLinksState, PlnOverallState, PlnSimulatedAnnealing,
    SimulatedAnnealing, StateRecorder, TransitionKind,
};


#[test]
fn three_links_two_genes() {
    let graph = fixtures::three_link_graph();
    assert_eq!(
        graph.links(),
        &[
            ProcessLink::new("A", "C"),
            ProcessLink::new("B", "C"),
            ProcessLink::new("C", "C"),
        ]
    );
    let config = fixtures::fixed_parameter_config(10);
    let mut annealer =
        PlnSimulatedAnnealing::from_graph(graph, &config, RngHandle::from_seed(2011)).unwrap();
    let summary = annealer.run().unwrap();
    assert_eq!(summary.steps, 10);
    assert_eq!(annealer.temperature(), 0.0);
    assert!(summary
        .acceptance_rates
        .keys()
        .all(|kind| *kind == TransitionKind::Link));

    // Starting empty, every first proposal covers the only (active)
    // interaction and is a strict improvement.
    let selected_one = 0.9f64.ln() + 3.0 * 0.5f64.ln();
    let recorder = annealer.state_recorder().summary();
    let best = recorder.best.unwrap();
    assert_eq!(best.step, 0);
    assert!((best.log_likelihood - selected_one).abs() < 1e-12);
    assert_eq!(best.links.len(), 1);

    let parameters = annealer.current_state().parameters_state().values();
    assert_eq!((parameters.alpha, parameters.beta), (0.1, 0.1));
    assert_eq!(parameters.link_prior, 0.5);
}

#[test]
fn every_proposal_accepted_with_zero_draws() {
    let config = fixtures::fixed_parameter_config(10);
    let mut annealer = PlnSimulatedAnnealing::from_graph(
        fixtures::three_link_graph(),
        &config,
        StepRng::new(0, 0),
    )
    .unwrap();
    let summary = annealer.run().unwrap();
    assert_eq!(summary.accepted, 10);
    assert_eq!(annealer.state_recorder().records(), 10);
    // A zero draw always picks the first candidate, so it toggles ten times.
    assert!(annealer
        .current_state()
        .links_state()
        .selected()
        .is_empty());
    let counts = annealer.state_recorder().link_selection_counts();
    assert_eq!(counts, &[5, 0, 0]);
}

#[test]
fn fixed_links_only_move_parameters() {
    let seed = vec![ProcessLink::new("P1", "P2")];
    let config = AnnealConfig {
        links_fixed: true,
        selected_links: Some(seed.clone()),
        ..fixtures::free_parameter_config(60)
    };
    let summary = run_graph(&config, 9, fixtures::pathway_graph()).unwrap();
    assert_eq!(summary.final_links, seed);
    assert_eq!(summary.steps, 60);
    assert!(summary
        .acceptance_rates
        .keys()
        .all(|kind| *kind == TransitionKind::Parameter));
    assert!(summary
        .recorder
        .link_frequencies
        .iter()
        .all(|entry| entry.frequency == 1.0 || entry.frequency == 0.0));
}

#[test]
fn nothing_to_anneal_is_a_config_error() {
    let config = AnnealConfig {
        links_fixed: true,
        ..fixtures::fixed_parameter_config(10)
    };
    let err = run_graph(&config, 1, fixtures::pathway_graph()).unwrap_err();
    assert!(matches!(err, BpnError::Config(_)));
    assert_eq!(err.info().code, "nothing-to-anneal");
}

#[test]
fn unknown_seed_link_is_rejected() {
    let config = AnnealConfig {
        selected_links: Some(vec![ProcessLink::new("P1", "P9")]),
        ..fixtures::fixed_parameter_config(10)
    };
    let err = run_graph(&config, 1, fixtures::pathway_graph()).unwrap_err();
    assert_eq!(err.info().code, "unknown-seed-link");
}

#[test]
fn invalid_transition_ratio_fails_before_any_step() {
    let config = AnnealConfig {
        transition_ratio: 0.0,
        ..fixtures::free_parameter_config(10)
    };
    let err = run_graph(&config, 1, fixtures::pathway_graph()).unwrap_err();
    assert_eq!(err.info().code, "invalid-transition-ratio");
}

#[test]
fn recorders_can_be_borrowed() {
    struct Counter(usize);
    impl StateRecorder for Counter {
        fn record_state(&mut self, _state: &AcceptedState) {
            self.0 += 1;
        }
    }
    let config = AnnealConfig {
        parameters: ParameterConfig {
            alpha: Some(0.2),
            ..ParameterConfig::default()
        },
        ..fixtures::free_parameter_config(25)
    };
    let mut rng = RngHandle::from_seed(4);
    let state = PlnOverallState::from_config(fixtures::pathway_graph(), &config, &mut rng).unwrap();
    let mut counter = Counter(0);
    let mut annealer =
        SimulatedAnnealing::new(state, &mut counter, config.num_steps, rng).unwrap();
    let summary = annealer.run().unwrap();
    drop(annealer);
    assert_eq!(counter.0, summary.accepted);
}

/// Alpha flipping between two values; beta and link_prior pinned.
#[derive(Debug, Clone)]
struct AlphaToggle {
    low: bool,
}

impl AlphaToggle {
    const LOW: f64 = 0.1;
    const HIGH: f64 = 0.3;

    fn alpha(&self) -> f64 {
        if self.low {
            Self::LOW
        } else {
            Self::HIGH
        }
    }
}

impl ParameterSpace for AlphaToggle {
    fn values(&self) -> ParameterValues {
        ParameterValues {
            alpha: self.alpha(),
            beta: 0.1,
            link_prior: 0.5,
        }
    }

    fn has_free_parameters(&self) -> bool {
        true
    }

    fn propose_transition<R: Rng + ?Sized>(
        &self,
        _rng: &mut R,
    ) -> Result<(Self, ParameterDelta), BpnError> {
        let next = AlphaToggle { low: !self.low };
        let delta = ParameterDelta {
            name: ParameterName::Alpha,
            previous: self.alpha(),
            proposed: next.alpha(),
        };
        Ok((next, delta))
    }

    fn get_parameter_distributions(&self) -> BTreeMap<ParameterName, Vec<f64>> {
        BTreeMap::from([(ParameterName::Alpha, vec![Self::LOW, Self::HIGH])])
    }
}

#[test]
fn custom_parameter_space_drives_the_annealer() {
    let links = PlnLinksState::new(fixtures::pathway_graph(), 1.0, None).unwrap();
    let state = OverallState::new(links, AlphaToggle { low: true }, 1.0, true).unwrap();
    assert_eq!(
        state.parameters_state().get_parameter_distributions()[&ParameterName::Alpha],
        vec![0.1, 0.3]
    );

    let mut accepted: Vec<AcceptedState> = Vec::new();
    let mut annealer =
        SimulatedAnnealing::new(state, &mut accepted, 30, RngHandle::from_seed(17)).unwrap();
    let summary = annealer.run().unwrap();
    assert_eq!(summary.steps, 30);
    assert!(summary
        .acceptance_rates
        .keys()
        .all(|kind| *kind == TransitionKind::Parameter));
    drop(annealer);

    assert_eq!(accepted.len(), summary.accepted);
    assert!(!accepted.is_empty());
    for record in &accepted {
        assert_eq!(record.transition, TransitionKind::Parameter);
        assert!(record.parameters.alpha == 0.1 || record.parameters.alpha == 0.3);
        assert_eq!(record.parameters.beta, 0.1);
        assert!(record.selected_links.is_empty());
    }
}
