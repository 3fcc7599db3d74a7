use std::collections::BTreeMap;
use std::fmt;

use bpn_core::errors::{BpnError, ErrorInfo};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{check_grid, check_probability, ParameterConfig};

/// The three model parameters explored alongside the link selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterName {
    /// False-positive rate.
    Alpha,
    /// False-negative rate.
    Beta,
    /// Prior probability of any one link being active.
    LinkPrior,
}

impl ParameterName {
    /// All parameters in transition-selection order.
    pub const ALL: [ParameterName; 3] = [
        ParameterName::Alpha,
        ParameterName::Beta,
        ParameterName::LinkPrior,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterName::Alpha => "alpha",
            ParameterName::Beta => "beta",
            ParameterName::LinkPrior => "link_prior",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain parameter values of a state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterValues {
    /// False-positive rate.
    pub alpha: f64,
    /// False-negative rate.
    pub beta: f64,
    /// Link prior.
    pub link_prior: f64,
}

impl ParameterValues {
    /// Value of `name`.
    pub fn get(&self, name: ParameterName) -> f64 {
        match name {
            ParameterName::Alpha => self.alpha,
            ParameterName::Beta => self.beta,
            ParameterName::LinkPrior => self.link_prior,
        }
    }
}

/// Change applied by a parameter transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterDelta {
    /// Parameter that moved.
    pub name: ParameterName,
    /// Value before the transition.
    pub previous: f64,
    /// Value after the transition.
    pub proposed: f64,
}

/// Proposal distribution of one parameter: a sorted value grid and a cursor.
///
/// A fixed parameter keeps a single-point grid and never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDistribution {
    values: Vec<f64>,
    index: usize,
    fixed: bool,
}

impl ParameterDistribution {
    /// Pins the parameter at `value`.
    pub fn fixed(name: ParameterName, value: f64) -> Result<Self, BpnError> {
        check_probability(name.as_str(), value)?;
        Ok(Self {
            values: vec![value],
            index: 0,
            fixed: true,
        })
    }

    /// Builds a free distribution over `grid`, starting at a uniformly drawn point.
    pub fn from_grid<R: Rng + ?Sized>(
        name: ParameterName,
        grid: &[f64],
        rng: &mut R,
    ) -> Result<Self, BpnError> {
        check_grid(name.as_str(), grid)?;
        let mut values = grid.to_vec();
        values.sort_by(f64::total_cmp);
        values.dedup();
        let index = rng.gen_range(0..values.len());
        Ok(Self {
            values,
            index,
            fixed: false,
        })
    }

    /// Current value.
    pub fn current(&self) -> f64 {
        self.values[self.index]
    }

    /// Admissible values in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether a transition can move this parameter.
    pub fn is_free(&self) -> bool {
        !self.fixed && self.values.len() > 1
    }

    /// Moves to a neighbouring grid point; the ends reflect inward.
    fn step<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let last = self.values.len() - 1;
        let index = if self.index == 0 {
            1
        } else if self.index == last {
            last - 1
        } else if rng.gen_bool(0.5) {
            self.index - 1
        } else {
            self.index + 1
        };
        Self {
            values: self.values.clone(),
            index,
            fixed: self.fixed,
        }
    }
}

/// Parameter sub-state of an [`OverallState`](crate::states::OverallState).
///
/// Implementations are value snapshots: a transition returns a new state
/// with exactly one parameter moved and leaves `self` untouched.
pub trait ParameterSpace: Clone + fmt::Debug + Send + Sync {
    /// Current values.
    fn values(&self) -> ParameterValues;

    /// Whether any parameter can move.
    fn has_free_parameters(&self) -> bool;

    /// New state with one parameter moved, plus the change applied.
    fn propose_transition<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Self, ParameterDelta), BpnError>;

    /// Admissible values per parameter.
    fn get_parameter_distributions(&self) -> BTreeMap<ParameterName, Vec<f64>>;
}

/// Snapshot of `alpha`, `beta` and `link_prior` with their proposal grids.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametersState {
    alpha: ParameterDistribution,
    beta: ParameterDistribution,
    link_prior: ParameterDistribution,
}

impl ParametersState {
    /// Builds the state from configuration. User-supplied values are fixed;
    /// the others start at a point drawn from their grid (alpha, beta, then
    /// link prior).
    pub fn new<R: Rng + ?Sized>(config: &ParameterConfig, rng: &mut R) -> Result<Self, BpnError> {
        let grids = &config.distributions;
        let alpha = match config.alpha {
            Some(value) => ParameterDistribution::fixed(ParameterName::Alpha, value)?,
            None => ParameterDistribution::from_grid(ParameterName::Alpha, &grids.alpha, rng)?,
        };
        let beta = match config.beta {
            Some(value) => ParameterDistribution::fixed(ParameterName::Beta, value)?,
            None => ParameterDistribution::from_grid(ParameterName::Beta, &grids.beta, rng)?,
        };
        let link_prior = match config.link_prior {
            Some(value) => ParameterDistribution::fixed(ParameterName::LinkPrior, value)?,
            None => ParameterDistribution::from_grid(
                ParameterName::LinkPrior,
                &grids.link_prior,
                rng,
            )?,
        };
        Ok(Self {
            alpha,
            beta,
            link_prior,
        })
    }

    /// A state with every parameter pinned.
    pub fn fixed(values: ParameterValues) -> Result<Self, BpnError> {
        Ok(Self {
            alpha: ParameterDistribution::fixed(ParameterName::Alpha, values.alpha)?,
            beta: ParameterDistribution::fixed(ParameterName::Beta, values.beta)?,
            link_prior: ParameterDistribution::fixed(ParameterName::LinkPrior, values.link_prior)?,
        })
    }

    /// Current values.
    pub fn values(&self) -> ParameterValues {
        ParameterValues {
            alpha: self.alpha.current(),
            beta: self.beta.current(),
            link_prior: self.link_prior.current(),
        }
    }

    /// Current false-positive rate.
    pub fn alpha(&self) -> f64 {
        self.alpha.current()
    }

    /// Current false-negative rate.
    pub fn beta(&self) -> f64 {
        self.beta.current()
    }

    /// Current link prior.
    pub fn link_prior(&self) -> f64 {
        self.link_prior.current()
    }

    /// Distribution backing `name`.
    pub fn distribution(&self, name: ParameterName) -> &ParameterDistribution {
        match name {
            ParameterName::Alpha => &self.alpha,
            ParameterName::Beta => &self.beta,
            ParameterName::LinkPrior => &self.link_prior,
        }
    }

    /// Parameters a transition may move.
    pub fn free_parameters(&self) -> Vec<ParameterName> {
        ParameterName::ALL
            .into_iter()
            .filter(|name| self.distribution(*name).is_free())
            .collect()
    }

    /// Whether any parameter can move.
    pub fn has_free_parameters(&self) -> bool {
        ParameterName::ALL
            .iter()
            .any(|name| self.distribution(*name).is_free())
    }

    /// Returns a new state with one free parameter moved to a neighbouring value.
    pub fn propose_transition<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Self, ParameterDelta), BpnError> {
        let free = self.free_parameters();
        if free.is_empty() {
            return Err(BpnError::State(ErrorInfo::new(
                "no-free-parameters",
                "every parameter is fixed",
            )));
        }
        let name = free[rng.gen_range(0..free.len())];
        let previous = self.distribution(name).current();
        let moved = self.distribution(name).step(rng);
        let proposed = moved.current();
        let mut next = self.clone();
        match name {
            ParameterName::Alpha => next.alpha = moved,
            ParameterName::Beta => next.beta = moved,
            ParameterName::LinkPrior => next.link_prior = moved,
        }
        Ok((
            next,
            ParameterDelta {
                name,
                previous,
                proposed,
            },
        ))
    }

    /// Grid of admissible values per parameter; fixed parameters report their one value.
    pub fn get_parameter_distributions(&self) -> BTreeMap<ParameterName, Vec<f64>> {
        ParameterName::ALL
            .into_iter()
            .map(|name| (name, self.distribution(name).values().to_vec()))
            .collect()
    }
}

impl ParameterSpace for ParametersState {
    fn values(&self) -> ParameterValues {
        ParametersState::values(self)
    }

    fn has_free_parameters(&self) -> bool {
        ParametersState::has_free_parameters(self)
    }

    fn propose_transition<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Self, ParameterDelta), BpnError> {
        ParametersState::propose_transition(self, rng)
    }

    fn get_parameter_distributions(&self) -> BTreeMap<ParameterName, Vec<f64>> {
        ParametersState::get_parameter_distributions(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpn_core::RngHandle;

    #[test]
    fn fixed_parameters_never_move() {
        let state = ParametersState::fixed(ParameterValues {
            alpha: 0.1,
            beta: 0.2,
            link_prior: 0.5,
        })
        .unwrap();
        assert!(!state.has_free_parameters());
        let mut rng = RngHandle::from_seed(3);
        let err = state.propose_transition(&mut rng).unwrap_err();
        assert_eq!(err.info().code, "no-free-parameters");
    }

    #[test]
    fn grid_ends_reflect_inward() {
        let dist = ParameterDistribution {
            values: vec![0.1, 0.2, 0.3],
            index: 0,
            fixed: false,
        };
        let mut rng = RngHandle::from_seed(1);
        assert_eq!(dist.step(&mut rng).index, 1);
        let top = ParameterDistribution { index: 2, ..dist };
        assert_eq!(top.step(&mut rng).index, 1);
    }

    #[test]
    fn transition_moves_exactly_one_parameter() {
        let mut rng = RngHandle::from_seed(17);
        let state = ParametersState::new(&ParameterConfig::default(), &mut rng).unwrap();
        for _ in 0..50 {
            let (next, delta) = state.propose_transition(&mut rng).unwrap();
            let changed: Vec<_> = ParameterName::ALL
                .into_iter()
                .filter(|name| next.values().get(*name) != state.values().get(*name))
                .collect();
            assert_eq!(changed, vec![delta.name]);
            assert_eq!(delta.previous, state.values().get(delta.name));
            assert_eq!(delta.proposed, next.values().get(delta.name));
        }
    }

    #[test]
    fn out_of_range_fixed_value_is_a_config_error() {
        let config = ParameterConfig {
            beta: Some(1.5),
            ..ParameterConfig::default()
        };
        let mut rng = RngHandle::from_seed(0);
        let err = ParametersState::new(&config, &mut rng).unwrap_err();
        assert!(matches!(err, BpnError::Config(_)));
        assert_eq!(err.info().context["parameter"], "beta");
    }

    #[test]
    fn single_point_grid_is_not_free() {
        let config = ParameterConfig {
            alpha: Some(0.3),
            beta: Some(0.3),
            distributions: crate::config::ParameterGrids {
                link_prior: vec![0.25],
                ..Default::default()
            },
            ..ParameterConfig::default()
        };
        let mut rng = RngHandle::from_seed(0);
        let state = ParametersState::new(&config, &mut rng).unwrap();
        assert_eq!(state.link_prior(), 0.25);
        assert!(state.free_parameters().is_empty());
    }
}
