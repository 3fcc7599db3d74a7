use serde::{Deserialize, Serialize};

use crate::states::parameters::ParameterValues;

/// Finite stand-in for `ln(0)`.
///
/// Any term `n * ln(0)` with `n > 0` contributes this value, and totals are
/// clamped to it, so comparisons between degenerate states stay defined.
pub const LOG_ZERO: f64 = -1.0e300;

/// Observation counts sufficient to evaluate the likelihood of a state.
///
/// An interaction is "selected" when at least one selected link covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionCounts {
    /// Links currently selected.
    pub selected_links: usize,
    /// Candidate links not selected.
    pub unselected_links: usize,
    /// Active interactions covered by a selected link.
    pub selected_active: usize,
    /// Inactive interactions covered by a selected link.
    pub selected_inactive: usize,
    /// Active interactions not covered by any selected link.
    pub unselected_active: usize,
    /// Inactive interactions not covered by any selected link.
    pub unselected_inactive: usize,
}

impl InteractionCounts {
    /// Derives the six counts from topology totals and selection totals.
    ///
    /// Callers guarantee `selected_links <= total_links`,
    /// `selected_active <= selected_interactions <= total_interactions` and
    /// `selected_active <= total_active`.
    pub(crate) fn from_totals(
        total_links: usize,
        selected_links: usize,
        total_interactions: usize,
        total_active: usize,
        selected_interactions: usize,
        selected_active: usize,
    ) -> Self {
        let selected_inactive = selected_interactions - selected_active;
        let unselected_active = total_active - selected_active;
        let unselected_inactive = (total_interactions - total_active) - selected_inactive;
        Self {
            selected_links,
            unselected_links: total_links - selected_links,
            selected_active,
            selected_inactive,
            unselected_active,
            unselected_inactive,
        }
    }
}

/// Natural-log likelihood of the observed interaction activity.
///
/// Unselected interactions are observed active with probability `alpha`;
/// selected interactions are observed inactive with probability `beta`;
/// each link is selected a priori with probability `link_prior`.
pub fn log_likelihood(counts: &InteractionCounts, params: &ParameterValues) -> f64 {
    let unselected = weighted_log(counts.unselected_active, params.alpha)
        + weighted_log(counts.unselected_inactive, 1.0 - params.alpha);
    let selected = weighted_log(counts.selected_inactive, params.beta)
        + weighted_log(counts.selected_active, 1.0 - params.beta);
    let prior = weighted_log(counts.selected_links, params.link_prior)
        + weighted_log(counts.unselected_links, 1.0 - params.link_prior);
    let total = unselected + selected + prior;
    if total.is_nan() {
        LOG_ZERO
    } else {
        total.max(LOG_ZERO)
    }
}

/// `count * ln(probability)` with `0 * ln(0) = 0`.
fn weighted_log(count: usize, probability: f64) -> f64 {
    if count == 0 {
        0.0
    } else if probability <= 0.0 {
        LOG_ZERO
    } else {
        count as f64 * probability.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(alpha: f64, beta: f64, link_prior: f64) -> ParameterValues {
        ParameterValues {
            alpha,
            beta,
            link_prior,
        }
    }

    #[test]
    fn matches_hand_computed_value() {
        let counts = InteractionCounts {
            selected_links: 1,
            unselected_links: 2,
            selected_active: 2,
            selected_inactive: 1,
            unselected_active: 1,
            unselected_inactive: 3,
        };
        let p = params(0.1, 0.2, 0.3);
        let expected = 0.1f64.ln()
            + 3.0 * 0.9f64.ln()
            + 0.2f64.ln()
            + 2.0 * 0.8f64.ln()
            + 0.3f64.ln()
            + 2.0 * 0.7f64.ln();
        assert!((log_likelihood(&counts, &p) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_count_terms_ignore_degenerate_probabilities() {
        let counts = InteractionCounts {
            selected_links: 0,
            unselected_links: 3,
            unselected_inactive: 4,
            ..InteractionCounts::default()
        };
        let value = log_likelihood(&counts, &params(0.0, 1.0, 0.0));
        assert_eq!(value, 0.0);
    }

    #[test]
    fn impossible_observations_hit_the_sentinel() {
        let counts = InteractionCounts {
            unselected_active: 5,
            unselected_links: 1,
            ..InteractionCounts::default()
        };
        let value = log_likelihood(&counts, &params(0.0, 0.5, 0.5));
        assert!(value.is_finite());
        assert!(value <= LOG_ZERO * 0.5);
        let worse = log_likelihood(
            &InteractionCounts {
                selected_links: 1,
                ..counts
            },
            &params(0.0, 0.5, 1.0),
        );
        assert_eq!(worse, LOG_ZERO);
        assert!(!(worse - value).is_nan());
    }

    #[test]
    fn totals_partition_interactions() {
        let counts = InteractionCounts::from_totals(5, 2, 10, 4, 6, 3);
        assert_eq!(counts.unselected_links, 3);
        assert_eq!(counts.selected_inactive, 3);
        assert_eq!(counts.unselected_active, 1);
        assert_eq!(counts.unselected_inactive, 3);
    }
}
