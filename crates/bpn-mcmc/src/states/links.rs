use std::fmt;

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::ProcessLink;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::likelihood::InteractionCounts;

/// Change applied by a link transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToggle {
    /// Index of the toggled link among the candidates.
    pub index: usize,
    /// Identity of the toggled link.
    pub link: ProcessLink,
    /// Whether the link is selected after the toggle.
    pub selected: bool,
}

/// Link selection over a fixed candidate set.
///
/// Implementations are value snapshots: [`toggled`](LinksState::toggled)
/// returns a new state and leaves `self` untouched.
pub trait LinksState: Clone + fmt::Debug + Send + Sync {
    /// Number of candidate links.
    fn num_links(&self) -> usize;

    /// Candidate links in index order.
    fn candidate_links(&self) -> &[ProcessLink];

    /// Whether the link at `index` is selected.
    fn is_selected(&self, index: usize) -> bool;

    /// Number of selected links.
    fn num_selected(&self) -> usize;

    /// Indices of the selected links in ascending order.
    fn selected_indices(&self) -> Vec<usize>;

    /// New state with the link at `index` flipped.
    fn toggled(&self, index: usize) -> Result<Self, BpnError>;

    /// Counts feeding the likelihood for this selection.
    fn interaction_counts(&self) -> InteractionCounts;

    /// Selected links in index order.
    fn selected_links(&self) -> Vec<ProcessLink> {
        let candidates = self.candidate_links();
        self.selected_indices()
            .into_iter()
            .map(|index| candidates[index].clone())
            .collect()
    }

    /// Toggles one link drawn uniformly from the candidates.
    fn propose_transition<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Self, LinkToggle), BpnError> {
        let count = self.num_links();
        if count == 0 {
            return Err(BpnError::State(ErrorInfo::new(
                "no-candidate-links",
                "the topology has no links to toggle",
            )));
        }
        let index = rng.gen_range(0..count);
        let next = self.toggled(index)?;
        let toggle = LinkToggle {
            index,
            link: self.candidate_links()[index].clone(),
            selected: next.is_selected(index),
        };
        Ok((next, toggle))
    }
}

pub(crate) fn link_out_of_range(index: usize, count: usize) -> BpnError {
    BpnError::State(
        ErrorInfo::new("link-out-of-range", "link index is not a candidate link")
            .with_context("index", index.to_string())
            .with_context("num_links", count.to_string()),
    )
}
