use std::sync::Arc;

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::{AnnotatedInteractionsArray, ProcessLink};

use crate::likelihood::InteractionCounts;
use crate::states::links::{link_out_of_range, LinksState};

/// Link selection kept as dense arrays over link and interaction indices.
///
/// `interaction_coverage[i]` counts the selected links covering interaction
/// `i`; the selection totals are updated incrementally on every toggle.
#[derive(Debug, Clone)]
pub struct ArrayLinksState {
    topology: Arc<AnnotatedInteractionsArray>,
    active_interactions: Arc<Vec<bool>>,
    num_active_interactions: usize,
    link_selections: Vec<bool>,
    interaction_coverage: Vec<u32>,
    num_selected_links: usize,
    num_selected_interactions: usize,
    num_selected_active: usize,
}

impl ArrayLinksState {
    /// Starts from `selected_indices` (empty when `None`). Every index must
    /// address a candidate link.
    pub fn new(
        topology: Arc<AnnotatedInteractionsArray>,
        active_gene_threshold: f64,
        selected_indices: Option<&[usize]>,
    ) -> Result<Self, BpnError> {
        let mask = topology.active_interaction_mask(active_gene_threshold);
        let num_active_interactions = mask.iter().filter(|flag| **flag).count();
        let mut state = Self {
            link_selections: vec![false; topology.num_links()],
            interaction_coverage: vec![0; topology.num_interactions()],
            active_interactions: Arc::new(mask),
            num_active_interactions,
            num_selected_links: 0,
            num_selected_interactions: 0,
            num_selected_active: 0,
            topology,
        };
        for &index in selected_indices.unwrap_or_default() {
            if index >= state.link_selections.len() {
                return Err(BpnError::Config(
                    ErrorInfo::new(
                        "unknown-seed-link-index",
                        "seed link index is not a candidate link",
                    )
                    .with_context("index", index.to_string())
                    .with_context("num_links", state.link_selections.len().to_string()),
                ));
            }
            if !state.link_selections[index] {
                state.flip(index);
            }
        }
        Ok(state)
    }

    /// Topology the selection refers to.
    pub fn topology(&self) -> &Arc<AnnotatedInteractionsArray> {
        &self.topology
    }

    /// Per-link selection flags.
    pub fn link_selections(&self) -> &[bool] {
        &self.link_selections
    }

    fn flip(&mut self, index: usize) {
        let selecting = !self.link_selections[index];
        self.link_selections[index] = selecting;
        if selecting {
            self.num_selected_links += 1;
        } else {
            self.num_selected_links -= 1;
        }
        for &interaction in self.topology.interactions_of_link(index) {
            let coverage = &mut self.interaction_coverage[interaction];
            let changed = if selecting {
                *coverage += 1;
                *coverage == 1
            } else {
                *coverage -= 1;
                *coverage == 0
            };
            if !changed {
                continue;
            }
            let active = self.active_interactions[interaction];
            if selecting {
                self.num_selected_interactions += 1;
                self.num_selected_active += usize::from(active);
            } else {
                self.num_selected_interactions -= 1;
                self.num_selected_active -= usize::from(active);
            }
        }
    }
}

impl PartialEq for ArrayLinksState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology)
            && self.link_selections == other.link_selections
    }
}

impl LinksState for ArrayLinksState {
    fn num_links(&self) -> usize {
        self.link_selections.len()
    }

    fn candidate_links(&self) -> &[ProcessLink] {
        self.topology.links()
    }

    fn is_selected(&self, index: usize) -> bool {
        self.link_selections.get(index).copied().unwrap_or(false)
    }

    fn num_selected(&self) -> usize {
        self.num_selected_links
    }

    fn selected_indices(&self) -> Vec<usize> {
        self.link_selections
            .iter()
            .enumerate()
            .filter(|(_, selected)| **selected)
            .map(|(index, _)| index)
            .collect()
    }

    fn toggled(&self, index: usize) -> Result<Self, BpnError> {
        if index >= self.link_selections.len() {
            return Err(link_out_of_range(index, self.link_selections.len()));
        }
        let mut next = self.clone();
        next.flip(index);
        Ok(next)
    }

    fn interaction_counts(&self) -> InteractionCounts {
        InteractionCounts::from_totals(
            self.link_selections.len(),
            self.num_selected_links,
            self.interaction_coverage.len(),
            self.num_active_interactions,
            self.num_selected_interactions,
            self.num_selected_active,
        )
    }
}
