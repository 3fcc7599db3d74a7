use std::collections::BTreeSet;
use std::sync::Arc;

use bpn_core::errors::{BpnError, ErrorInfo};
use bpn_graph::{AnnotatedInteractionsGraph, ProcessLink};

use crate::likelihood::InteractionCounts;
use crate::states::links::{link_out_of_range, LinksState};

/// Link selection kept as an ordered set of [`ProcessLink`] values.
///
/// Counts are recomputed from the topology on demand, which makes this the
/// reference path for the likelihood.
#[derive(Debug, Clone)]
pub struct PlnLinksState {
    topology: Arc<AnnotatedInteractionsGraph>,
    active_interactions: Arc<BTreeSet<usize>>,
    selected: BTreeSet<ProcessLink>,
}

impl PlnLinksState {
    /// Starts from `selected_links` (empty when `None`). Every seed must be a
    /// candidate link of `topology`.
    pub fn new(
        topology: Arc<AnnotatedInteractionsGraph>,
        active_gene_threshold: f64,
        selected_links: Option<&[ProcessLink]>,
    ) -> Result<Self, BpnError> {
        let mut selected = BTreeSet::new();
        for link in selected_links.unwrap_or_default() {
            if !topology.contains_link(link) {
                return Err(BpnError::Config(
                    ErrorInfo::new("unknown-seed-link", "seed link is not a candidate link")
                        .with_context("link", link.to_string()),
                ));
            }
            selected.insert(link.clone());
        }
        let active_interactions = Arc::new(topology.active_interactions(active_gene_threshold));
        Ok(Self {
            topology,
            active_interactions,
            selected,
        })
    }

    /// All candidate process links.
    pub fn process_links(&self) -> &[ProcessLink] {
        self.topology.links()
    }

    /// Currently selected links.
    pub fn selected(&self) -> &BTreeSet<ProcessLink> {
        &self.selected
    }

    /// Topology the selection refers to.
    pub fn topology(&self) -> &Arc<AnnotatedInteractionsGraph> {
        &self.topology
    }

    fn selected_interactions(&self) -> BTreeSet<usize> {
        self.selected
            .iter()
            .filter_map(|link| self.topology.interactions_for(link))
            .flat_map(|members| members.iter().copied())
            .collect()
    }
}

impl PartialEq for PlnLinksState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology) && self.selected == other.selected
    }
}

impl LinksState for PlnLinksState {
    fn num_links(&self) -> usize {
        self.topology.num_links()
    }

    fn candidate_links(&self) -> &[ProcessLink] {
        self.topology.links()
    }

    fn is_selected(&self, index: usize) -> bool {
        self.topology
            .links()
            .get(index)
            .map(|link| self.selected.contains(link))
            .unwrap_or(false)
    }

    fn num_selected(&self) -> usize {
        self.selected.len()
    }

    fn selected_indices(&self) -> Vec<usize> {
        // BTreeSet order matches the sorted candidate order.
        self.selected
            .iter()
            .filter_map(|link| self.topology.link_index(link))
            .collect()
    }

    fn toggled(&self, index: usize) -> Result<Self, BpnError> {
        let link = self
            .topology
            .links()
            .get(index)
            .ok_or_else(|| link_out_of_range(index, self.num_links()))?;
        let mut next = self.clone();
        if !next.selected.remove(link) {
            next.selected.insert(link.clone());
        }
        Ok(next)
    }

    fn interaction_counts(&self) -> InteractionCounts {
        let covered = self.selected_interactions();
        let selected_active = covered
            .iter()
            .filter(|index| self.active_interactions.contains(*index))
            .count();
        InteractionCounts::from_totals(
            self.topology.num_links(),
            self.selected.len(),
            self.topology.num_interactions(),
            self.active_interactions.len(),
            covered.len(),
            selected_active,
        )
    }
}
