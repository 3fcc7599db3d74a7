use std::collections::{BTreeMap, BTreeSet};

use bpn_core::BpnError;

use crate::builder::{InteractionsBuilder, InteractionsInput};
use crate::hash;
use crate::ids::{GeneId, Interaction, ProcessId, ProcessLink};

/// Object-graph view of the co-annotated interaction network.
///
/// Link indices are the positions in [`links`](Self::links), which is sorted,
/// and are shared with [`AnnotatedInteractionsArray`](crate::AnnotatedInteractionsArray).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedInteractionsGraph {
    interactions: Vec<Interaction>,
    annotations: BTreeMap<GeneId, BTreeSet<ProcessId>>,
    expression: BTreeMap<GeneId, f64>,
    links: Vec<ProcessLink>,
    link_interactions: Vec<Vec<usize>>,
    dropped_interactions: usize,
}

impl AnnotatedInteractionsGraph {
    pub(crate) fn from_parts(
        interactions: Vec<Interaction>,
        annotations: BTreeMap<GeneId, BTreeSet<ProcessId>>,
        expression: BTreeMap<GeneId, f64>,
        links: Vec<ProcessLink>,
        link_interactions: Vec<Vec<usize>>,
        dropped_interactions: usize,
    ) -> Self {
        Self {
            interactions,
            annotations,
            expression,
            links,
            link_interactions,
            dropped_interactions,
        }
    }

    /// Builds a topology from a deserialized input bundle.
    pub fn from_input(input: &InteractionsInput) -> Result<Self, BpnError> {
        InteractionsBuilder::from_input(input).build()
    }

    /// Number of co-annotated interactions retained.
    pub fn num_interactions(&self) -> usize {
        self.interactions.len()
    }

    /// All retained interactions, in index order.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Interaction stored at `index`.
    pub fn interaction(&self, index: usize) -> Option<&Interaction> {
        self.interactions.get(index)
    }

    /// Interactions dropped at build time because a gene was unannotated.
    pub fn dropped_interactions(&self) -> usize {
        self.dropped_interactions
    }

    /// Number of candidate links.
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Candidate links in index order.
    pub fn links(&self) -> &[ProcessLink] {
        &self.links
    }

    /// Index of `link` among the candidates, if it is one.
    pub fn link_index(&self, link: &ProcessLink) -> Option<usize> {
        self.links.binary_search(link).ok()
    }

    /// Whether `link` is a candidate link of this topology.
    pub fn contains_link(&self, link: &ProcessLink) -> bool {
        self.link_index(link).is_some()
    }

    /// Interaction indices covered by the link at `index`.
    pub fn interactions_of_link(&self, index: usize) -> Option<&[usize]> {
        self.link_interactions.get(index).map(Vec::as_slice)
    }

    /// Interaction indices covered by `link`.
    pub fn interactions_for(&self, link: &ProcessLink) -> Option<&[usize]> {
        self.link_index(link)
            .and_then(|index| self.interactions_of_link(index))
    }

    /// Annotated genes in sorted order.
    pub fn genes(&self) -> impl Iterator<Item = &GeneId> + '_ {
        self.annotations.keys()
    }

    /// Processes annotating `gene`.
    pub fn annotations(&self, gene: &GeneId) -> Option<&BTreeSet<ProcessId>> {
        self.annotations.get(gene)
    }

    /// Measured activity of `gene`.
    pub fn expression(&self, gene: &GeneId) -> Option<f64> {
        self.expression.get(gene).copied()
    }

    /// A gene is active when its activity is at or above `threshold`.
    /// Genes without a measurement are inactive.
    pub fn is_gene_active(&self, gene: &GeneId, threshold: f64) -> bool {
        self.expression(gene)
            .map(|value| value >= threshold)
            .unwrap_or(false)
    }

    /// Indices of interactions whose two genes are both active.
    pub fn active_interactions(&self, threshold: f64) -> BTreeSet<usize> {
        self.interactions
            .iter()
            .enumerate()
            .filter(|(_, interaction)| {
                let (a, b) = interaction.genes();
                self.is_gene_active(a, threshold) && self.is_gene_active(b, threshold)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Canonical SHA-256 hash of the topology inputs.
    pub fn canonical_hash(&self) -> String {
        hash::canonical_hash(self)
    }

    pub(crate) fn annotation_map(&self) -> &BTreeMap<GeneId, BTreeSet<ProcessId>> {
        &self.annotations
    }

    pub(crate) fn expression_map(&self) -> &BTreeMap<GeneId, f64> {
        &self.expression
    }
}
