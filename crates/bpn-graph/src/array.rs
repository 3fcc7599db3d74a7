use std::collections::BTreeMap;

use crate::graph::AnnotatedInteractionsGraph;
use crate::ids::{GeneId, ProcessLink};

/// Dense, index-based view of an [`AnnotatedInteractionsGraph`].
///
/// Links and interactions are addressed purely by index. The link to
/// interaction relation is stored in CSR form: the members of link `i` are
/// `link_members[link_offsets[i]..link_offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedInteractionsArray {
    links: Vec<ProcessLink>,
    link_offsets: Vec<usize>,
    link_members: Vec<usize>,
    interaction_genes: Vec<[usize; 2]>,
    genes: Vec<GeneId>,
    gene_expression: Vec<Option<f64>>,
    topology_hash: String,
}

impl AnnotatedInteractionsArray {
    /// Flattens the object graph into arrays. Link indices are preserved.
    pub fn from_graph(graph: &AnnotatedInteractionsGraph) -> Self {
        let genes: Vec<GeneId> = graph.genes().cloned().collect();
        let gene_index: BTreeMap<&GeneId, usize> = genes
            .iter()
            .enumerate()
            .map(|(index, gene)| (gene, index))
            .collect();
        let gene_expression = genes.iter().map(|gene| graph.expression(gene)).collect();

        let interaction_genes = graph
            .interactions()
            .iter()
            .map(|interaction| {
                let (a, b) = interaction.genes();
                // Retained interactions only reference annotated genes.
                [gene_index[a], gene_index[b]]
            })
            .collect();

        let mut link_offsets = Vec::with_capacity(graph.num_links() + 1);
        let mut link_members = Vec::new();
        link_offsets.push(0);
        for index in 0..graph.num_links() {
            if let Some(members) = graph.interactions_of_link(index) {
                link_members.extend_from_slice(members);
            }
            link_offsets.push(link_members.len());
        }

        Self {
            links: graph.links().to_vec(),
            link_offsets,
            link_members,
            interaction_genes,
            genes,
            gene_expression,
            topology_hash: graph.canonical_hash(),
        }
    }

    /// Number of candidate links.
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    /// Number of interactions.
    pub fn num_interactions(&self) -> usize {
        self.interaction_genes.len()
    }

    /// Candidate links in index order.
    pub fn links(&self) -> &[ProcessLink] {
        &self.links
    }

    /// Index of `link` among the candidates.
    pub fn link_index(&self, link: &ProcessLink) -> Option<usize> {
        self.links.binary_search(link).ok()
    }

    /// Interaction indices covered by the link at `index`; empty when out of range.
    pub fn interactions_of_link(&self, index: usize) -> &[usize] {
        match (self.link_offsets.get(index), self.link_offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => &self.link_members[start..end],
            _ => &[],
        }
    }

    /// Genes in index order.
    pub fn genes(&self) -> &[GeneId] {
        &self.genes
    }

    /// Per-gene activity flags at `threshold`.
    pub fn active_gene_mask(&self, threshold: f64) -> Vec<bool> {
        self.gene_expression
            .iter()
            .map(|value| value.map(|v| v >= threshold).unwrap_or(false))
            .collect()
    }

    /// Per-interaction activity flags: both genes active at `threshold`.
    pub fn active_interaction_mask(&self, threshold: f64) -> Vec<bool> {
        let genes = self.active_gene_mask(threshold);
        self.interaction_genes
            .iter()
            .map(|[a, b]| genes[*a] && genes[*b])
            .collect()
    }

    /// Canonical hash of the source graph.
    pub fn canonical_hash(&self) -> &str {
        &self.topology_hash
    }
}

impl From<&AnnotatedInteractionsGraph> for AnnotatedInteractionsArray {
    fn from(graph: &AnnotatedInteractionsGraph) -> Self {
        Self::from_graph(graph)
    }
}
