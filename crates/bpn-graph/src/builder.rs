use std::collections::{BTreeMap, BTreeSet};

use bpn_core::errors::{BpnError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::graph::AnnotatedInteractionsGraph;
use crate::ids::{GeneId, Interaction, ProcessId, ProcessLink};

/// Serde-friendly bundle of the raw inputs needed to build a topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionsInput {
    /// Observed gene-gene interactions.
    #[serde(default)]
    pub interactions: Vec<(GeneId, GeneId)>,
    /// Process annotations per gene.
    #[serde(default)]
    pub annotations: BTreeMap<GeneId, BTreeSet<ProcessId>>,
    /// Measured activity per gene.
    #[serde(default)]
    pub expression: BTreeMap<GeneId, f64>,
}

/// Incremental builder for [`AnnotatedInteractionsGraph`].
#[derive(Debug, Clone, Default)]
pub struct InteractionsBuilder {
    interactions: Vec<(GeneId, GeneId)>,
    annotations: BTreeMap<GeneId, BTreeSet<ProcessId>>,
    expression: BTreeMap<GeneId, f64>,
}

impl InteractionsBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a builder from a deserialized input bundle.
    pub fn from_input(input: &InteractionsInput) -> Self {
        Self {
            interactions: input.interactions.clone(),
            annotations: input.annotations.clone(),
            expression: input.expression.clone(),
        }
    }

    /// Records an interaction between two genes.
    pub fn add_interaction(&mut self, a: impl Into<GeneId>, b: impl Into<GeneId>) -> &mut Self {
        self.interactions.push((a.into(), b.into()));
        self
    }

    /// Annotates `gene` with `process`.
    pub fn annotate(&mut self, gene: impl Into<GeneId>, process: impl Into<ProcessId>) -> &mut Self {
        self.annotations
            .entry(gene.into())
            .or_default()
            .insert(process.into());
        self
    }

    /// Sets the measured activity of `gene`, replacing any earlier value.
    pub fn set_expression(&mut self, gene: impl Into<GeneId>, value: f64) -> &mut Self {
        self.expression.insert(gene.into(), value);
        self
    }

    /// Validates the inputs and derives the candidate link set.
    pub fn build(&self) -> Result<AnnotatedInteractionsGraph, BpnError> {
        for (gene, value) in &self.expression {
            if !value.is_finite() {
                return Err(BpnError::Topology(
                    ErrorInfo::new("non-finite-expression", "expression values must be finite")
                        .with_context("gene", gene.as_str())
                        .with_context("value", value.to_string()),
                ));
            }
        }

        let mut normalised = BTreeSet::new();
        for (a, b) in &self.interactions {
            if a == b {
                return Err(BpnError::Topology(
                    ErrorInfo::new("self-interaction", "a gene cannot interact with itself")
                        .with_context("gene", a.as_str()),
                ));
            }
            normalised.insert(Interaction::new(a.clone(), b.clone()));
        }

        let is_annotated = |gene: &GeneId| {
            self.annotations
                .get(gene)
                .map(|terms| !terms.is_empty())
                .unwrap_or(false)
        };
        let total = normalised.len();
        let interactions: Vec<Interaction> = normalised
            .into_iter()
            .filter(|interaction| {
                let (a, b) = interaction.genes();
                is_annotated(a) && is_annotated(b)
            })
            .collect();
        let dropped = total - interactions.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                kept = interactions.len(),
                "dropping interactions without annotations on both genes"
            );
        }

        let mut members: BTreeMap<ProcessLink, BTreeSet<usize>> = BTreeMap::new();
        for (index, interaction) in interactions.iter().enumerate() {
            let (a, b) = interaction.genes();
            let (Some(terms_a), Some(terms_b)) = (self.annotations.get(a), self.annotations.get(b))
            else {
                continue;
            };
            for p in terms_a {
                for q in terms_b {
                    members
                        .entry(ProcessLink::new(p.clone(), q.clone()))
                        .or_default()
                        .insert(index);
                }
            }
        }

        let (links, link_interactions): (Vec<_>, Vec<_>) = members
            .into_iter()
            .map(|(link, set)| (link, set.into_iter().collect::<Vec<_>>()))
            .unzip();

        tracing::debug!(
            interactions = interactions.len(),
            links = links.len(),
            "built annotated interactions graph"
        );

        Ok(AnnotatedInteractionsGraph::from_parts(
            interactions,
            self.annotations.clone(),
            self.expression.clone(),
            links,
            link_interactions,
            dropped,
        ))
    }
}
