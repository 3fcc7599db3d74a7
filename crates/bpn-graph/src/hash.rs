use sha2::{Digest, Sha256};

use crate::graph::AnnotatedInteractionsGraph;

/// Computes the canonical structural hash for the provided topology.
///
/// Covers genes, their annotations and expression values, and the retained
/// interactions. Collections are iterated in their sorted order so the hash
/// does not depend on insertion order.
pub fn canonical_hash(graph: &AnnotatedInteractionsGraph) -> String {
    let mut hasher = Sha256::new();

    let annotations = graph.annotation_map();
    hasher.update(b"annotations");
    hasher.update((annotations.len() as u64).to_le_bytes());
    for (gene, terms) in annotations {
        update_str(gene.as_str(), &mut hasher);
        hasher.update((terms.len() as u64).to_le_bytes());
        for term in terms {
            update_str(term.as_str(), &mut hasher);
        }
    }

    let expression = graph.expression_map();
    hasher.update(b"expression");
    hasher.update((expression.len() as u64).to_le_bytes());
    for (gene, value) in expression {
        update_str(gene.as_str(), &mut hasher);
        hasher.update(value.to_bits().to_le_bytes());
    }

    hasher.update(b"interactions");
    hasher.update((graph.num_interactions() as u64).to_le_bytes());
    for interaction in graph.interactions() {
        let (a, b) = interaction.genes();
        update_str(a.as_str(), &mut hasher);
        update_str(b.as_str(), &mut hasher);
    }

    format!("{:x}", hasher.finalize())
}

fn update_str(value: &str, hasher: &mut Sha256) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
