use bpn_graph::{AnnotatedInteractionsArray, InteractionsBuilder};
use proptest::prelude::*;

proptest! {
    #[test]
    fn array_layout_mirrors_graph(
        edges in proptest::collection::vec((0usize..8, 0usize..8), 1..24),
        terms in proptest::collection::vec(proptest::collection::btree_set(0usize..4, 0..3), 8),
        values in proptest::collection::vec(0.0f64..2.0, 8),
        threshold in 0.0f64..2.0,
    ) {
        let mut builder = InteractionsBuilder::new();
        for (a, b) in edges {
            if a != b {
                builder.add_interaction(format!("g{a}"), format!("g{b}"));
            }
        }
        for (gene, set) in terms.iter().enumerate() {
            for term in set {
                builder.annotate(format!("g{gene}"), format!("P{term}"));
            }
        }
        for (gene, value) in values.iter().enumerate() {
            builder.set_expression(format!("g{gene}"), *value);
        }
        let graph = builder.build().unwrap();
        let array = AnnotatedInteractionsArray::from_graph(&graph);

        prop_assert_eq!(array.links(), graph.links());
        prop_assert_eq!(array.num_interactions(), graph.num_interactions());
        for index in 0..graph.num_links() {
            prop_assert_eq!(array.interactions_of_link(index), graph.interactions_of_link(index).unwrap());
        }
        let mask = array.active_interaction_mask(threshold);
        let active = graph.active_interactions(threshold);
        for (index, flag) in mask.iter().enumerate() {
            prop_assert_eq!(*flag, active.contains(&index));
        }
        prop_assert_eq!(array.canonical_hash(), graph.canonical_hash());
    }
}

#[test]
fn out_of_range_link_has_no_members() {
    let mut builder = InteractionsBuilder::new();
    builder.add_interaction("g1", "g2").annotate("g1", "A").annotate("g2", "B");
    let array = AnnotatedInteractionsArray::from_graph(&builder.build().unwrap());
    assert!(array.interactions_of_link(5).is_empty());
    assert_eq!(array.interactions_of_link(0), &[0]);
}
