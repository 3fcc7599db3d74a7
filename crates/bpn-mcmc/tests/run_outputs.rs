use std::fs;

use bpn_mcmc::{run_array, run_graph, RecorderSummary, RunManifest, StateLayout};


#[test]
fn run_directory_receives_trace_recorder_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::free_parameter_config(120);
    config.output.run_directory = Some(dir.path().join("run"));
    config.seed_policy.label = Some("outputs".into());
    let graph = fixtures::pathway_graph();
    let summary = run_graph(&config, 13, graph.clone()).unwrap();

    let trace = fs::read_to_string(summary.trace_path.as_ref().unwrap()).unwrap();
    let mut lines = trace.lines();
    assert_eq!(
        lines.next(),
        Some("step,temperature,transition,num_selected,alpha,beta,link_prior,log_likelihood")
    );
    assert_eq!(lines.count(), summary.accepted);

    let recorder: RecorderSummary = serde_json::from_str(
        &fs::read_to_string(summary.recorder_path.as_ref().unwrap()).unwrap(),
    )
    .unwrap();
    assert_eq!(recorder, summary.recorder);

    let manifest = RunManifest::load(summary.manifest_path.as_ref().unwrap()).unwrap();
    assert_eq!(manifest.layout, StateLayout::Graph);
    assert_eq!(manifest.master_seed, 13);
    assert_eq!(manifest.seed_label.as_deref(), Some("outputs"));
    assert_eq!(manifest.provenance.topology_hash, graph.canonical_hash());
    assert_eq!(manifest.provenance.seed, 13);
    assert!(!manifest.provenance.created_at.is_empty());
    assert_eq!(manifest.steps, 120);
    assert_eq!(manifest.final_log_likelihood, summary.final_log_likelihood);
    assert_eq!(manifest.final_parameters, summary.final_parameters);
    assert_eq!(manifest.final_links, summary.final_links);
    assert_eq!(manifest.config, config);
}

#[test]
fn array_manifest_records_its_layout() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fixtures::free_parameter_config(20);
    config.output.run_directory = Some(dir.path().to_path_buf());
    let array = fixtures::pathway_array();
    let summary = run_array(&config, 1, array.clone()).unwrap();
    let manifest = RunManifest::load(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(manifest.layout, StateLayout::Array);
    assert_eq!(manifest.provenance.topology_hash, array.canonical_hash());
    assert_eq!(summary.manifest_path, Some(dir.path().join("manifest.json")));
}

#[test]
fn nothing_is_written_without_a_run_directory() {
    let summary = run_graph(&fixtures::free_parameter_config(5), 1, fixtures::pathway_graph())
        .unwrap();
    assert!(summary.trace_path.is_none());
    assert!(summary.manifest_path.is_none());
}

#[test]
fn loading_a_missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = RunManifest::load(&dir.path().join("manifest.json")).unwrap_err();
    assert_eq!(err.info().code, "manifest-read");
}
