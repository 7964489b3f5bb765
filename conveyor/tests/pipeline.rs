#![cfg(feature = "test-utils")]

use std::collections::{HashMap, HashSet};

use config::shared::{PipelineConfig, QuotaConfig};
use conveyor::error::ErrorKind;
use conveyor::pipeline::{Pipeline, Roster};
use conveyor::sink::memory::MemorySink;
use conveyor::test_utils::pipeline::{run_pipeline, run_roster, test_config};
use conveyor::test_utils::sink::{FailingSink, TestSinkWrapper};
use conveyor::types::{ItemKind, TransformerId};
use conveyor::workers::base::WorkerRole;
use telemetry::tracing::init_test_tracing;

#[tokio::test(flavor = "multi_thread")]
async fn default_scenario_moves_every_item_and_rests() {
    init_test_tracing();

    let sink = TestSinkWrapper::wrap(MemorySink::new());
    let report = run_pipeline(test_config(10, 5, 2), sink.clone())
        .await
        .unwrap();

    assert_eq!(report.produced, 10);
    assert_eq!(report.relabeled, 10);
    assert_eq!(report.consumed, 10);
    assert_eq!(report.workers.len(), 5);

    for stage in [report.stage_a, report.stage_b] {
        assert!(stage.is_at_rest());
        assert_eq!(stage.free_slots, 5);
        assert_eq!(stage.filled_slots, 0);
    }

    assert_eq!(sink.items().await.len(), 10);
    assert!(sink.shutdown_called().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_items_terminates_without_touching_the_stages() {
    init_test_tracing();

    let sink = MemorySink::new();
    let report = run_pipeline(test_config(0, 5, 3), sink.clone())
        .await
        .unwrap();

    assert_eq!(report.produced + report.relabeled + report.consumed, 0);
    assert!(report.workers.iter().all(|summary| summary.handled == 0));
    assert_eq!(report.stage_a.high_water_mark, 0);
    assert_eq!(report.stage_b.high_water_mark, 0);
    assert!(sink.is_empty().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_slot_stages_still_drain_every_item() {
    init_test_tracing();

    let sink = MemorySink::new();
    let report = run_pipeline(test_config(5, 1, 1), sink.clone())
        .await
        .unwrap();

    assert_eq!(report.consumed, 5);
    assert_eq!(report.stage_a.high_water_mark, 1);
    assert_eq!(report.stage_b.high_water_mark, 1);
    assert_eq!(sink.len().await, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn every_role_meets_its_quota_exactly() {
    init_test_tracing();

    for transformers in [1, 2, 4, 8] {
        let report = run_pipeline(test_config(25, 3, transformers), MemorySink::new())
            .await
            .unwrap();

        assert_eq!(report.produced, 25, "transformers = {transformers}");
        assert_eq!(report.relabeled, 25, "transformers = {transformers}");
        assert_eq!(report.consumed, 25, "transformers = {transformers}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn items_are_neither_lost_nor_duplicated() {
    init_test_tracing();

    let sink = MemorySink::new();
    let config = PipelineConfig {
        work_jitter_ms: 2,
        ..test_config(40, 4, 3)
    };
    run_pipeline(config, sink.clone()).await.unwrap();

    let mut sequences: Vec<_> = sink.items().await.iter().map(|item| item.sequence).collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=40).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn occupancy_never_exceeds_capacity() {
    init_test_tracing();

    let report = run_pipeline(test_config(60, 2, 4), MemorySink::new())
        .await
        .unwrap();

    assert!(report.stage_a.high_water_mark <= 2);
    assert!(report.stage_b.high_water_mark <= 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_producer_and_transformer_preserve_order() {
    init_test_tracing();

    let sink = MemorySink::new();
    let report = run_roster(
        test_config(12, 3, 1),
        sink.clone(),
        Roster::new(vec![ItemKind::Second], 1),
    )
    .await
    .unwrap();

    assert_eq!(report.workers.len(), 3);

    let items = sink.items().await;
    let sequences: Vec<_> = items.iter().map(|item| item.sequence).collect();
    assert_eq!(sequences, (1..=12).collect::<Vec<_>>());
    assert!(items.iter().all(|item| item.kind == ItemKind::Second));
}

#[tokio::test(flavor = "multi_thread")]
async fn every_item_is_labeled_by_a_spawned_transformer() {
    init_test_tracing();

    let sink = MemorySink::new();
    let report = run_pipeline(test_config(30, 5, 3), sink.clone())
        .await
        .unwrap();

    let spawned: HashSet<_> = (0..3).map(TransformerId::new).collect();
    let mut per_label: HashMap<TransformerId, u64> = HashMap::new();
    for item in sink.items().await {
        let label = item.label.expect("consumed item must be labeled");
        assert!(spawned.contains(&label));
        *per_label.entry(label).or_default() += 1;
    }

    // Each transformer's summary matches the items carrying its label.
    for summary in &report.workers {
        if let WorkerRole::Transformer { id } = summary.role {
            assert_eq!(per_label.get(&id).copied().unwrap_or(0), summary.handled);
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn both_kinds_share_the_production_quota() {
    init_test_tracing();

    let sink = MemorySink::new();
    let report = run_pipeline(test_config(20, 5, 2), sink.clone())
        .await
        .unwrap();

    let produced_by_kind: u64 = report
        .workers
        .iter()
        .filter(|summary| matches!(summary.role, WorkerRole::Producer { .. }))
        .map(|summary| summary.handled)
        .sum();
    assert_eq!(produced_by_kind, 20);

    let items = sink.items().await;
    for kind in ItemKind::ALL {
        let expected = report
            .workers
            .iter()
            .find(|summary| summary.role == WorkerRole::Producer { kind })
            .map(|summary| summary.handled)
            .unwrap();
        let actual = items.iter().filter(|item| item.kind == kind).count() as u64;
        assert_eq!(actual, expected);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn sink_failure_fails_the_pipeline_without_hanging() {
    init_test_tracing();

    let sink = FailingSink::new(3);
    let err = run_pipeline(test_config(10, 2, 2), sink.clone())
        .await
        .unwrap_err();

    assert!(err.kinds().contains(&ErrorKind::SinkError));
    assert_eq!(sink.accepted().await, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_configuration_is_rejected_before_spawning() {
    init_test_tracing();

    let zero_capacity = test_config(10, 0, 2);
    let err = Pipeline::new(zero_capacity, MemorySink::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);

    let mismatched_quota = PipelineConfig {
        quotas: QuotaConfig {
            relabel: Some(9),
            ..QuotaConfig::default()
        },
        ..test_config(10, 5, 2)
    };
    let err = Pipeline::new(mismatched_quota, MemorySink::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_without_transformers_is_rejected() {
    init_test_tracing();

    let mut pipeline = Pipeline::new(test_config(4, 2, 1), MemorySink::new()).unwrap();
    let err = pipeline
        .start_with_roster(Roster::new(vec![ItemKind::First], 0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_consumer_is_rejected() {
    init_test_tracing();

    let mut pipeline = Pipeline::new(test_config(0, 2, 1), MemorySink::new()).unwrap();
    pipeline.spawn(WorkerRole::Consumer).unwrap();

    let err = pipeline.spawn(WorkerRole::Consumer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);

    pipeline.wait().await.unwrap().teardown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn teardown_rejects_a_stage_that_is_not_at_rest() {
    init_test_tracing();

    let mut pipeline = Pipeline::new(test_config(3, 5, 1), MemorySink::new()).unwrap();
    pipeline
        .spawn(WorkerRole::Producer {
            kind: ItemKind::First,
        })
        .unwrap();

    let finished = pipeline.wait().await.unwrap();
    assert_eq!(finished.workers()[0].handled, 3);

    let err = finished.teardown().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(err.detail().unwrap().contains("stage_a"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sink_condition_fires_while_the_pipeline_runs() {
    init_test_tracing();

    let sink = TestSinkWrapper::wrap(MemorySink::new());
    let halfway = sink.wait_for_items(8).await;

    let mut pipeline = Pipeline::new(test_config(16, 2, 2), sink.clone()).unwrap();
    pipeline.start().unwrap();

    halfway.notified().await;
    assert!(sink.items().await.len() >= 8);

    let report = pipeline.wait().await.unwrap().teardown().await.unwrap();
    assert_eq!(report.consumed, 16);
}
