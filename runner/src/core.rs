use std::collections::BTreeMap;

use config::shared::PipelineConfig;
use conveyor::pipeline::Pipeline;
use conveyor::sink::memory::MemorySink;
use tracing::{info, warn};

/// Runs one pipeline to completion and logs its report.
pub async fn run_pipeline(config: PipelineConfig) -> anyhow::Result<()> {
    info!(
        items = config.items,
        stage_capacity = config.stage_capacity,
        transformers = config.transformers,
        work_jitter_ms = config.work_jitter_ms,
        "starting conveyor"
    );

    let sink = MemorySink::new();

    let mut pipeline = Pipeline::new(config, sink.clone())?;
    pipeline.start()?;

    let report = pipeline.wait().await?.teardown().await?;

    for summary in &report.workers {
        info!(role = %summary.role, handled = summary.handled, "worker summary");
    }

    let mut by_label = BTreeMap::new();
    let mut by_kind = BTreeMap::new();
    for item in sink.items().await {
        *by_kind.entry(item.kind).or_insert(0u64) += 1;

        match item.label {
            Some(label) => *by_label.entry(label).or_insert(0u64) += 1,
            None => warn!(sequence = item.sequence, "consumed item carries no label"),
        }
    }

    for (label, count) in by_label {
        info!(transformer = %label, count, "items relabeled by transformer");
    }
    for (kind, count) in by_kind {
        info!(%kind, count, "items consumed by kind");
    }

    info!(
        produced = report.produced,
        relabeled = report.relabeled,
        consumed = report.consumed,
        stage_a_high_water_mark = report.stage_a.high_water_mark,
        stage_b_high_water_mark = report.stage_b.high_water_mark,
        "conveyor finished"
    );

    Ok(())
}
