use std::time::Duration;

use config::shared::PipelineConfig;
use tokio::time::timeout;

use crate::error::ConveyorResult;
use crate::pipeline::{Pipeline, PipelineReport, Roster};
use crate::sink::Sink;

/// Upper bound for a whole pipeline run in tests.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(20);

/// Builds a configuration for `items` items through stages of `stage_capacity` slots.
pub fn test_config(items: u64, stage_capacity: usize, transformers: u16) -> PipelineConfig {
    PipelineConfig {
        items,
        stage_capacity,
        ..PipelineConfig::with_transformers(transformers)
    }
}

/// Runs `roster` to completion and tears the pipeline down.
///
/// # Panics
///
/// Panics if the run does not finish within [`DEFAULT_RUN_TIMEOUT`], which means some worker
/// never terminated.
pub async fn run_roster<S>(
    config: PipelineConfig,
    sink: S,
    roster: Roster,
) -> ConveyorResult<PipelineReport>
where
    S: Sink + Send + Sync + 'static,
{
    let run = async move {
        let mut pipeline = Pipeline::new(config, sink)?;
        pipeline.start_with_roster(roster)?;
        pipeline.wait().await?.teardown().await
    };

    match timeout(DEFAULT_RUN_TIMEOUT, run).await {
        Ok(result) => result,
        Err(_) => panic!("pipeline did not terminate within {DEFAULT_RUN_TIMEOUT:?}"),
    }
}

/// Runs the standard roster for `config` to completion.
pub async fn run_pipeline<S>(config: PipelineConfig, sink: S) -> ConveyorResult<PipelineReport>
where
    S: Sink + Send + Sync + 'static,
{
    let roster = Roster::standard(config.transformers);
    run_roster(config, sink, roster).await
}
