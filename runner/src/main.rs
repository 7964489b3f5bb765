//! Conveyor pipeline binary.
//!
//! Resolves the pipeline configuration from flags, configuration files or an interactive
//! prompt, runs one pipeline to completion and logs what it moved.

use anyhow::Context;
use clap::Parser;
use config::load_config;
use config::shared::{PipelineConfig, RunnerConfig};
use telemetry::tracing::init_tracing;
use tracing::{error, info};

use crate::core::run_pipeline;
use crate::prompt::ask_transformer_count;

mod core;
mod prompt;

/// Runs producers, transformers and a consumer over two bounded stages.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of items moved end to end.
    #[arg(long)]
    items: Option<u64>,

    /// Number of slots in each stage.
    #[arg(long)]
    capacity: Option<usize>,

    /// Number of transformers. Asked interactively when omitted.
    #[arg(long)]
    transformers: Option<u16>,

    /// Upper bound of the random pause taken at every hand-off, in milliseconds.
    #[arg(long)]
    work_jitter_ms: Option<u64>,

    /// Load the configuration from the `configuration` directory; flags override it.
    #[arg(long)]
    from_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The transformer prompt writes to the terminal, so logging starts once it was answered.
    let config = resolve_config(&args)?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config))?;

    Ok(())
}

async fn async_main(config: PipelineConfig) -> anyhow::Result<()> {
    if let Err(err) = run_pipeline(config).await {
        error!(error = %err, "pipeline failed");
        return Err(err);
    }

    info!("all workers have exited");

    Ok(())
}

/// Merges the configuration sources, flags taking precedence.
fn resolve_config(args: &Args) -> anyhow::Result<PipelineConfig> {
    let mut runner_config = if args.from_config {
        load_config::<RunnerConfig>().context("failed to load the runner configuration")?
    } else {
        let transformers = match args.transformers {
            Some(transformers) => transformers,
            None => ask_transformer_count()?,
        };
        RunnerConfig {
            pipeline: PipelineConfig::with_transformers(transformers),
        }
    };

    let config = &mut runner_config.pipeline;

    if let Some(items) = args.items {
        config.items = items;
    }
    if let Some(capacity) = args.capacity {
        config.stage_capacity = capacity;
    }
    if let Some(transformers) = args.transformers {
        config.transformers = transformers;
    }
    if let Some(work_jitter_ms) = args.work_jitter_ms {
        config.work_jitter_ms = work_jitter_ms;
    }

    runner_config
        .validate()
        .context("invalid pipeline configuration")?;

    Ok(runner_config.pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_resolve_without_prompting() {
        let args = Args::try_parse_from([
            "runner",
            "--transformers",
            "3",
            "--items",
            "7",
            "--capacity",
            "2",
            "--work-jitter-ms",
            "5",
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.transformers, 3);
        assert_eq!(config.items, 7);
        assert_eq!(config.stage_capacity, 2);
        assert_eq!(config.work_jitter_ms, 5);
    }

    #[test]
    fn invalid_flags_are_rejected() {
        let args =
            Args::try_parse_from(["runner", "--transformers", "1", "--capacity", "0"]).unwrap();

        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().contains("invalid pipeline configuration"));
    }
}
