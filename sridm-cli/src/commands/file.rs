//! `sridm file` command handler

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sridm_analyzer::{AnalysisPipeline, AnalyzerConfig, FileSource, IngestOutcome};
use sridm_core::config::SridmConfig;

use crate::cli::FileArgs;
use crate::commands::report::{AnalysisReport, MatchSettings};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Execute the `file` command.
///
/// Reads the whole capture, then reports the tunnels whose IDi matches.
/// Ctrl-C stops reading and reports on what was read so far.
pub async fn execute(
    args: FileArgs,
    config: &SridmConfig,
    settings: &MatchSettings,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let analyzer_config = AnalyzerConfig {
        idi_pattern: settings.idi_pattern.clone(),
        ..AnalyzerConfig::from_core(&config.analyzer)
    };
    let mut pipeline = AnalysisPipeline::start(&analyzer_config, "file")?;

    let cancel = CancellationToken::new();
    let ctrl_c = spawn_ctrl_c_watch(cancel.clone());

    let mut source = FileSource::new(&args.input);
    let result = source.run(&mut pipeline, &cancel).await;
    ctrl_c.abort();

    match result? {
        IngestOutcome::Completed { lines } => {
            info!(path = %args.input.display(), lines, "capture read");
        }
        IngestOutcome::Cancelled { lines } => {
            warn!(path = %args.input.display(), lines, "reading interrupted, reporting partial results");
        }
    }

    let engine = pipeline.finish().await?;
    info!(
        messages = engine.message_count(),
        identities = engine.identity_count(),
        "extraction finished"
    );

    let report = AnalysisReport::build(args.input.display().to_string(), &engine, settings)?;
    writer.render(&report)?;

    Ok(())
}

/// Cancel `token` on Ctrl-C.
pub(crate) fn spawn_ctrl_c_watch(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl-C, stopping input");
            token.cancel();
        }
    })
}
