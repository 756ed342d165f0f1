//! `sridm feed` command handler
//!
//! Replays a recorded live-feed session. Each line of the recording is one
//! decoded `sros-log-generic-event` notification in JSON; a replay task
//! pushes them into the same channel a live transport would use.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sridm_analyzer::{AnalysisPipeline, AnalyzerConfig, FeedEvent, FeedReceiver, ProgressReporter};
use sridm_core::config::SridmConfig;

use crate::cli::FeedArgs;
use crate::commands::file::spawn_ctrl_c_watch;
use crate::commands::report::{AnalysisReport, MatchSettings};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Depth of the replay -> receiver event channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Execute the `feed` command.
pub async fn execute(
    args: FeedArgs,
    config: &SridmConfig,
    settings: &MatchSettings,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let router = args.router.as_deref().unwrap_or(&config.feed.router);
    let stream = args.stream.as_deref().unwrap_or(&config.feed.stream);
    info!(
        recording = %args.recording.display(),
        router,
        user = %config.feed.user,
        stream,
        "replaying live feed recording"
    );

    // Fail before spawning anything if the recording is missing
    let file = tokio::fs::File::open(&args.recording).await?;

    let analyzer_config = AnalyzerConfig {
        idi_pattern: settings.idi_pattern.clone(),
        ..AnalyzerConfig::from_core(&config.analyzer)
    };
    let mut pipeline = AnalysisPipeline::start(&analyzer_config, "feed")?;

    let cancel = CancellationToken::new();
    let ctrl_c = spawn_ctrl_c_watch(cancel.clone());

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let replay = spawn_replay(file, args.recording.clone(), event_tx, cancel.clone());

    let mut receiver = FeedReceiver::new(event_rx);
    let progress = ProgressReporter::new(
        receiver.received_counter(),
        analyzer_config.progress_interval(),
    )
    .spawn(cancel.clone());

    let received = receiver.run(&mut pipeline, &cancel).await;
    let skipped = receiver.skipped_count();

    // Unblocks a replay task waiting on a full channel
    drop(receiver);
    cancel.cancel();
    ctrl_c.abort();

    let replayed = join_replay(replay).await?;
    if let Err(e) = progress.await {
        warn!(error = %e, "progress reporter task failed");
    }

    let received = received?;
    info!(replayed, received, skipped, "feed replay finished");

    let engine = pipeline.finish().await?;
    let report = AnalysisReport::build(args.recording.display().to_string(), &engine, settings)?;
    writer.render(&report)?;

    Ok(())
}

/// Reads the recording line by line and forwards decoded events.
///
/// Undecodable lines are skipped. Returns the number of events sent.
fn spawn_replay(
    file: tokio::fs::File,
    path: PathBuf,
    event_tx: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
) -> JoinHandle<Result<u64, std::io::Error>> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut sent = 0u64;
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                read = reader.read_until(b'\n', &mut buf) => read?,
            };
            if read == 0 {
                break;
            }
            line_no += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(path = %path.display(), line = line_no, "skipping non-UTF-8 recorded event");
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match FeedEvent::from_json(line.trim_end()) {
                Ok(event) => {
                    if event_tx.send(event).await.is_err() {
                        debug!("feed receiver gone, stopping replay");
                        break;
                    }
                    sent += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), line = line_no, error = %e, "skipping recorded event");
                }
            }
        }

        Ok(sent)
    })
}

async fn join_replay(handle: JoinHandle<Result<u64, std::io::Error>>) -> Result<u64, CliError> {
    match handle.await {
        Ok(result) => Ok(result?),
        Err(e) => Err(CliError::Command(format!("feed replay task failed: {e}"))),
    }
}
