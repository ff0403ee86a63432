//! Application entry point — voiceloop.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the HTTP submission client and poller from config.
//! 5. Pick the reply directory and build the file sink.
//! 6. Spawn the pipeline orchestrator on the tokio runtime.
//! 7. Start cpal capture and the audio-ingest bridge thread.
//! 8. Park the main thread on Ctrl-C.

use std::sync::Arc;

use tokio::sync::mpsc;
use voiceloop::{
    audio::{first_channel, resample_linear, AudioCapture, AudioChunk, Chunker},
    config::{AppConfig, AppPaths},
    pipeline::{new_shared_state, CaptureController, PipelineOrchestrator},
    reply::FileReplySink,
    submit::{HttpSubmissionClient, SubmissionPoller},
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voiceloop starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads — orchestrator + poll jobs)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 4. Submission client + poller
    let client = Arc::new(HttpSubmissionClient::from_config(&config.submission));
    let poller = Arc::new(SubmissionPoller::new(client, config.polling.clone()));

    // 5. Reply sink
    let reply_dir = config
        .submission
        .reply_dir
        .clone()
        .unwrap_or_else(|| AppPaths::new().replies_dir);
    log::info!("Replies will be written to {}", reply_dir.display());
    let sink = Arc::new(FileReplySink::new(reply_dir));

    // 6. Pipeline orchestrator
    let state = new_shared_state(config.clone());
    let controller = CaptureController::new(&config);
    let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>(64);
    let orchestrator = PipelineOrchestrator::new(Arc::clone(&state), controller, poller, sink);
    rt.spawn(orchestrator.run(chunk_rx));

    // 7. cpal audio capture — delivers device-sized buffers, which the ingest
    //    thread normalizes to mono fixed-size chunks at the configured rate.
    let target_rate = config.audio.sample_rate;
    let chunk_size = config.audio.chunk_size;

    let _stream_handle: Option<voiceloop::audio::StreamHandle> =
        match AudioCapture::new(config.audio.device.as_deref(), target_rate) {
            Ok(capture) => {
                let source_rate = capture.sample_rate();
                let channels = capture.channels();
                let (raw_tx, raw_rx) = std::sync::mpsc::channel::<AudioChunk>();

                // Bridge thread: channel 0 → resample → fixed chunks → tokio.
                let ingest_tx = chunk_tx.clone();
                std::thread::Builder::new()
                    .name("audio-ingest".into())
                    .spawn(move || {
                        let mut chunker = Chunker::new(chunk_size);
                        while let Ok(chunk) = raw_rx.recv() {
                            let mono = first_channel(&chunk.samples, chunk.channels);
                            let samples = if chunk.sample_rate != target_rate {
                                resample_linear(&mono, chunk.sample_rate, target_rate)
                            } else {
                                mono
                            };
                            for piece in chunker.push(&samples) {
                                // Orchestrator gone — nothing left to feed.
                                if ingest_tx.blocking_send(piece).is_err() {
                                    return;
                                }
                            }
                        }
                    })?;

                match capture.start(raw_tx) {
                    Ok(handle) => {
                        log::info!("Audio capture started ({} Hz, {} ch)", source_rate, channels);
                        Some(handle)
                    }
                    Err(e) => {
                        log::warn!("Failed to start audio stream: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("Audio capture unavailable: {e}");
                None
            }
        };

    // 8. Run until interrupted. Dropping the runtime tears the pipeline down.
    rt.block_on(async {
        let _ = tokio::signal::ctrl_c().await;
    });
    log::info!("voiceloop shutting down");
    Ok(())
}
