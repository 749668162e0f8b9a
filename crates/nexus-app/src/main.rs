// Nexus draft engine entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the protocol)
// 2. Load config
// 3. Load the corpus and build models
// 4. Open database, recover open sessions
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Spawn stdout writer task
// 8. Read commands from stdin until EOF
// 9. Cleanup on exit

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use nexus_app::app;
use nexus_app::config;
use nexus_app::corpus_loader;
use nexus_app::db;
use nexus_app::protocol::{ErrorKind, SessionCommand, SessionResponse};
use nexus_draft::{build_models, DraftEngine, Phase};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    let log_path = init_tracing()?;
    info!("Nexus draft engine starting up, logging to {}", log_path.display());

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let format = &config.draft_format;
    info!(
        "Config loaded: corpus={}, min_occurrences={}, {} schedule blocks \
         ({} slots: {} bans and {} picks per side)",
        config.corpus.path,
        config.model.min_occurrences,
        format.blocks().len(),
        format.len(),
        format.per_side(Phase::Ban),
        format.per_side(Phase::Pick)
    );

    // 3. Load the corpus and build models
    let corpus = corpus_loader::load_corpus(&config).context("failed to load corpus")?;
    let models = build_models(&corpus, &config.model_options());
    let engine = DraftEngine::new(Arc::new(models), config.draft_format.clone());

    // 4. Open database and recover sessions
    let db = db::Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let mut app_state = app::AppState::new(config, engine, db);
    match app::recover_from_db(&mut app_state) {
        Ok(0) => info!("Starting with no open sessions"),
        Ok(n) => info!("Restored {} sessions from previous run", n),
        Err(e) => {
            error!("Crash recovery failed: {}", e);
            return Err(e.context("crash recovery failed"));
        }
    }

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel::<SessionCommand>(64);
    let (out_tx, mut out_rx) = mpsc::channel::<SessionResponse>(256);

    // 6. Spawn app logic task
    let app_out = out_tx.clone();
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, app_out, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Spawn stdout writer task
    let writer_handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = out_rx.recv().await {
            let line = match response.to_json_line() {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to serialize response: {}", e);
                    continue;
                }
            };
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                warn!("stdout closed, stopping writer");
                break;
            }
        }
    });

    // 8. Read commands from stdin until EOF or the app loop exits
    info!("Ready for commands on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match SessionCommand::from_json_line(&line) {
            Ok(cmd) => {
                let quit = cmd == SessionCommand::Quit;
                if cmd_tx.send(cmd).await.is_err() || quit {
                    break;
                }
            }
            Err(e) => {
                warn!("Unparseable command: {}", e);
                let resp = SessionResponse::error(None, ErrorKind::BadRequest, e.to_string());
                if out_tx.send(resp).await.is_err() {
                    break;
                }
            }
        }
    }

    // 9. Cleanup: let the app loop drain, then the writer
    drop(cmd_tx);
    drop(out_tx);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
        let _ = writer_handle.await;
    })
    .await;

    info!("Nexus draft engine shut down cleanly");
    Ok(())
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "nexus_app=info,nexus_draft=info,warn";

/// Send tracing output to `logs/nexus.log`, appending across restarts.
/// Stdout is reserved for protocol responses. Returns the log path.
fn init_tracing() -> anyhow::Result<PathBuf> {
    use tracing_subscriber::EnvFilter;

    let log_path = std::env::current_dir()?.join("logs").join("nexus.log");
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(log_path)
}
