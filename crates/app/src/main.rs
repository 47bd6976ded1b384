use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

mod config;
mod ingest;

use config::AppConfig;
use ingest::RawMessage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let project_dirs = directories::ProjectDirs::from("in", "paisa", "Paisa")
        .context("failed to resolve platform directories")?;
    let data_dir = project_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir).context("failed to create data directory")?;

    let config_path = project_dirs.config_dir().join("config.toml");
    let config = AppConfig::load(&config_path)?;
    tracing::info!(path = %config_path.display(), "configuration loaded");

    let db = paisa_storage::create_db(&data_dir.join("ledger.db"))
        .await
        .context("failed to open local store")?;

    let categorizer = match &config.rules_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read rules file {}", path.display()))?;
            paisa_extract::KeywordCategorizer::from_toml(&content).map_err(anyhow::Error::msg)?
        }
        None => paisa_extract::KeywordCategorizer::default(),
    };
    let extractor = paisa_extract::MessageExtractor::new(categorizer);

    // ── Message intake pipeline ───────────────────────────────────────────────
    // The channel bridges the notify watcher thread and the async worker.
    // Each dropped file is one delivered batch; messages within it are
    // ingested sequentially without ever blocking the watcher callback.
    let intake_dir = data_dir.join("intake");
    std::fs::create_dir_all(&intake_dir).context("failed to create intake directory")?;

    let (intake_tx, mut intake_rx) = mpsc::channel::<PathBuf>(64);

    let db_for_worker = db.clone();
    tokio::spawn(async move {
        while let Some(path) = intake_rx.recv().await {
            match read_message_batch(&path).await {
                Ok(batch) if batch.is_empty() => {
                    tracing::debug!(path = %path.display(), "no messages in intake file");
                }
                Ok(batch) => {
                    match ingest::ingest_batch(&db_for_worker, &extractor, &batch).await {
                        Ok(summary) => tracing::info!(
                            path = %path.display(),
                            inserted = summary.inserted,
                            duplicates = summary.duplicates,
                            unmatched = summary.unmatched,
                            "intake batch processed"
                        ),
                        Err(e) => tracing::error!("storage failure during ingestion: {e}"),
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to read intake file: {e}");
                }
            }
        }
    });

    // The watcher must be kept alive for the duration of the app.
    let _watcher = spawn_intake_watcher(&intake_dir, intake_tx)
        .context("failed to start intake folder watcher")?;
    tracing::info!("watching intake folder: {}", intake_dir.display());

    // ── Reconciliation loop ───────────────────────────────────────────────────
    let client = paisa_sync::HttpLedgerClient::new(config.api_base_url.as_str())?;
    let mut reconciler = paisa_sync::Reconciler::new(db, client, config.client_id.clone());

    let mut ticker = tokio::time::interval(Duration::from_secs(config.sync_interval_secs.max(30)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match reconciler.reconcile(config.force_resync).await {
            Ok(outcome) if outcome.pushed > 0 => tracing::info!(
                pushed = outcome.pushed,
                corrections = outcome.corrections_applied,
                "sync complete"
            ),
            Ok(_) => tracing::debug!("nothing to sync"),
            // Affected records stay pending; the next tick retries.
            Err(e) => tracing::warn!("sync attempt failed: {e}"),
        }
    }
}

async fn read_message_batch(path: &Path) -> std::io::Result<Vec<RawMessage>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content.lines().filter_map(ingest::parse_intake_line).collect())
}

/// Spawn a notify watcher on `watch_dir` that sends new file paths to `tx`.
/// Returns the watcher — it must be kept alive for watching to continue.
fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_)) {
                for path in ev.paths {
                    let _ = tx.try_send(path);
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
