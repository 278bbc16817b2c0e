//! Periodic snapshot sampling to a JSONL file.

use printwatch_core::StateAccumulator;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::config::SamplerConf;

/// Appends one flattened snapshot per interval to `snapshots.jsonl` under
/// the configured data directory.
pub fn spawn_snapshot_sampler(accumulator: Arc<StateAccumulator>, cfg: SamplerConf) {
    tokio::spawn(async move {
        let dir = PathBuf::from(&cfg.data_dir);
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            warn!("cannot create data dir {}: {e}", dir.display());
            return;
        }
        let path = dir.join("snapshots.jsonl");
        info!("sampling snapshots to {} every {}s", path.display(), cfg.interval_secs);

        let mut interval = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
        loop {
            interval.tick().await;
            if accumulator.update_count() == 0 {
                // Nothing received yet; an all-null row helps nobody.
                continue;
            }
            let line = match serde_json::to_string(&accumulator.flatten()) {
                Ok(line) => line,
                Err(e) => {
                    warn!("snapshot serialization failed: {e}");
                    continue;
                }
            };
            let result = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await;
            match result {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(format!("{line}\n").as_bytes()).await {
                        warn!("snapshot write failed: {e}");
                    }
                }
                Err(e) => warn!("cannot open {}: {e}", path.display()),
            }
        }
    });
}
