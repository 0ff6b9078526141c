pub mod setup;

use anyhow::Result;
use log::{info, warn};
use rocket::fairing::AdHoc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::workflow::store::FileStore;

use setup::{check_tools, initialize_folder};

/// Startup work that must finish before the server accepts requests.
pub fn initialize(config: &AppConfig) -> Result<FileStore> {
    let store = FileStore::new(&config.output_dir);
    check_tools(config);
    initialize_folder(&store)?;
    store.sweep_stale(config.retention());
    Ok(store)
}

/// Re-runs the stale-file sweep every `interval` once the server is up.
pub fn sweeper_fairing(store: FileStore, retention: Duration, interval: Duration) -> AdHoc {
    AdHoc::on_liftoff("Stale file sweeper", move |_rocket| {
        let store = store.clone();
        Box::pin(async move {
            info!(
                "Sweeping files older than {:?} every {:?}",
                retention, interval
            );
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // the first tick completes immediately; startup already swept
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let store = store.clone();
                    if let Err(err) =
                        tokio::task::spawn_blocking(move || store.sweep_stale(retention)).await
                    {
                        warn!("Stale file sweep task failed: {}", err);
                    }
                }
            });
        })
    })
}
