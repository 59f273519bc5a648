//! `folio watch`: reload on every config change.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use folio_fetch::{HttpTransport, ProfileFetcher};
use folio_runtime::{watch_config, ProfileController};

use super::{config_path, read_config, render, runtime};

/// Arguments for `folio watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Config file (defaults to `<config dir>/folio/config.yaml`).
    pub config: Option<PathBuf>,
}

impl WatchArgs {
    pub fn run(self, api_base: &str) -> Result<()> {
        let path = config_path(self.config)?;
        // Session values are read once; only settings follow the file.
        let (session, _) = read_config(&path);

        let fetcher = ProfileFetcher::new(HttpTransport::new(api_base));
        let controller = Arc::new(ProfileController::new(fetcher, session));

        runtime()?.block_on(async move {
            let mut updates = controller.subscribe();
            let printer = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let state = updates.borrow_and_update().clone();
                    render::print_state(&state);
                }
            });
            let result = watch_config(path.clone(), controller).await;
            printer.abort();
            result.with_context(|| format!("failed to watch {}", path.display()))
        })
    }
}
