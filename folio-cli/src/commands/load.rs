//! `folio load`: one load cycle, rendered or as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use folio_core::LoadState;
use folio_fetch::{HttpTransport, ProfileFetcher};
use folio_runtime::ProfileController;

use super::{config_path, read_config, render, runtime};

/// Arguments for `folio load`.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Config file (defaults to `<config dir>/folio/config.yaml`).
    pub config: Option<PathBuf>,

    /// Emit the final controller state as JSON.
    #[arg(long)]
    pub json: bool,
}

impl LoadArgs {
    pub fn run(self, api_base: &str) -> Result<()> {
        let path = config_path(self.config)?;
        let (session, resolution) = read_config(&path);

        let fetcher = ProfileFetcher::new(HttpTransport::new(api_base));
        let controller = ProfileController::new(fetcher, session);
        runtime()?.block_on(controller.reload(resolution));

        let state = controller.state();
        if self.json {
            let json = serde_json::to_string_pretty(&state)
                .context("failed to serialize controller state")?;
            println!("{json}");
        } else {
            render::print_state(&state);
        }

        if let LoadState::Failed { error } = &state.state {
            bail!("load failed: {error}");
        }
        Ok(())
    }
}
