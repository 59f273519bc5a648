//! `folio check`: validate a config without touching the network.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use folio_core::config::ConfigResolution;
use folio_core::ProjectPolicy;
use folio_fetch::{repository_request, ApiRequest};

use super::{config_path, read_config, render};

/// Arguments for `folio check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config file (defaults to `<config dir>/folio/config.yaml`).
    pub config: Option<PathBuf>,

    /// Public repository count to assume when previewing the search.
    #[arg(long, default_value_t = 1)]
    pub public_repos: u64,
}

impl CheckArgs {
    pub fn run(self, api_base: &str) -> Result<()> {
        let path = config_path(self.config)?;
        let (session, resolution) = read_config(&path);

        let settings = match resolution {
            ConfigResolution::Valid(settings) => settings,
            ConfigResolution::Invalid { reason } => {
                render::print_error(&folio_core::ErrorCategory::InvalidConfig);
                bail!("invalid config {}: {reason}", path.display());
            }
        };

        let base = api_base.trim_end_matches('/');
        println!("{} {}", "config:".bold(), path.display());
        println!("{} {}", "identity:".bold(), settings.identity);
        println!("{} {}", "theme:".bold(), session.theme);
        println!(
            "{} {} (display: {}, header: {})",
            "projects:".bold(),
            settings.projects.policy.mode(),
            settings.projects.display,
            settings.projects.header,
        );
        match &settings.projects.policy {
            ProjectPolicy::Automatic(auto) => println!(
                "  sort by {}, limit {}, exclude forks: {}, excluded: {}",
                auto.sort_by,
                auto.limit,
                auto.exclude.forks,
                auto.exclude.projects.len(),
            ),
            ProjectPolicy::Manual(manual) => {
                println!("  {} listed repositories", manual.projects.len())
            }
        }

        let profile = ApiRequest::profile(&settings.identity);
        println!("{} GET {base}{profile}", "profile:".bold());
        let search = settings
            .projects
            .display
            .then(|| repository_request(&settings, self.public_repos))
            .flatten();
        match search {
            Some(request) => println!("{} GET {base}{request}", "repositories:".bold()),
            None => println!("{} none", "repositories:".bold()),
        }
        Ok(())
    }
}
