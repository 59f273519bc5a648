pub mod check;
pub mod load;
pub mod render;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use folio_core::config::{self, ConfigResolution, RawConfig};
use folio_core::Session;

/// `<config dir>/folio/config.yaml` when no path is given.
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let dir = dirs::config_dir().context("could not determine config directory")?;
    Ok(dir.join("folio").join("config.yaml"))
}

/// Read the config once: session values plus the settings resolution.
pub fn read_config(path: &Path) -> (Session, ConfigResolution) {
    match RawConfig::load(path) {
        Ok(raw) => (Session::from_raw(&raw), config::resolve(&raw)),
        Err(err) => (Session::default(), ConfigResolution::from(Err(err))),
    }
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
