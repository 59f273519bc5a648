//! folio core library: domain types, config resolution, errors.
//!
//! - [`types`]: newtypes, settings, load state and the error taxonomy
//! - [`config`]: raw YAML config and the total resolver
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigResolution, RawConfig};
pub use error::ConfigError;
pub use types::{
    AutomaticPolicy, ErrorCategory, ErrorView, Exclusions, Identity, LoadState, ManualPolicy,
    ProfileSnapshot, ProjectPolicy, ProjectSettings, Repository, Session, Settings, SortKey,
};
