//! Profile controller runtime: load-state machine, config watcher, tracing setup.

pub mod controller;
mod error;
pub mod logging;
pub mod watch;

pub use controller::{ControllerState, ProfileController};
pub use error::RuntimeError;
pub use logging::init_tracing;
pub use watch::{watch_config, watch_config_until, DEBOUNCE_WINDOW};
