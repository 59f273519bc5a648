//! Config-file watcher: every debounced change to the file starts a new load
//! cycle. Overlapping cycles are reconciled by the controller's attempt tokens.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use folio_core::config;
use folio_core::types::LoadState;
use folio_fetch::Transport;

use crate::controller::ProfileController;
use crate::error::RuntimeError;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Load `path` once, then reload on every change until ctrl-c.
pub async fn watch_config<T>(
    path: PathBuf,
    controller: Arc<ProfileController<T>>,
) -> Result<(), RuntimeError>
where
    T: Transport + 'static,
{
    watch_config_until(path, controller, async {
        let signal = tokio::signal::ctrl_c().await.map_err(RuntimeError::Signal);
        if signal.is_ok() {
            tracing::info!("received ctrl-c, stopping watcher");
        }
        signal
    })
    .await
}

/// [`watch_config`] with a caller-supplied stop signal. In-flight loads are
/// aborted once `shutdown` completes.
pub async fn watch_config_until<T, F>(
    path: PathBuf,
    controller: Arc<ProfileController<T>>,
    shutdown: F,
) -> Result<(), RuntimeError>
where
    T: Transport + 'static,
    F: Future<Output = Result<(), RuntimeError>>,
{
    let dir = path
        .parent()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .ok_or_else(|| RuntimeError::NoParent(path.clone()))?
        .to_path_buf();
    // Event paths arrive canonicalized on some platforms.
    let dir = std::fs::canonicalize(&dir).map_err(|source| RuntimeError::Io {
        path: dir.clone(),
        source,
    })?;
    let file_name = path.file_name().map(|n| n.to_os_string());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %path.display(), "watching config");

    let mut debounce = Debounce::new(DEBOUNCE_WINDOW);
    let mut in_flight = vec![spawn_reload(&controller, &path)];
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            result = &mut shutdown => break result,
            event = event_rx.recv() => {
                let Some(event) = event else { break Ok(()) };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                if !is_relevant_event_kind(&event.kind) {
                    continue;
                }
                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if touches_config {
                    debounce.touch(Instant::now());
                }
            }
            _ = sleep_until(debounce.deadline().unwrap_or_else(Instant::now)),
                if debounce.deadline().is_some() =>
            {
                if debounce.fire(Instant::now()) {
                    in_flight.retain(|handle| !handle.is_finished());
                    in_flight.push(spawn_reload(&controller, &path));
                }
            }
        }
    };

    for handle in in_flight {
        handle.abort();
    }
    outcome
}

/// Resolve the config now and reserve its attempt token before spawning, so
/// tokens follow event order.
fn spawn_reload<T>(
    controller: &Arc<ProfileController<T>>,
    path: &Path,
) -> JoinHandle<Option<LoadState>>
where
    T: Transport + 'static,
{
    let resolution = config::load_at(path);
    let attempt = controller.next_attempt();
    tracing::debug!(attempt, path = %path.display(), "config change");
    let controller = Arc::clone(controller);
    tokio::spawn(async move { controller.run(attempt, resolution).await })
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Trailing-edge debounce: fires once the window passes with no new event, so
/// a save split across several writes is read after the last one.
#[derive(Debug)]
struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true when the deadline has passed.
    fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
