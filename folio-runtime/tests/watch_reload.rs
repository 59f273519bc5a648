//! Config watcher driven by real file writes in a temp directory.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::{LoadState, Session};
use folio_fetch::{ApiRequest, ProfileFetcher, Transport, TransportFailure};
use folio_runtime::{watch_config_until, ControllerState, ProfileController, DEBOUNCE_WINDOW};
use tempfile::TempDir;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Answers every profile request with a user that owns no public repositories.
#[derive(Default)]
struct Profiles {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for Profiles {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(login) = request.path.strip_prefix("/users/") else {
            panic!("unexpected request: {request}");
        };
        Ok(format!(r#"{{"login":"{login}","name":"{login}","public_repos":0}}"#))
    }
}

const OCTOCAT: &str = "github:\n  username: octocat\n";
const HUBOT: &str = "github:\n  username: hubot\n";

type Controller = Arc<ProfileController<Profiles>>;

struct Running {
    controller: Controller,
    updates: watch::Receiver<ControllerState>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), folio_runtime::RuntimeError>>,
}

impl Running {
    fn start(path: &Path) -> Self {
        let controller: Controller = Arc::new(ProfileController::new(
            ProfileFetcher::new(Profiles::default()),
            Session::default(),
        ));
        let updates = controller.subscribe();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(watch_config_until(
            path.to_path_buf(),
            Arc::clone(&controller),
            async move {
                let _ = stopped.await;
                Ok(())
            },
        ));
        Self {
            controller,
            updates,
            stop,
            task,
        }
    }

    async fn wait_for(
        &mut self,
        what: &str,
        done: impl Fn(&ControllerState) -> bool,
    ) -> ControllerState {
        let updates = &mut self.updates;
        let waited = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                {
                    let state = updates.borrow_and_update();
                    if done(&state) {
                        return state.clone();
                    }
                }
                updates.changed().await.expect("controller alive");
            }
        })
        .await;
        waited.unwrap_or_else(|_| {
            panic!(
                "timed out waiting for {what}; last state: {:?}",
                self.controller.state()
            )
        })
    }

    async fn stop(self) {
        self.stop.send(()).expect("watcher still running");
        self.task
            .await
            .expect("watcher task joined")
            .expect("watcher finished cleanly");
    }
}

fn loaded_as(state: &ControllerState, identity: &str) -> bool {
    matches!(state.state, LoadState::Loaded { .. })
        && state.settings.as_ref().map(|s| s.identity.0.as_str()) == Some(identity)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn save_split_across_writes_loads_final_contents() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, OCTOCAT).expect("write config");

    let mut running = Running::start(&path);
    let first = running
        .wait_for("initial load", |s| loaded_as(s, "octocat"))
        .await;

    // Truncate first, then write the real contents inside one debounce window.
    std::fs::write(&path, "").expect("truncate config");
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(&path, HUBOT).expect("write config");

    let reloaded = running
        .wait_for("reload with the final contents", |s| loaded_as(s, "hubot"))
        .await;
    assert!(
        reloaded.attempt > first.attempt,
        "attempt tokens grow: {} then {}",
        first.attempt,
        reloaded.attempt
    );

    tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;
    let settled = running.controller.state();
    assert!(loaded_as(&settled, "hubot"), "settled on {:?}", settled.state);
    assert!(settled.attempt >= reloaded.attempt);

    running.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rename_over_config_triggers_reload() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, OCTOCAT).expect("write config");

    let mut running = Running::start(&path);
    let first = running
        .wait_for("initial load", |s| loaded_as(s, "octocat"))
        .await;

    let staged = dir.path().join("config.yaml.tmp");
    std::fs::write(&staged, HUBOT).expect("write staged config");
    std::fs::rename(&staged, &path).expect("rename over config");

    let reloaded = running
        .wait_for("reload after rename", |s| loaded_as(s, "hubot"))
        .await;
    assert!(reloaded.attempt > first.attempt);

    running.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unrelated_files_do_not_reload() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, OCTOCAT).expect("write config");

    let mut running = Running::start(&path);
    let first = running
        .wait_for("initial load", |s| loaded_as(s, "octocat"))
        .await;

    std::fs::write(dir.path().join("notes.txt"), "hello").expect("write sibling");
    tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;

    let state = running.controller.state();
    assert_eq!(state.attempt, first.attempt);
    assert_eq!(
        running.controller.fetcher().transport().calls.load(Ordering::SeqCst),
        1
    );

    running.stop().await;
}
