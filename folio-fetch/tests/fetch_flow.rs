//! ProfileFetcher request sequencing against a scripted transport.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use folio_core::config::{self, ConfigResolution};
use folio_core::Settings;
use folio_fetch::{classify, ApiRequest, ProfileFetcher, Transport, TransportFailure};

/// Replies in order and records every request it receives.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, TransportFailure>>>,
    seen: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<String, TransportFailure>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<ApiRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportFailure> {
        self.seen.lock().expect("seen lock").push(request.clone());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {request}"))
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        format!("https://api.example{}", request.path)
    }
}

fn settings(yaml: &str) -> Settings {
    match config::resolve_str(yaml) {
        ConfigResolution::Valid(settings) => settings,
        other => panic!("expected valid config, got {other:?}"),
    }
}

fn status(code: u16) -> TransportFailure {
    TransportFailure::Status {
        status: code,
        url: "https://api.github.com/users/octocat".to_string(),
        headers: BTreeMap::new(),
    }
}

fn repos_body(count: usize) -> String {
    let items: Vec<String> = (0..count)
        .map(|i| format!(r#"{{"name":"repo-{i}","full_name":"octocat/repo-{i}","stargazers_count":{}}}"#, 100 - i))
        .collect();
    format!(r#"{{"total_count":{count},"items":[{}]}}"#, items.join(","))
}

const AUTOMATIC: &str = r#"
github:
  username: octocat
projects:
  github:
    automatic:
      limit: 5
      exclude:
        forks: true
"#;

#[tokio::test(flavor = "current_thread")]
async fn profile_then_search_in_order() {
    let transport = ScriptedTransport::new(vec![
        Ok(r#"{"name":null,"public_repos":12}"#.to_string()),
        Ok(repos_body(5)),
    ]);
    let fetcher = ProfileFetcher::new(transport);

    let outcome = fetcher.load(&settings(AUTOMATIC)).await.expect("load");
    assert_eq!(outcome.profile.name, " ");
    assert_eq!(outcome.repositories.len(), 5);
    assert_eq!(outcome.repositories[0].name, "repo-0");
    assert_eq!(outcome.repositories[4].name, "repo-4");

    let seen = fetcher.transport().seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "/users/octocat");
    assert_eq!(seen[1].path, "/search/repositories");
    assert_eq!(seen[1].query_value("q"), Some("user:octocat fork:false"));
    assert_eq!(seen[1].query_value("per_page"), Some("5"));
}

#[tokio::test(flavor = "current_thread")]
async fn zero_public_repos_skips_search() {
    let transport = ScriptedTransport::new(vec![Ok(r#"{"public_repos":0}"#.to_string())]);
    let fetcher = ProfileFetcher::new(transport);

    let outcome = fetcher.load(&settings(AUTOMATIC)).await.expect("load");
    assert!(outcome.repositories.is_empty());
    assert_eq!(fetcher.transport().seen().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn display_disabled_skips_search() {
    let yaml = "github:\n  username: octocat\nprojects:\n  github:\n    display: false\n";
    let transport = ScriptedTransport::new(vec![Ok(r#"{"public_repos":40}"#.to_string())]);
    let fetcher = ProfileFetcher::new(transport);

    let outcome = fetcher.load(&settings(yaml)).await.expect("load");
    assert!(outcome.repositories.is_empty());
    assert_eq!(fetcher.transport().seen().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn manual_list_searches_even_with_zero_public_repos() {
    let yaml = r#"
github:
  username: octocat
projects:
  github:
    mode: manual
    manual:
      projects: [octocat/hello-world, octocat/Spoon-Knife]
"#;
    let transport = ScriptedTransport::new(vec![
        Ok(r#"{"public_repos":0}"#.to_string()),
        Ok(repos_body(2)),
    ]);
    let fetcher = ProfileFetcher::new(transport);

    let outcome = fetcher.load(&settings(yaml)).await.expect("load");
    assert_eq!(outcome.repositories.len(), 2);
    let seen = fetcher.transport().seen();
    assert_eq!(
        seen[1].query_value("q"),
        Some("repo:octocat/hello-world repo:octocat/Spoon-Knife fork:true")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn profile_failure_stops_before_search() {
    let transport = ScriptedTransport::new(vec![Err(status(404))]);
    let fetcher = ProfileFetcher::new(transport);

    let err = fetcher.load(&settings(AUTOMATIC)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(fetcher.transport().seen().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn search_failure_propagates() {
    let transport = ScriptedTransport::new(vec![
        Ok(r#"{"public_repos":3}"#.to_string()),
        Err(status(500)),
    ]);
    let fetcher = ProfileFetcher::new(transport);

    let err = fetcher.load(&settings(AUTOMATIC)).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(classify(&err), folio_core::ErrorCategory::Generic);
}

#[tokio::test(flavor = "current_thread")]
async fn malformed_profile_body_is_a_decode_failure() {
    let transport = ScriptedTransport::new(vec![Ok("<html>rate limited</html>".to_string())]);
    let fetcher = ProfileFetcher::new(transport);

    let err = fetcher.load(&settings(AUTOMATIC)).await.unwrap_err();
    assert!(matches!(err, TransportFailure::Decode { .. }), "got: {err}");
    assert_eq!(err.status(), None);
    assert_eq!(err.url(), "https://api.example/users/octocat");
}
