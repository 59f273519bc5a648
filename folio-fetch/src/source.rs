//! Repository source: decides which repository request, if any, to issue.
//!
//! Pure functions only. Settings reaching this module are already valid.

use std::fmt;

use serde::Serialize;

use folio_core::types::{AutomaticPolicy, Identity, ManualPolicy, ProjectPolicy, Settings};

/// A lazy description of one `GET` against the platform API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    /// Path below the API base, always starting with `/`.
    pub path: String,
    /// Query pairs, unencoded; the transport encodes them.
    pub query: Vec<(&'static str, String)>,
}

impl ApiRequest {
    /// `GET /users/{identity}`
    pub fn profile(identity: &Identity) -> Self {
        Self {
            path: format!("/users/{}", identity.0),
            query: Vec::new(),
        }
    }

    fn search(query: Vec<(&'static str, String)>) -> Self {
        Self {
            path: "/search/repositories".to_string(),
            query,
        }
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

/// Decide the repository request for `settings`, given the profile's public
/// repository count. `None` means no request is issued and the repository
/// list is empty.
pub fn repository_request(settings: &Settings, public_repo_count: u64) -> Option<ApiRequest> {
    match &settings.projects.policy {
        ProjectPolicy::Automatic(policy) => {
            if public_repo_count == 0 {
                return None;
            }
            Some(automatic_request(&settings.identity, policy))
        }
        ProjectPolicy::Manual(policy) => manual_request(policy),
    }
}

fn automatic_request(identity: &Identity, policy: &AutomaticPolicy) -> ApiRequest {
    let mut terms = vec![
        format!("user:{}", identity.0),
        format!("fork:{}", !policy.exclude.forks),
    ];
    terms.extend(
        policy
            .exclude
            .projects
            .iter()
            .map(|name| format!("-repo:{}", qualify(identity, name))),
    );

    ApiRequest::search(vec![
        ("q", terms.join(" ")),
        ("sort", policy.sort_by.as_str().to_string()),
        ("per_page", policy.limit.to_string()),
        ("type", "Repositories".to_string()),
    ])
}

fn manual_request(policy: &ManualPolicy) -> Option<ApiRequest> {
    if policy.projects.is_empty() {
        return None;
    }
    let mut terms: Vec<String> = policy
        .projects
        .iter()
        .map(|name| format!("repo:{name}"))
        .collect();
    // Manual entries are intentional, so forks are always admitted.
    terms.push("fork:true".to_string());

    Some(ApiRequest::search(vec![
        ("q", terms.join(" ")),
        ("type", "Repositories".to_string()),
    ]))
}

/// `-repo:` filters need `owner/name`; bare names belong to the identity.
fn qualify(identity: &Identity, name: &str) -> String {
    if name.contains('/') {
        name.to_string()
    } else {
        format!("{}/{}", identity.0, name)
    }
}
