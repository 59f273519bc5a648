//! Domain types for the folio data-acquisition pipeline.
//!
//! Everything the presentation layer receives lives here and is serializable,
//! so the CLI can emit it as JSON without a parallel set of DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The configured platform username that addresses a profile and its repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Project acquisition policy
// ---------------------------------------------------------------------------

/// Sort key forwarded to the remote repository search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Stars,
    Updated,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Stars => "stars",
            SortKey::Updated => "updated",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an automatic search leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Exclusions {
    /// Drop forked repositories from the search.
    pub forks: bool,
    /// Repository names rendered as negated `-repo:` filters.
    pub projects: Vec<String>,
}

/// Repositories found by a live search scoped to the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticPolicy {
    pub sort_by: SortKey,
    /// Always >= 1; enforced by the config resolver.
    pub limit: u32,
    pub exclude: Exclusions,
}

/// Repositories listed verbatim in configuration, as `owner/repo` identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ManualPolicy {
    pub projects: Vec<String>,
}

/// Exactly one acquisition strategy per [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ProjectPolicy {
    Automatic(AutomaticPolicy),
    Manual(ManualPolicy),
}

impl ProjectPolicy {
    pub fn mode(&self) -> &'static str {
        match self {
            ProjectPolicy::Automatic(_) => "automatic",
            ProjectPolicy::Manual(_) => "manual",
        }
    }
}

/// Repository section of the settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// When false the repository request is never issued.
    pub display: bool,
    pub header: String,
    pub policy: ProjectPolicy,
}

/// Fully populated, immutable settings produced by the config resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub identity: Identity,
    pub projects: ProjectSettings,
}

/// Session-wide values resolved once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotjar_id: Option<String>,
    pub hotjar_snippet_version: u32,
}

// ---------------------------------------------------------------------------
// Fetched data
// ---------------------------------------------------------------------------

/// Profile fields shown by the cards. Every field is always defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub avatar: String,
    /// Never empty: a missing name becomes a single space.
    pub name: String,
    pub bio: String,
    pub location: String,
    pub company: String,
}

/// One repository item from the remote search, in remote order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub fork: bool,
}

// ---------------------------------------------------------------------------
// Errors and load state
// ---------------------------------------------------------------------------

/// User-facing error taxonomy. Raw transport errors never cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidConfig,
    RateLimited { reset: String },
    InvalidIdentity,
    Generic,
}

/// Data for the dedicated error page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub status: u16,
    pub title: &'static str,
    pub subtitle: String,
}

impl ErrorCategory {
    pub fn view(&self) -> ErrorView {
        match self {
            ErrorCategory::InvalidConfig => ErrorView {
                status: 500,
                title: "Invalid Config!",
                subtitle: "Please provide a valid config file with a github username."
                    .to_string(),
            },
            ErrorCategory::RateLimited { reset } => ErrorView {
                status: 429,
                title: "Too Many Requests!",
                subtitle: format!("Oh no, you hit the rate limit! Try again {reset}."),
            },
            ErrorCategory::InvalidIdentity => ErrorView {
                status: 404,
                title: "Invalid GitHub Username!",
                subtitle: "Please provide a valid github username in the config file."
                    .to_string(),
            },
            ErrorCategory::Generic => ErrorView {
                status: 500,
                title: "Oops!!",
                subtitle: "Something went wrong.".to_string(),
            },
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::InvalidConfig => write!(f, "invalid config"),
            ErrorCategory::RateLimited { reset } => write!(f, "rate limited (reset {reset})"),
            ErrorCategory::InvalidIdentity => write!(f, "invalid identity"),
            ErrorCategory::Generic => write!(f, "generic error"),
        }
    }
}

/// Where the data-acquisition pipeline currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded {
        profile: ProfileSnapshot,
        repositories: Vec<Repository>,
    },
    Failed {
        error: ErrorCategory,
    },
}

impl LoadState {
    pub fn failed(error: ErrorCategory) -> Self {
        LoadState::Failed { error }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Loaded { .. } | LoadState::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Loaded { .. } => "loaded",
            LoadState::Failed { .. } => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
