//! Raw YAML configuration and the resolver that turns it into [`Settings`].
//!
//! Resolution is total: every input ends up as [`ConfigResolution::Valid`] or
//! [`ConfigResolution::Invalid`]. Callers never act on partially valid settings.
//!
//! # API pattern
//!
//! - [`RawConfig::from_yaml_str`] / [`sanitize`]: fallible steps, `Result<_, ConfigError>`
//! - [`resolve`] / [`resolve_str`] / [`load_at`]: total, fold errors into `Invalid`

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{
    AutomaticPolicy, Exclusions, Identity, ManualPolicy, ProjectPolicy, ProjectSettings, Session,
    Settings, SortKey,
};

pub const DEFAULT_PROJECTS_HEADER: &str = "Github Projects";
pub const DEFAULT_PROJECT_LIMIT: u32 = 8;
pub const DEFAULT_THEME: &str = "lofi";
pub const DEFAULT_HOTJAR_SNIPPET_VERSION: u32 = 6;

// ---------------------------------------------------------------------------
// 1. Raw shape
// ---------------------------------------------------------------------------

/// Config file as written by the user. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub github: Option<RawGithub>,
    pub projects: Option<RawProjects>,
    pub theme_config: Option<RawThemeConfig>,
    pub google_analytics: Option<RawTracker>,
    pub hotjar: Option<RawTracker>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGithub {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjects {
    pub github: Option<RawGithubProjects>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawMode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGithubProjects {
    pub display: Option<bool>,
    pub header: Option<String>,
    pub mode: Option<RawMode>,
    pub automatic: Option<RawAutomatic>,
    pub manual: Option<RawManual>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAutomatic {
    pub sort_by: Option<SortKey>,
    pub limit: Option<u32>,
    pub exclude: Option<RawExclude>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExclude {
    pub forks: Option<bool>,
    pub projects: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManual {
    pub projects: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawThemeConfig {
    pub default_theme: Option<String>,
}

/// Analytics ids show up both quoted and bare in real config files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(i64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTracker {
    pub id: Option<Scalar>,
    pub snippet_version: Option<u32>,
}

impl RawConfig {
    /// Parse a YAML document. Blank and `null` documents are [`ConfigError::Empty`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Err(ConfigError::Empty);
        }
        let parsed: Option<RawConfig> = serde_yaml::from_str(text)?;
        let raw = parsed.ok_or(ConfigError::Empty)?;
        if raw.is_empty() {
            return Err(ConfigError::Empty);
        }
        Ok(raw)
    }

    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// No recognised top-level key present.
    pub fn is_empty(&self) -> bool {
        self.github.is_none()
            && self.projects.is_none()
            && self.theme_config.is_none()
            && self.google_analytics.is_none()
            && self.hotjar.is_none()
    }
}

// ---------------------------------------------------------------------------
// 2. Sanitize
// ---------------------------------------------------------------------------

/// Fill defaults and validate. Fails on a missing identity or a zero limit.
pub fn sanitize(raw: &RawConfig) -> Result<Settings, ConfigError> {
    let username = raw
        .github
        .as_ref()
        .and_then(|g| g.username.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingIdentity)?;

    let github = raw
        .projects
        .as_ref()
        .and_then(|p| p.github.clone())
        .unwrap_or_default();

    let policy = match github.mode.unwrap_or(RawMode::Automatic) {
        RawMode::Automatic => {
            let automatic = github.automatic.unwrap_or_default();
            let limit = automatic.limit.unwrap_or(DEFAULT_PROJECT_LIMIT);
            if limit == 0 {
                return Err(ConfigError::InvalidLimit);
            }
            let exclude = automatic.exclude.unwrap_or_default();
            ProjectPolicy::Automatic(AutomaticPolicy {
                sort_by: automatic.sort_by.unwrap_or_default(),
                limit,
                exclude: Exclusions {
                    forks: exclude.forks.unwrap_or(false),
                    projects: clean_names(exclude.projects),
                },
            })
        }
        RawMode::Manual => ProjectPolicy::Manual(ManualPolicy {
            projects: clean_names(github.manual.and_then(|m| m.projects)),
        }),
    };

    Ok(Settings {
        identity: Identity::from(username),
        projects: ProjectSettings {
            display: github.display.unwrap_or(true),
            header: github
                .header
                .unwrap_or_else(|| DEFAULT_PROJECTS_HEADER.to_string()),
            policy,
        },
    })
}

fn clean_names(names: Option<Vec<String>>) -> Vec<String> {
    names
        .unwrap_or_default()
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// 3. Resolve (total)
// ---------------------------------------------------------------------------

/// Outcome of config resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigResolution {
    Valid(Settings),
    Invalid { reason: String },
}

impl ConfigResolution {
    pub fn settings(&self) -> Option<&Settings> {
        match self {
            ConfigResolution::Valid(settings) => Some(settings),
            ConfigResolution::Invalid { .. } => None,
        }
    }
}

impl From<Result<Settings, ConfigError>> for ConfigResolution {
    fn from(result: Result<Settings, ConfigError>) -> Self {
        match result {
            Ok(settings) => ConfigResolution::Valid(settings),
            Err(err) => ConfigResolution::Invalid {
                reason: err.to_string(),
            },
        }
    }
}

pub fn resolve(raw: &RawConfig) -> ConfigResolution {
    sanitize(raw).into()
}

pub fn resolve_str(text: &str) -> ConfigResolution {
    RawConfig::from_yaml_str(text)
        .and_then(|raw| sanitize(&raw))
        .into()
}

/// Read, parse and sanitize the config file at `path`.
pub fn load_at(path: &Path) -> ConfigResolution {
    RawConfig::load(path).and_then(|raw| sanitize(&raw)).into()
}

// ---------------------------------------------------------------------------
// 4. Session
// ---------------------------------------------------------------------------

impl Session {
    /// Session values never make a config invalid; missing entries take defaults.
    pub fn from_raw(raw: &RawConfig) -> Self {
        let tracker_id = |tracker: &Option<RawTracker>| {
            tracker
                .as_ref()
                .and_then(|t| t.id.as_ref())
                .map(ToString::to_string)
                .filter(|id| !id.trim().is_empty())
        };
        Session {
            theme: raw
                .theme_config
                .as_ref()
                .and_then(|t| t.default_theme.clone())
                .unwrap_or_else(|| DEFAULT_THEME.to_string()),
            analytics_id: tracker_id(&raw.google_analytics),
            hotjar_id: tracker_id(&raw.hotjar),
            hotjar_snippet_version: raw
                .hotjar
                .as_ref()
                .and_then(|h| h.snippet_version)
                .unwrap_or(DEFAULT_HOTJAR_SNIPPET_VERSION),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session {
            theme: DEFAULT_THEME.to_string(),
            analytics_id: None,
            hotjar_id: None,
            hotjar_snippet_version: DEFAULT_HOTJAR_SNIPPET_VERSION,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const MINIMAL: &str = "github:\n  username: octocat\n";

    #[test]
    fn minimal_config_takes_defaults() {
        let settings = match resolve_str(MINIMAL) {
            ConfigResolution::Valid(s) => s,
            other => panic!("expected valid, got {other:?}"),
        };
        assert_eq!(settings.identity, Identity::from("octocat"));
        assert!(settings.projects.display);
        assert_eq!(settings.projects.header, DEFAULT_PROJECTS_HEADER);
        assert_eq!(
            settings.projects.policy,
            ProjectPolicy::Automatic(AutomaticPolicy {
                sort_by: SortKey::Stars,
                limit: DEFAULT_PROJECT_LIMIT,
                exclude: Exclusions::default(),
            })
        );
    }

    #[test]
    fn manual_mode_keeps_order_and_drops_blanks() {
        let yaml = r#"
github:
  username: octocat
projects:
  github:
    mode: manual
    manual:
      projects: ["octocat/b", "  ", " octocat/a "]
"#;
        let settings = resolve_str(yaml).settings().cloned().expect("valid");
        assert_eq!(
            settings.projects.policy,
            ProjectPolicy::Manual(ManualPolicy {
                projects: vec!["octocat/b".to_string(), "octocat/a".to_string()],
            })
        );
    }

    #[test]
    fn blank_username_is_invalid() {
        let resolution = resolve_str("github:\n  username: '   '\n");
        assert_eq!(
            resolution,
            ConfigResolution::Invalid {
                reason: "github.username is required".to_string()
            }
        );
    }

    #[rstest]
    #[case::blank("")]
    #[case::whitespace("   \n")]
    #[case::null("~\n")]
    #[case::no_known_keys("social:\n  x: y\n")]
    #[case::bare_map("{}\n")]
    fn empty_documents_are_invalid(#[case] text: &str) {
        assert!(
            matches!(resolve_str(text), ConfigResolution::Invalid { .. }),
            "{text:?} should be invalid"
        );
    }

    #[test]
    fn zero_limit_is_invalid() {
        let yaml = "github:\n  username: a\nprojects:\n  github:\n    automatic:\n      limit: 0\n";
        assert!(matches!(
            resolve_str(yaml),
            ConfigResolution::Invalid { reason } if reason.contains("limit")
        ));
    }

    #[test]
    fn unknown_mode_is_invalid() {
        let yaml = "github:\n  username: a\nprojects:\n  github:\n    mode: random\n";
        assert!(matches!(resolve_str(yaml), ConfigResolution::Invalid { .. }));
    }

    #[test]
    fn session_reads_numeric_and_text_ids() {
        let yaml = r#"
github:
  username: a
themeConfig:
  defaultTheme: dracula
googleAnalytics:
  id: G-ABC
hotjar:
  id: 12345
"#;
        let raw = RawConfig::from_yaml_str(yaml).expect("parse");
        let session = Session::from_raw(&raw);
        assert_eq!(session.theme, "dracula");
        assert_eq!(session.analytics_id.as_deref(), Some("G-ABC"));
        assert_eq!(session.hotjar_id.as_deref(), Some("12345"));
        assert_eq!(session.hotjar_snippet_version, DEFAULT_HOTJAR_SNIPPET_VERSION);
    }

    #[test]
    fn hotjar_snippet_version_is_read() {
        let yaml = "github:\n  username: a\nhotjar:\n  id: 1\n  snippetVersion: 7\n";
        let raw = RawConfig::from_yaml_str(yaml).expect("parse");
        assert_eq!(Session::from_raw(&raw).hotjar_snippet_version, 7);
        assert_eq!(Session::default().hotjar_snippet_version, 6);
        assert_eq!(Session::default().theme, DEFAULT_THEME);
    }
}
