//! Profile fetcher: profile request, then (optionally) the repository request.
//!
//! The two calls are strictly sequential because the repository request
//! depends on the profile's public repository count.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use folio_core::types::{ProfileSnapshot, Repository, Settings};

use crate::source::{repository_request, ApiRequest};
use crate::transport::{Transport, TransportFailure};

/// Profile and repositories assembled by one [`ProfileFetcher::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub profile: ProfileSnapshot,
    pub repositories: Vec<Repository>,
}

/// `GET /users/{identity}` body; only the fields the cards use.
#[derive(Debug, Clone, Default, Deserialize)]
struct UserRecord {
    avatar_url: Option<String>,
    name: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    company: Option<String>,
    public_repos: Option<u64>,
}

/// `GET /search/repositories` body.
#[derive(Debug, Clone, Deserialize)]
struct SearchResults {
    #[serde(default)]
    items: Vec<Repository>,
}

impl UserRecord {
    fn into_snapshot(self) -> ProfileSnapshot {
        ProfileSnapshot {
            avatar: non_empty(self.avatar_url).unwrap_or_default(),
            // A single space keeps the name line from collapsing in the layout.
            name: non_empty(self.name).unwrap_or_else(|| " ".to_string()),
            bio: non_empty(self.bio).unwrap_or_default(),
            location: non_empty(self.location).unwrap_or_default(),
            company: non_empty(self.company).unwrap_or_default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct ProfileFetcher<T> {
    transport: T,
}

impl<T: Transport> ProfileFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the two-step load. Only transport failures propagate; missing
    /// optional profile fields never fail assembly.
    pub async fn load(&self, settings: &Settings) -> Result<FetchOutcome, TransportFailure> {
        let user: UserRecord = self
            .get_json(&ApiRequest::profile(&settings.identity))
            .await?;
        let public_repos = user.public_repos.unwrap_or(0);
        let profile = user.into_snapshot();

        let repositories = if settings.projects.display {
            self.repositories(settings, public_repos).await?
        } else {
            Vec::new()
        };

        tracing::info!(
            identity = %settings.identity,
            public_repos,
            repositories = repositories.len(),
            "profile loaded",
        );
        Ok(FetchOutcome {
            profile,
            repositories,
        })
    }

    async fn repositories(
        &self,
        settings: &Settings,
        public_repos: u64,
    ) -> Result<Vec<Repository>, TransportFailure> {
        let Some(request) = repository_request(settings, public_repos) else {
            tracing::debug!(
                identity = %settings.identity,
                mode = settings.projects.policy.mode(),
                "no repository request needed",
            );
            return Ok(Vec::new());
        };
        let results: SearchResults = self.get_json(&request).await?;
        Ok(results.items)
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<R, TransportFailure> {
        let body = self.transport.get(request).await?;
        serde_json::from_str(&body).map_err(|source| TransportFailure::Decode {
            url: self.transport.url_for(request),
            source,
        })
    }
}
