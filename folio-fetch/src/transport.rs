//! Transport seam between the fetcher and the platform API.
//!
//! [`HttpTransport`] is the production implementation (ureq on a blocking
//! worker); tests substitute a scripted [`Transport`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::source::ApiRequest;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Versioned JSON representation requested from the platform.
pub const MEDIA_TYPE: &str = "application/vnd.github.v3+json";

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

/// Any failure arising from a remote call.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The platform answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        status: u16,
        url: String,
        /// Response headers, names lower-cased.
        headers: BTreeMap<String, String>,
    },

    /// No response: DNS, connect, TLS or body read failure.
    #[error("network error requesting {url}: {message}")]
    Network { url: String, message: String },

    /// A response arrived but its body was not the expected JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportFailure {
    /// Status code when the failure carries a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Case-insensitive response header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            TransportFailure::Status { headers, .. } => headers
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportFailure::Status { url, .. }
            | TransportFailure::Network { url, .. }
            | TransportFailure::Decode { url, .. } => url,
        }
    }
}

/// Performs one `GET` and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportFailure>;

    /// URL reported in failures for `request`, without the query string.
    fn url_for(&self, request: &ApiRequest) -> String {
        request.path.clone()
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportFailure> {
        (**self).get(request).await
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        (**self).url_for(request)
    }
}

/// ureq-backed transport. No timeout is configured: a hung request keeps the
/// caller suspended.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &ApiRequest) -> Result<String, TransportFailure> {
        let agent = self.agent.clone();
        let url = self.url_for(request);
        let query = request.query.clone();
        tracing::debug!(url = %url, "requesting");
        let join_url = url.clone();
        tokio::task::spawn_blocking(move || get_blocking(&agent, &url, &query))
            .await
            .map_err(|err| TransportFailure::Network {
                url: join_url,
                message: format!("request task join error: {err}"),
            })?
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }
}

fn get_blocking(
    agent: &ureq::Agent,
    url: &str,
    query: &[(&'static str, String)],
) -> Result<String, TransportFailure> {
    let mut request = agent
        .get(url)
        .set("Accept", MEDIA_TYPE)
        .set("Content-Type", MEDIA_TYPE);
    for (name, value) in query {
        request = request.query(name, value);
    }

    match request.call() {
        Ok(response) => response
            .into_string()
            .map_err(|err| TransportFailure::Network {
                url: url.to_string(),
                message: format!("failed to read response body: {err}"),
            }),
        Err(ureq::Error::Status(status, response)) => Err(TransportFailure::Status {
            status,
            url: url.to_string(),
            headers: collect_headers(&response),
        }),
        Err(ureq::Error::Transport(transport)) => Err(TransportFailure::Network {
            url: url.to_string(),
            message: transport.to_string(),
        }),
    }
}

fn collect_headers(response: &ureq::Response) -> BTreeMap<String, String> {
    response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            response
                .header(&name)
                .map(|value| (name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}
