//! # folio-fetch
//!
//! Remote data acquisition: which requests to issue ([`source`]), how they
//! travel ([`transport`]), how the results are assembled ([`fetcher`]) and how
//! failures become user-facing categories ([`classify`]).

pub mod classify;
pub mod fetcher;
pub mod relative;
pub mod source;
pub mod transport;

pub use classify::{classify, classify_at, RATE_LIMIT_RESET_HEADER};
pub use fetcher::{FetchOutcome, ProfileFetcher};
pub use source::{repository_request, ApiRequest};
pub use transport::{HttpTransport, Transport, TransportFailure, DEFAULT_API_BASE};
