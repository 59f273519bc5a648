//! Transport failure → user-facing [`ErrorCategory`].
//!
//! Precedence:
//! 1. No response (network or decode failure) → `Generic`
//! 2. 403 → `RateLimited`, reset time from `x-ratelimit-reset` (epoch seconds, absent = 0)
//! 3. 404 → `InvalidIdentity`
//! 4. Any other status → `Generic`

use chrono::{DateTime, Utc};

use folio_core::types::ErrorCategory;

use crate::relative::{from_unix_seconds, relative_to};
use crate::transport::TransportFailure;

pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Classify against the current clock. Logs the failure; never alters control flow.
pub fn classify(failure: &TransportFailure) -> ErrorCategory {
    classify_at(failure, Utc::now())
}

pub fn classify_at(failure: &TransportFailure, now: DateTime<Utc>) -> ErrorCategory {
    let category = match failure {
        TransportFailure::Network { .. } | TransportFailure::Decode { .. } => {
            ErrorCategory::Generic
        }
        TransportFailure::Status { status: 403, .. } => ErrorCategory::RateLimited {
            reset: relative_to(from_unix_seconds(reset_seconds(failure)), now),
        },
        TransportFailure::Status { status: 404, .. } => ErrorCategory::InvalidIdentity,
        TransportFailure::Status { .. } => ErrorCategory::Generic,
    };

    tracing::error!(
        error = %failure,
        url = failure.url(),
        category = %category,
        "profile load failed",
    );
    category
}

fn reset_seconds(failure: &TransportFailure) -> i64 {
    failure
        .header(RATE_LIMIT_RESET_HEADER)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(0)
}
