use chrono::NaiveDateTime;
use thiserror::Error;

/// Failure while fetching a forecast.
///
/// Retry classification lives here, in one place: [`FetchError::is_transient`]
/// decides which variants the [`crate::fetch::Fetcher`] retries.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure reaching the provider.
    #[error("network error contacting forecast provider: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("forecast provider returned status {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The payload violated the provider contract. Never retried — a broken
    /// schema will not fix itself on the next attempt.
    #[error("malformed forecast response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FetchError::MalformedResponse(message.into())
    }

    /// Whether a retry could plausibly succeed: network failures and
    /// 5xx-class provider failures, nothing else.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Provider { status, .. } => status.is_server_error(),
            FetchError::MalformedResponse(_) => false,
        }
    }
}

/// A time selection that cannot be satisfied by the fetched dataset.
/// Refetching will not help; these are fatal for the invocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// The dataset starts after the requested instant, so there is no record
    /// "at or before" it. Usually a clock/data misalignment.
    #[error("no forecast data at or before {now} (forecast starts at {first})")]
    NoData {
        now: NaiveDateTime,
        first: NaiveDateTime,
    },

    /// The requested instant lies outside the fetched span entirely.
    #[error("requested time {requested} is outside the forecast range {first}..{last}")]
    OutOfRange {
        requested: NaiveDateTime,
        first: NaiveDateTime,
        last: NaiveDateTime,
    },
}

/// Failure while resolving a place name to coordinates.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("location \"{0}\" not found, try a more specific name")]
    NotFound(String),

    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding service returned status {0}")]
    Status(reqwest::StatusCode),
}
