use axum::http::StatusCode;
use chrono::NaiveDate;

/// Failure to retrieve a raw dataset.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure, including the client timeout.
    #[error("request for {dataset} failed: {source}")]
    Http {
        dataset: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{dataset} responded with HTTP {status}")]
    Status { dataset: String, status: u16 },

    /// Body was not a JSON array of flat objects.
    #[error("malformed {dataset} payload: {reason}")]
    Payload { dataset: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
#[error("{dataset} row {row}: field `{field}` {reason}")]
pub struct SchemaError {
    pub dataset: String,
    pub row: usize,
    pub field: String,
    pub reason: String,
}

/// Startup failures. Any of these stops the dashboard from serving.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("fips {fips} matches {matches} population records, expected at most one")]
    JoinIntegrity { fips: String, matches: usize },

    #[error("locality {locality} has more than one report for {date}")]
    DuplicateReport { locality: String, date: NaiveDate },
}

/// Failures scoped to a single trend summary request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrendError {
    #[error("no case reports for locality {locality}")]
    UnknownLocality { locality: String },

    #[error("insufficient data for {locality}: no report for {date}")]
    MissingData { locality: String, date: NaiveDate },

    #[error("no baseline for {locality}: zero new cases in the prior window")]
    NoBaseline { locality: String },

    #[error("case counts for {locality} are out of range")]
    Overflow { locality: String },
}

impl TrendError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownLocality { .. } => "unknown_locality",
            Self::MissingData { .. } => "missing_data",
            Self::NoBaseline { .. } => "no_baseline",
            Self::Overflow { .. } => "overflow",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
