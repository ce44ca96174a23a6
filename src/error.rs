use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for upload and provisioning operations.
///
/// Every failure a batch can hit falls into one of four kinds; the batch
/// runner logs and counts them without aborting sibling records.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source file missing or unreadable
    #[error("local I/O error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bucket missing or auth failure; retrying without operator action is pointless
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Throttling or timeout; a later attempt may succeed
    #[error("transient backend error: {0}")]
    TransientBackend(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Classify an AWS SDK error into the taxonomy.
    ///
    /// Transport-level timeouts and dispatch failures are transient; service
    /// errors are sorted by their error code.
    pub fn from_sdk<E, R>(err: &SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata,
    {
        let code = err.code().map(str::to_owned);
        let message = err
            .message()
            .map(str::to_owned)
            .unwrap_or_else(|| describe_variant(err));

        match err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
                Self::TransientBackend(message)
            }
            _ => classify_code(code.as_deref(), &message),
        }
    }

    /// Whether a later attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientBackend(_))
    }

    /// Short kind name for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LocalIo { .. } => "local_io",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::TransientBackend(_) => "transient_backend",
            Self::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(format!("JSON serialization failed: {err}"))
    }
}

/// Sort a service error code into the taxonomy. Pure so it is testable
/// without constructing SDK error values.
fn classify_code(code: Option<&str>, message: &str) -> SyncError {
    match code {
        Some(
            code @ ("NoSuchBucket" | "AccessDenied" | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch" | "ExpiredToken" | "AccountProblem"),
        ) => SyncError::BackendUnavailable(format!("{code}: {message}")),
        Some(
            code @ ("SlowDown" | "RequestTimeout" | "ServiceUnavailable" | "InternalError"
            | "Throttling" | "ThrottlingException" | "RequestLimitExceeded"),
        ) => SyncError::TransientBackend(format!("{code}: {message}")),
        Some(other) => SyncError::Other(format!("{other}: {message}")),
        None => SyncError::Other(message.to_string()),
    }
}

fn describe_variant<E, R>(err: &SdkError<E, R>) -> String {
    match err {
        SdkError::ConstructionFailure(_) => "request construction failed".to_string(),
        SdkError::TimeoutError(_) => "request timed out".to_string(),
        SdkError::DispatchFailure(_) => "request dispatch failed".to_string(),
        SdkError::ResponseError(_) => "unparseable response".to_string(),
        SdkError::ServiceError(_) => "service error".to_string(),
        _ => "unknown SDK error".to_string(),
    }
}
