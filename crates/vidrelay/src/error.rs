use std::time::Duration;

use crate::pool::Category;

/// Why a single instance's response was not accepted.
///
/// Rejections are recovered inside the dispatcher: they demote the instance
/// and dispatch moves on. They never reach the caller on their own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("provider reported error: {message}")]
    ProviderReported { message: String },

    #[error("semantically empty: {reason}")]
    SemanticallyEmpty { reason: String },

    #[error("stream unplayable: {reason}")]
    StreamUnplayable { reason: String },
}

impl Rejection {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::ProviderReported {
            message: message.into(),
        }
    }

    pub fn empty(reason: impl Into<String>) -> Self {
        Self::SemanticallyEmpty {
            reason: reason.into(),
        }
    }

    pub fn unplayable(reason: impl Into<String>) -> Self {
        Self::StreamUnplayable {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> RejectReason {
        match self {
            Self::Transport { .. } => RejectReason::TransportError,
            Self::MalformedPayload { .. } => RejectReason::NonJson,
            Self::ProviderReported { .. } => RejectReason::ProviderReportedError,
            Self::SemanticallyEmpty { .. } => RejectReason::EmptyResultSet,
            Self::StreamUnplayable { .. } => RejectReason::StreamUnplayable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    TransportError,
    NonJson,
    ProviderReportedError,
    EmptyResultSet,
    StreamUnplayable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::TransportError => "transport-error",
            RejectReason::NonJson => "non-json",
            RejectReason::ProviderReportedError => "provider-reported-error",
            RejectReason::EmptyResultSet => "empty-result-set",
            RejectReason::StreamUnplayable => "stream-unplayable",
        }
    }
}

/// Outcome of validating one instance response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub reason: Option<RejectReason>,
}

impl ValidationOutcome {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }
}

impl<T> From<&std::result::Result<T, Rejection>> for ValidationOutcome {
    fn from(result: &std::result::Result<T, Rejection>) -> Self {
        match result {
            Ok(_) => Self::accepted(),
            Err(rejection) => Self::rejected(rejection.reason()),
        }
    }
}

/// Errors surfaced to callers of the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(
        "no {category} instance accepted the request ({attempted} attempted, deadline reached: {deadline_hit})"
    )]
    AllInstancesExhausted {
        category: Category,
        attempted: usize,
        deadline_hit: bool,
    },

    #[error("instance pool reload failed: {reason}")]
    PoolReload { reason: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("{backend} backend failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },

    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
}

impl RelayError {
    pub fn exhausted(category: Category, attempted: usize, deadline_hit: bool) -> Self {
        Self::AllInstancesExhausted {
            category,
            attempted,
            deadline_hit,
        }
    }

    pub fn pool_reload(reason: impl Into<String>) -> Self {
        Self::PoolReload {
            reason: reason.into(),
        }
    }

    pub fn backend(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            reason: reason.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Terminal failures a presentation layer should render as a
    /// request-timeout-class "temporarily unavailable" response.
    pub fn is_temporarily_unavailable(&self) -> bool {
        matches!(
            self,
            Self::AllInstancesExhausted { .. } | Self::PoolReload { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

pub(crate) fn describe_timeout(limit: Duration) -> String {
    format!("timed out after {}ms", limit.as_millis())
}
