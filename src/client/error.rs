//! Scanner Client Error Types

/// Longest response body kept in an `Api` error
const MAX_ERROR_BODY: usize = 512;

/// Failures talking to an HTTP service (the scanner API or the classifier)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, request timeout and the like
    #[error("transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// The peer answered with a non-success HTTP status
    #[error("{endpoint} answered HTTP {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The peer answered but the response broke the expected contract
    #[error("unexpected response from {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },
}

impl ClientError {
    pub fn transport(endpoint: &str, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    pub fn api(endpoint: &str, status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        Self::Api {
            endpoint: endpoint.to_string(),
            status,
            body,
        }
    }

    pub fn protocol(endpoint: &str, message: impl ToString) -> Self {
        Self::Protocol {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }

    /// Only transport failures may clear up on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Api { endpoint, .. }
            | Self::Protocol { endpoint, .. } => endpoint,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
