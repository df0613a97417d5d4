use thiserror::Error;

/// Result type alias for helper operations.
pub type Result<T> = std::result::Result<T, HelperError>;

/// Errors returned by the helpers.
#[derive(Debug, Error)]
pub enum HelperError {
    /// Negative bandwidth or a shaping table with no entries.
    #[error("invalid bandwidth {bandwidth}: {reason}")]
    InvalidBandwidth { bandwidth: i64, reason: String },

    /// An upstream record is missing an expected key or holds an unusable value.
    #[error("malformed {source_name} data: {message}")]
    MalformedSourceData { source_name: String, message: String },

    /// A compliance pattern failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    PatternCompileError { pattern: String, message: String },

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid vlan list: {0}")]
    InvalidVlanList(String),

    /// Failure reported by an injected device collaborator.
    #[error("collaborator failed running '{command}': {source}")]
    Collaborator {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl HelperError {
    pub fn malformed(source_name: &str, message: impl Into<String>) -> Self {
        Self::MalformedSourceData {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn collaborator(command: &str, source: anyhow::Error) -> Self {
        Self::Collaborator {
            command: command.to_string(),
            source,
        }
    }
}
