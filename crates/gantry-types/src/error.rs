use thiserror::Error;

/// Errors raised while normalizing or validating an inbound webhook event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("no event type header found in webhook")]
    MissingEventType,

    #[error("webhook body is not valid JSON: {0}")]
    MalformedPayload(String),

    #[error("required event field '{0}' is missing or empty")]
    MissingField(&'static str),
}

/// Errors from the snapshot provider. Always fatal to an invocation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to clone {url}: {message}")]
    Clone { url: String, message: String },

    #[error("revision '{revision}' could not be checked out: {message}")]
    Checkout { revision: String, message: String },

    #[error("snapshot timed out after {0}s")]
    Timeout(u64),

    /// A clone URL or revision that git would parse as an option.
    #[error("refusing unsafe git argument: {0}")]
    UnsafeArgument(String),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single workflow definition file could not be used.
///
/// Never fatal: the loader records it and moves on to the next file.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read {file}: {message}")]
    Read { file: String, message: String },

    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("{file} does not contain a mapping at the top level")]
    NotAMapping { file: String },
}

/// Transport-level failure talking to the build executor.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("build executor request failed: {0}")]
    Transport(String),

    #[error("failed to encode dispatch payload: {0}")]
    Encoding(String),
}

/// Errors raised while loading process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error_display() {
        let err = EventError::MissingField("commit_id");
        assert_eq!(
            err.to_string(),
            "required event field 'commit_id' is missing or empty"
        );
    }

    #[test]
    fn test_snapshot_error_display() {
        let err = SnapshotError::Checkout {
            revision: "abc123".to_string(),
            message: "reference is not a tree".to_string(),
        };
        assert!(err.to_string().contains("abc123"));
        assert!(err.to_string().contains("reference is not a tree"));
    }

    #[test]
    fn test_definition_error_display() {
        let err = DefinitionError::NotAMapping {
            file: "build.yaml".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "build.yaml does not contain a mapping at the top level"
        );
    }
}
