use serde::Deserialize;
use thiserror::Error;

/// Presence checks run before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide input: upload a file, paste sequences, or enter an accession ID")]
    MissingInput,
    #[error("Please select at least one prediction phase")]
    NoPhaseSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown phase `{0}`")]
    Phase(String),
    #[error("unknown sequence type `{0}`")]
    SequenceType(String),
    #[error("unknown database `{0}`")]
    Database(String),
}

/// Why a call to the job API did not produce the expected body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The request threw or the body could not be decoded.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16, error: Option<String> },
}

impl FetchFailure {
    /// User-facing text: transport errors get `transport_prefix` plus the
    /// underlying error, HTTP errors show the server message verbatim or
    /// `http_fallback` when the body carried none.
    pub fn describe(&self, transport_prefix: &str, http_fallback: &str) -> String {
        match self {
            Self::Transport(message) => format!("{transport_prefix}{message}"),
            Self::Http { error, .. } => error
                .as_deref()
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(http_fallback)
                .to_string(),
        }
    }
}

/// `{error}` body returned by the job API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_prefers_server_message() {
        let failure = FetchFailure::Http {
            status: 404,
            error: Some("Job not found".to_string()),
        };
        assert_eq!(
            failure.describe("Error checking job status: ", "Failed to fetch status"),
            "Job not found"
        );
    }

    #[test]
    fn http_failure_shows_server_message_untrimmed() {
        let failure = FetchFailure::Http {
            status: 400,
            error: Some(" Invalid FASTA format\n".to_string()),
        };
        assert_eq!(
            failure.describe("Error loading results: ", "Failed to load results"),
            " Invalid FASTA format\n"
        );
    }

    #[test]
    fn http_failure_without_message_uses_fallback() {
        let failure = FetchFailure::Http {
            status: 500,
            error: Some("  ".to_string()),
        };
        assert_eq!(
            failure.describe("Error: ", "Failed to load results"),
            "Failed to load results"
        );
    }

    #[test]
    fn transport_failure_keeps_underlying_text() {
        let failure = FetchFailure::Transport("NetworkError when attempting to fetch".to_string());
        assert_eq!(
            failure.describe("Error loading results: ", "unused"),
            "Error loading results: NetworkError when attempting to fetch"
        );
    }

    #[test]
    fn validation_messages_match_banner_text() {
        assert_eq!(
            ValidationError::NoPhaseSelected.to_string(),
            "Please select at least one prediction phase"
        );
        assert!(ValidationError::MissingInput.to_string().contains("accession ID"));
    }
}
