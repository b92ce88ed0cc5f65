use std::fmt;

use serde::Deserialize;
use serde_json::Number;

use crate::format::{capitalize, number_text};

pub const PROCESSING_MESSAGE: &str = "Processing...";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    /// Anything else the backend reports; shown but never terminal.
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(value),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `GET /api/status/{job_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<Number>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn view(&self) -> StatusView {
        let progress = self.status.shows_progress().then(|| {
            let percent = format!(
                "{}%",
                self.progress
                    .as_ref()
                    .map(number_text)
                    .unwrap_or_else(|| "0".to_string())
            );
            ProgressView {
                width: percent.clone(),
                label: percent,
                message: self
                    .message
                    .clone()
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| PROCESSING_MESSAGE.to_string()),
            }
        });

        StatusView {
            badge_text: capitalize(self.status.as_str()),
            badge_class: format!("status-badge status-{}", self.status.as_str()),
            timestamp: self.timestamp.clone().filter(|raw| !raw.trim().is_empty()),
            progress,
        }
    }

    /// Reason shown when the job ended in `failed`.
    pub fn failure_reason(&self) -> String {
        self.error
            .clone()
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| "Job failed".to_string())
    }
}

/// What one status response puts on the page. Every poll replaces the
/// previous view wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub badge_text: String,
    pub badge_class: String,
    /// Raw server timestamp; the page formats it in the browser locale.
    pub timestamp: Option<String>,
    /// Present only while the job is pending or running.
    pub progress: Option<ProgressView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    /// CSS width of the fill bar.
    pub width: String,
    pub label: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> StatusResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn running_progress_is_taken_verbatim() {
        let view = parse(json!({"status": "running", "progress": 42})).view();
        let progress = view.progress.unwrap();
        assert_eq!(progress.width, "42%");
        assert_eq!(progress.label, "42%");
        assert_eq!(progress.message, PROCESSING_MESSAGE);
        assert_eq!(view.badge_text, "Running");
        assert_eq!(view.badge_class, "status-badge status-running");
    }

    #[test]
    fn whole_float_progress_drops_fraction() {
        let view = parse(json!({"status": "running", "progress": 42.0})).view();
        let progress = view.progress.unwrap();
        assert_eq!(progress.width, "42%");
        assert_eq!(progress.label, "42%");
    }

    #[test]
    fn fractional_progress_is_not_rounded() {
        let view = parse(json!({"status": "pending", "progress": 12.5, "message": "Queued"})).view();
        let progress = view.progress.unwrap();
        assert_eq!(progress.label, "12.5%");
        assert_eq!(progress.message, "Queued");
    }

    #[test]
    fn terminal_states_hide_progress() {
        let completed = parse(json!({"status": "completed", "progress": 100}));
        assert!(completed.status.is_terminal());
        assert_eq!(completed.view().progress, None);

        let failed = parse(json!({"status": "failed", "progress": 0, "error": null}));
        assert!(failed.status.is_terminal());
        assert_eq!(failed.failure_reason(), "Job failed");
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let response = parse(json!({"status": "queued"}));
        assert_eq!(response.status, JobStatus::Other("queued".to_string()));
        assert!(!response.status.is_terminal());
        assert_eq!(response.view().progress, None);
        assert_eq!(response.view().badge_text, "Queued");
    }

    #[test]
    fn timestamp_passes_through() {
        let view = parse(json!({
            "status": "running",
            "progress": 30,
            "timestamp": "2025-03-01T10:20:30.123456"
        }))
        .view();
        assert_eq!(view.timestamp.as_deref(), Some("2025-03-01T10:20:30.123456"));
    }
}
