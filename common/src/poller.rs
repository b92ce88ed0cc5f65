//! Job lifecycle as seen from the results page.
//!
//! The server is the only source of truth; the poller just remembers which
//! of the four page states it is in so that the terminal transitions
//! (stop the timer, fetch results or show the failure) fire exactly once,
//! even when overlapping status requests come back out of order.

use crate::error::FetchFailure;
use crate::status::{JobStatus, StatusResponse, StatusView};

pub const POLL_INTERVAL_MS: u32 = 3_000;
pub const NO_JOB_ID_MESSAGE: &str = "Error: No job ID provided";

const STATUS_TRANSPORT_PREFIX: &str = "Error checking job status: ";
const STATUS_HTTP_FALLBACK: &str = "Failed to fetch status";
const RESULTS_TRANSPORT_PREFIX: &str = "Error loading results: ";
const RESULTS_HTTP_FALLBACK: &str = "Failed to load results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// The page URL carried no job id; nothing is ever requested.
    NoId,
    Polling,
    Completed,
    Failed,
}

/// What the page should do with one status outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    /// Non-terminal status: redraw and keep polling.
    Render(StatusView),
    /// First `completed`: redraw, cancel the timer, fetch results once.
    Complete(StatusView),
    /// First `failed`: redraw, cancel the timer, show the reason.
    Fail { view: StatusView, reason: String },
    /// Transient request failure; polling continues.
    Error(String),
    /// Arrived after the page already reached a terminal state.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct JobPoller {
    job_id: Option<String>,
    state: PollState,
}

impl JobPoller {
    /// `job_id` is the raw query parameter; empty counts as missing.
    pub fn new(job_id: Option<String>) -> Self {
        let job_id = job_id.filter(|id| !id.is_empty());
        let state = if job_id.is_some() {
            PollState::Polling
        } else {
            PollState::NoId
        };
        Self { job_id, state }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Whether a timer tick should still issue a status request.
    pub fn should_poll(&self) -> bool {
        self.state == PollState::Polling
    }

    pub fn status_url(&self) -> Option<String> {
        self.job_id.as_deref().map(|id| format!("/api/status/{id}"))
    }

    pub fn results_url(&self) -> Option<String> {
        self.job_id.as_deref().map(|id| format!("/api/results/{id}"))
    }

    pub fn on_status(&mut self, response: &StatusResponse) -> PollEvent {
        if self.state != PollState::Polling {
            return PollEvent::Ignored;
        }

        let view = response.view();
        match response.status {
            JobStatus::Completed => {
                self.state = PollState::Completed;
                PollEvent::Complete(view)
            }
            JobStatus::Failed => {
                self.state = PollState::Failed;
                PollEvent::Fail {
                    view,
                    reason: response.failure_reason(),
                }
            }
            _ => PollEvent::Render(view),
        }
    }

    /// A status request that threw or came back non-2xx. The state is left
    /// alone so the next tick tries again.
    pub fn on_status_failure(&self, failure: &FetchFailure) -> PollEvent {
        if self.state != PollState::Polling {
            return PollEvent::Ignored;
        }
        PollEvent::Error(failure.describe(STATUS_TRANSPORT_PREFIX, STATUS_HTTP_FALLBACK))
    }
}

/// Message for a failed results fetch. Terminal for the page load.
pub fn results_failure_message(failure: &FetchFailure) -> String {
    failure.describe(RESULTS_TRANSPORT_PREFIX, RESULTS_HTTP_FALLBACK)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status(value: serde_json::Value) -> StatusResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_or_empty_id_never_polls() {
        let poller = JobPoller::new(None);
        assert_eq!(poller.state(), PollState::NoId);
        assert!(!poller.should_poll());
        assert_eq!(poller.status_url(), None);

        let poller = JobPoller::new(Some(String::new()));
        assert_eq!(poller.state(), PollState::NoId);
    }

    #[test]
    fn builds_endpoint_urls_from_job_id() {
        let poller = JobPoller::new(Some("abc".to_string()));
        assert_eq!(poller.status_url().as_deref(), Some("/api/status/abc"));
        assert_eq!(poller.results_url().as_deref(), Some("/api/results/abc"));
    }

    #[test]
    fn running_status_keeps_polling() {
        let mut poller = JobPoller::new(Some("abc".to_string()));
        let event = poller.on_status(&status(json!({"status": "running", "progress": 42})));
        match event {
            PollEvent::Render(view) => {
                assert_eq!(view.progress.unwrap().label, "42%");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(poller.should_poll());
    }

    #[test]
    fn completed_fires_once_and_stops_polling() {
        let mut poller = JobPoller::new(Some("abc".to_string()));
        let completed = status(json!({"status": "completed", "progress": 100}));

        assert!(matches!(poller.on_status(&completed), PollEvent::Complete(_)));
        assert_eq!(poller.state(), PollState::Completed);
        assert!(!poller.should_poll());

        // An overlapping request answering late must not trigger a second fetch.
        assert_eq!(poller.on_status(&completed), PollEvent::Ignored);
        let late_running = status(json!({"status": "running", "progress": 90}));
        assert_eq!(poller.on_status(&late_running), PollEvent::Ignored);
    }

    #[test]
    fn failed_reports_server_reason() {
        let mut poller = JobPoller::new(Some("abc".to_string()));
        let event = poller.on_status(&status(json!({
            "status": "failed",
            "progress": 0,
            "error": "deepcovvar exited with status 1"
        })));
        match event {
            PollEvent::Fail { reason, view } => {
                assert_eq!(reason, "deepcovvar exited with status 1");
                assert_eq!(view.badge_text, "Failed");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(poller.state(), PollState::Failed);
    }

    #[test]
    fn request_failures_do_not_stop_polling() {
        let poller = JobPoller::new(Some("abc".to_string()));
        let transport = poller.on_status_failure(&FetchFailure::Transport("offline".to_string()));
        assert_eq!(
            transport,
            PollEvent::Error("Error checking job status: offline".to_string())
        );

        let http = poller.on_status_failure(&FetchFailure::Http {
            status: 404,
            error: Some("Job not found".to_string()),
        });
        assert_eq!(http, PollEvent::Error("Job not found".to_string()));
        assert!(poller.should_poll());
    }

    #[test]
    fn results_failures_use_results_wording() {
        assert_eq!(
            results_failure_message(&FetchFailure::Http {
                status: 400,
                error: None
            }),
            "Failed to load results"
        );
        assert_eq!(
            results_failure_message(&FetchFailure::Transport("boom".to_string())),
            "Error loading results: boom"
        );
    }
}
