use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{FetchFailure, ValidationError};
use crate::phase::{DEFAULT_THRESHOLD, Database, Phase, SequenceType};

pub const MODEL_TYPE: &str = "optimized";
pub const PREDICT_ENDPOINT: &str = "/api/predict";
pub const DEMO_FASTA_PATH: &str = "/demo/demo.fasta";
/// Delay between a successful submit and the jump to the results view.
pub const REDIRECT_DELAY_MS: u32 = 2_000;

pub const SELECT_ALL_LABEL: &str = "Select All Phases";
pub const DESELECT_ALL_LABEL: &str = "Deselect All Phases";
pub const SUBMIT_LABEL: &str = "Run Prediction";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const NO_FILE_LABEL: &str = "Choose file";

pub const SUBMITTING_BANNER: &str = "Submitting prediction job...";
pub const DEMO_LOADED_BANNER: &str = "Demo FASTA loaded successfully";
pub const DEMO_FAILED_BANNER: &str = "Failed to load demo FASTA";
pub const THRESHOLDS_RESET_BANNER: &str = "Thresholds reset to default values (50%)";

/// Pair of class thresholds for a binary phase, kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdPair {
    pub first: String,
    pub second: String,
}

impl ThresholdPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn joined(&self) -> String {
        format!("{},{}", self.first, self.second)
    }
}

impl Default for ThresholdPair {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_THRESHOLD)
    }
}

/// Values of the submission form controls at one point in time.
///
/// `Default` is the state the reset button restores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    /// Name of the first selected file, if any.
    pub file_name: Option<String>,
    pub sequence_text: String,
    pub accession_id: String,
    pub database: Database,
    pub sequence_type: SequenceType,
    pub phases: PhaseSelection,
    pub thresholds: BTreeMap<Phase, ThresholdPair>,
    pub email: String,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self {
            file_name: None,
            sequence_text: String::new(),
            accession_id: String::new(),
            database: Database::default(),
            sequence_type: SequenceType::default(),
            phases: PhaseSelection::default(),
            thresholds: Phase::ALL
                .into_iter()
                .filter(|phase| phase.requires_thresholds())
                .map(|phase| (phase, ThresholdPair::default()))
                .collect(),
            email: String::new(),
        }
    }
}

impl FormSnapshot {
    pub fn has_file(&self) -> bool {
        self.file_name.is_some()
    }

    pub fn has_text(&self) -> bool {
        !self.sequence_text.trim().is_empty()
    }

    pub fn has_accession(&self) -> bool {
        !self.accession_id.trim().is_empty()
    }

    /// Label next to the file picker.
    pub fn file_label(&self) -> &str {
        self.file_name.as_deref().unwrap_or(NO_FILE_LABEL)
    }

    /// Runs the presence checks and assembles the request. Input checks
    /// come before the phase check.
    pub fn validate(&self) -> Result<JobRequest, ValidationError> {
        let input = if self.has_file() {
            PrimaryInput::File {
                name: self.file_name.clone().unwrap_or_default(),
            }
        } else if self.has_text() {
            PrimaryInput::Text(self.sequence_text.clone())
        } else if self.has_accession() {
            PrimaryInput::Accession {
                id: self.accession_id.trim().to_string(),
                database: self.database,
            }
        } else {
            return Err(ValidationError::MissingInput);
        };

        let phases = self.phases.checked();
        if phases.is_empty() {
            return Err(ValidationError::NoPhaseSelected);
        }

        let thresholds = phases
            .iter()
            .filter(|phase| phase.requires_thresholds())
            .map(|phase| {
                let pair = self.thresholds.get(phase).cloned().unwrap_or_default();
                (*phase, pair)
            })
            .collect();

        let email = self.email.trim();

        Ok(JobRequest {
            sequence_type: self.sequence_type,
            phases,
            thresholds,
            model_type: MODEL_TYPE,
            verbose: false,
            email: (!email.is_empty()).then(|| email.to_string()),
            input,
        })
    }
}

/// Checked state of every phase checkbox, in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSelection {
    entries: Vec<(Phase, bool)>,
}

impl Default for PhaseSelection {
    fn default() -> Self {
        Self::from_entries(Phase::ALL.into_iter().map(|phase| (phase, false)))
    }
}

impl PhaseSelection {
    pub fn from_entries(entries: impl IntoIterator<Item = (Phase, bool)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn set(&mut self, phase: Phase, checked: bool) {
        for entry in &mut self.entries {
            if entry.0 == phase {
                entry.1 = checked;
            }
        }
    }

    pub fn is_checked(&self, phase: Phase) -> bool {
        self.entries
            .iter()
            .any(|(candidate, checked)| *candidate == phase && *checked)
    }

    pub fn checked(&self) -> Vec<Phase> {
        self.entries
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(phase, _)| *phase)
            .collect()
    }

    pub fn all_checked(&self) -> bool {
        self.entries.iter().all(|(_, checked)| *checked)
    }

    /// Flips every box to the opposite of "all checked" and returns the new
    /// toggle button label.
    pub fn toggle_all(&mut self) -> &'static str {
        let target = !self.all_checked();
        for entry in &mut self.entries {
            entry.1 = target;
        }
        self.toggle_label()
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.all_checked() {
            DESELECT_ALL_LABEL
        } else {
            SELECT_ALL_LABEL
        }
    }

    /// The threshold panel shows while any checked phase takes thresholds.
    pub fn thresholds_visible(&self) -> bool {
        self.entries
            .iter()
            .any(|(phase, checked)| *checked && phase.requires_thresholds())
    }
}

/// The single primary input sent with a job; file beats text beats
/// accession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryInput {
    File { name: String },
    Text(String),
    Accession { id: String, database: Database },
}

/// One multipart entry. File entries name the field only; the caller
/// attaches the actual blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: &'static str },
}

impl FormField {
    fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } => name,
            Self::File { name } => name,
        }
    }
}

/// A validated job submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub sequence_type: SequenceType,
    pub phases: Vec<Phase>,
    pub thresholds: BTreeMap<Phase, ThresholdPair>,
    pub model_type: &'static str,
    pub verbose: bool,
    pub email: Option<String>,
    pub input: PrimaryInput,
}

impl JobRequest {
    /// Multipart fields in the order the backend receives them.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![FormField::text("sequence_type", self.sequence_type.as_str())];

        for phase in &self.phases {
            fields.push(FormField::text("phases[]", phase.to_string()));
        }

        for phase in &self.phases {
            if let Some(pair) = self.thresholds.get(phase) {
                fields.push(FormField::text(phase.thresholds_field(), pair.joined()));
            }
        }

        fields.push(FormField::text("model_type", self.model_type));
        fields.push(FormField::text("verbose", self.verbose.to_string()));

        if let Some(email) = &self.email {
            fields.push(FormField::text("email", email.clone()));
        }

        match &self.input {
            PrimaryInput::File { .. } => fields.push(FormField::File { name: "file" }),
            PrimaryInput::Text(text) => fields.push(FormField::text("sequence_text", text.clone())),
            PrimaryInput::Accession { id, database } => {
                fields.push(FormField::text("accession_id", id.clone()));
                fields.push(FormField::text("database", database.as_str()));
            }
        }

        fields
    }
}

/// Body of `POST /api/predict`; `job_id` on success, `error` otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { job_id: String },
    Rejected { message: String },
}

impl SubmitOutcome {
    pub fn from_response(ok: bool, body: SubmitResponse) -> Self {
        match (ok, body.job_id) {
            (true, Some(job_id)) if !job_id.trim().is_empty() => Self::Accepted { job_id },
            _ => Self::Rejected {
                message: format!(
                    "Error: {}",
                    body.error
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| "Unknown error occurred".to_string())
                ),
            },
        }
    }

    /// The request threw or its body could not be read.
    pub fn from_failure(failure: &FetchFailure) -> Self {
        Self::Rejected {
            message: format!("Error: {}", failure.describe("", "Unknown error occurred")),
        }
    }

    pub fn banner_text(&self) -> String {
        match self {
            Self::Accepted { job_id } => format!("Job submitted successfully! Job ID: {job_id}"),
            Self::Rejected { message } => message.clone(),
        }
    }
}

pub fn results_page_url(job_id: &str) -> String {
    format!("results.html?job_id={job_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

impl BannerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Class list of the submission status banner.
pub fn banner_class(kind: BannerKind) -> String {
    format!("status-message {}", kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(number: u8) -> Phase {
        Phase::new(number).unwrap()
    }

    fn snapshot_with_text(text: &str, checked: &[u8]) -> FormSnapshot {
        let mut form = FormSnapshot {
            sequence_text: text.to_string(),
            ..FormSnapshot::default()
        };
        for number in checked {
            form.phases.set(phase(*number), true);
        }
        form
    }

    fn text_fields(fields: &[FormField]) -> Vec<(String, String)> {
        fields
            .iter()
            .filter_map(|field| match field {
                FormField::Text { name, value } => Some((name.clone(), value.clone())),
                FormField::File { .. } => None,
            })
            .collect()
    }

    #[test]
    fn rejects_form_without_any_input() {
        let mut form = FormSnapshot::default();
        form.phases.set(phase(1), true);
        form.sequence_text = "   \n".to_string();
        form.accession_id = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingInput));
    }

    #[test]
    fn rejects_form_without_phases() {
        let form = snapshot_with_text(">seq\nMKV", &[]);
        assert_eq!(form.validate(), Err(ValidationError::NoPhaseSelected));
    }

    #[test]
    fn missing_input_is_reported_before_missing_phase() {
        assert_eq!(
            FormSnapshot::default().validate(),
            Err(ValidationError::MissingInput)
        );
    }

    #[test]
    fn file_wins_over_text_and_accession() {
        let mut form = snapshot_with_text(">seq\nMKV", &[4]);
        form.file_name = Some("input.fasta".to_string());
        form.accession_id = "P0DTC2".to_string();
        let request = form.validate().unwrap();
        assert_eq!(
            request.input,
            PrimaryInput::File {
                name: "input.fasta".to_string()
            }
        );
        let fields = request.fields();
        assert_eq!(fields.last(), Some(&FormField::File { name: "file" }));
        assert!(fields.iter().all(|field| field.name() != "sequence_text"));
        assert!(fields.iter().all(|field| field.name() != "accession_id"));
    }

    #[test]
    fn text_wins_over_accession() {
        let mut form = snapshot_with_text(">seq\nMKV", &[4]);
        form.accession_id = "P0DTC2".to_string();
        let request = form.validate().unwrap();
        assert_eq!(request.input, PrimaryInput::Text(">seq\nMKV".to_string()));
    }

    #[test]
    fn accession_is_trimmed_and_carries_database() {
        let mut form = FormSnapshot::default();
        form.phases.set(phase(5), true);
        form.accession_id = "  P0DTC2 ".to_string();
        form.database = Database::Uniprot;
        let fields = text_fields(&form.validate().unwrap().fields());
        assert!(fields.contains(&("accession_id".to_string(), "P0DTC2".to_string())));
        assert!(fields.contains(&("database".to_string(), "uniprot".to_string())));
    }

    #[test]
    fn thresholds_only_for_binary_phases() {
        let mut form = snapshot_with_text(">seq\nMKV", &[1, 3, 4, 5]);
        form.thresholds
            .insert(phase(1), ThresholdPair::new("60", "70"));
        form.thresholds
            .insert(phase(3), ThresholdPair::new("45", "55"));
        let fields = text_fields(&form.validate().unwrap().fields());

        assert!(fields.contains(&("phase1_thresholds".to_string(), "60,70".to_string())));
        assert!(fields.contains(&("phase3_thresholds".to_string(), "45,55".to_string())));
        assert!(!fields.iter().any(|(name, _)| name == "phase2_thresholds"));
        assert!(!fields.iter().any(|(name, _)| name == "phase4_thresholds"));
        assert!(!fields.iter().any(|(name, _)| name == "phase5_thresholds"));
    }

    #[test]
    fn fields_follow_submission_order() {
        let mut form = snapshot_with_text(">seq\nMKV", &[2, 5]);
        form.email = " someone@example.org ".to_string();
        form.sequence_type = SequenceType::Nucleotide;
        let fields = text_fields(&form.validate().unwrap().fields());
        let expected = vec![
            ("sequence_type", "nucleotide"),
            ("phases[]", "2"),
            ("phases[]", "5"),
            ("phase2_thresholds", "50,50"),
            ("model_type", "optimized"),
            ("verbose", "false"),
            ("email", "someone@example.org"),
            ("sequence_text", ">seq\nMKV"),
        ];
        let expected: Vec<(String, String)> = expected
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn blank_email_is_omitted() {
        let mut form = snapshot_with_text(">seq\nMKV", &[4]);
        form.email = "   ".to_string();
        let request = form.validate().unwrap();
        assert_eq!(request.email, None);
        assert!(request.fields().iter().all(|field| field.name() != "email"));
    }

    #[test]
    fn select_all_toggles_both_ways() {
        let mut selection = PhaseSelection::default();
        selection.set(phase(2), true);

        assert_eq!(selection.toggle_all(), DESELECT_ALL_LABEL);
        assert!(selection.all_checked());

        assert_eq!(selection.toggle_all(), SELECT_ALL_LABEL);
        assert!(selection.checked().is_empty());
    }

    #[test]
    fn threshold_panel_follows_binary_phases() {
        let mut selection = PhaseSelection::default();
        assert!(!selection.thresholds_visible());
        selection.set(phase(4), true);
        assert!(!selection.thresholds_visible());
        selection.set(phase(2), true);
        assert!(selection.thresholds_visible());
        selection.set(phase(2), false);
        assert!(!selection.thresholds_visible());
    }

    #[test]
    fn reset_restores_defaults() {
        let reset = FormSnapshot::default();
        assert_eq!(reset.file_name, None);
        assert_eq!(reset.file_label(), NO_FILE_LABEL);
        assert!(reset.sequence_text.is_empty());
        assert!(reset.accession_id.is_empty());
        assert!(reset.email.is_empty());
        assert_eq!(reset.sequence_type, SequenceType::Protein);
        assert_eq!(reset.database, Database::Ncbi);
        assert!(reset.phases.checked().is_empty());
        assert!(!reset.phases.thresholds_visible());
        assert_eq!(reset.phases.toggle_label(), SELECT_ALL_LABEL);
        assert_eq!(reset.thresholds.len(), 3);
        assert!(
            reset
                .thresholds
                .values()
                .all(|pair| pair.first == "50" && pair.second == "50")
        );
    }

    #[test]
    fn submit_outcome_uses_server_error_or_fallback() {
        let accepted = SubmitOutcome::from_response(
            true,
            SubmitResponse {
                job_id: Some("abc-123".to_string()),
                error: None,
            },
        );
        assert_eq!(
            accepted.banner_text(),
            "Job submitted successfully! Job ID: abc-123"
        );

        let rejected = SubmitOutcome::from_response(
            false,
            SubmitResponse {
                job_id: None,
                error: Some("Too many sequences. Maximum is 1000".to_string()),
            },
        );
        assert_eq!(
            rejected.banner_text(),
            "Error: Too many sequences. Maximum is 1000"
        );

        let bare = SubmitOutcome::from_response(false, SubmitResponse::default());
        assert_eq!(bare.banner_text(), "Error: Unknown error occurred");
    }

    #[test]
    fn transport_failure_is_rejected_with_error_text() {
        let outcome =
            SubmitOutcome::from_failure(&FetchFailure::Transport("Failed to fetch".to_string()));
        assert_eq!(outcome.banner_text(), "Error: Failed to fetch");
    }

    #[test]
    fn results_url_carries_job_id() {
        assert_eq!(results_page_url("abc"), "results.html?job_id=abc");
        assert_eq!(banner_class(BannerKind::Error), "status-message error");
    }
}
