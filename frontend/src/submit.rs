//! Submission page: reads the form, validates it, posts the job and hands
//! off to the results page.

use std::collections::BTreeMap;

use covvar_common::phase::{DEFAULT_THRESHOLD, Phase};
use covvar_common::request::{
    BannerKind, DEMO_FAILED_BANNER, DEMO_FASTA_PATH, DEMO_LOADED_BANNER, NO_FILE_LABEL,
    PREDICT_ENDPOINT, REDIRECT_DELAY_MS, SUBMIT_LABEL, SUBMITTING_BANNER, SUBMITTING_LABEL,
    SubmitOutcome, SubmitResponse, THRESHOLDS_RESET_BANNER, ThresholdPair, banner_class,
    results_page_url,
};
use covvar_common::{FetchFailure, FormField, FormSnapshot, JobRequest, PhaseSelection};
use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, File, FormData, HtmlButtonElement, HtmlInputElement, HtmlTextAreaElement};

use crate::dom::{
    check_radio, checked_radio_value, element_by_id, fetch_text, input_value, inputs_matching,
    listen, listen_by_id, set_class, set_display, set_input_value, set_text, transport_failure,
};

const PHASE_SELECTOR: &str = "input[name=\"phases\"]";
const THRESHOLD_SELECTOR: &str = ".threshold-input-field";

pub fn init() {
    if element_by_id::<Element>("submission-root").is_none() {
        return;
    }

    listen_by_id("file_upload", "change", |_| {
        let label = selected_file()
            .map(|file| file.name())
            .unwrap_or_else(|| NO_FILE_LABEL.to_string());
        set_text("file_name", label);
    });
    listen_by_id("load_demo", "click", |_| load_demo());
    listen_by_id("select_all_phases", "click", |_| toggle_all_phases());
    listen_by_id("reset_thresholds", "click", |_| reset_thresholds());
    listen_by_id("reset_button", "click", |_| reset_form());
    listen_by_id("run_prediction", "click", |_| submit());

    for checkbox in inputs_matching(PHASE_SELECTOR) {
        listen(&checkbox, "change", |_| sync_phase_controls(&read_phases()));
    }

    // Browsers may restore checkbox state on reload.
    sync_phase_controls(&read_phases());
}

fn selected_file() -> Option<File> {
    element_by_id::<HtmlInputElement>("file_upload")?
        .files()?
        .get(0)
}

fn read_phases() -> PhaseSelection {
    PhaseSelection::from_entries(inputs_matching(PHASE_SELECTOR).into_iter().filter_map(
        |input| {
            let phase = input.value().parse::<Phase>().ok()?;
            Some((phase, input.checked()))
        },
    ))
}

fn write_phases(selection: &PhaseSelection) {
    for input in inputs_matching(PHASE_SELECTOR) {
        if let Ok(phase) = input.value().parse::<Phase>() {
            input.set_checked(selection.is_checked(phase));
        }
    }
}

fn read_thresholds() -> BTreeMap<Phase, ThresholdPair> {
    Phase::ALL
        .into_iter()
        .filter(|phase| phase.requires_thresholds())
        .map(|phase| {
            let pair = ThresholdPair::new(
                input_value(&phase.threshold_input_id(1)),
                input_value(&phase.threshold_input_id(2)),
            );
            (phase, pair)
        })
        .collect()
}

fn write_thresholds(thresholds: &BTreeMap<Phase, ThresholdPair>) {
    for (phase, pair) in thresholds {
        set_input_value(&phase.threshold_input_id(1), &pair.first);
        set_input_value(&phase.threshold_input_id(2), &pair.second);
    }
}

fn sequence_text_area() -> Option<HtmlTextAreaElement> {
    element_by_id::<HtmlTextAreaElement>("sequence_text")
}

fn read_snapshot() -> FormSnapshot {
    FormSnapshot {
        file_name: selected_file().map(|file| file.name()),
        sequence_text: sequence_text_area()
            .map(|area| area.value())
            .unwrap_or_default(),
        accession_id: input_value("accession_id"),
        database: checked_radio_value("database")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
        sequence_type: checked_radio_value("sequence_type")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default(),
        phases: read_phases(),
        thresholds: read_thresholds(),
        email: input_value("email"),
    }
}

fn sync_phase_controls(selection: &PhaseSelection) {
    set_text("select_all_phases", selection.toggle_label());
    set_display("threshold_controls", selection.thresholds_visible());
}

fn toggle_all_phases() {
    let mut selection = read_phases();
    selection.toggle_all();
    write_phases(&selection);
    sync_phase_controls(&selection);
}

fn reset_thresholds() {
    for input in inputs_matching(THRESHOLD_SELECTOR) {
        input.set_value(DEFAULT_THRESHOLD);
    }
    show_banner(THRESHOLDS_RESET_BANNER, BannerKind::Success);
}

fn reset_form() {
    let defaults = FormSnapshot::default();

    set_input_value("file_upload", "");
    set_text("file_name", defaults.file_label());
    if let Some(area) = sequence_text_area() {
        area.set_value(&defaults.sequence_text);
    }
    set_input_value("accession_id", &defaults.accession_id);
    set_input_value("email", &defaults.email);
    check_radio("sequence_type", defaults.sequence_type.as_str());
    check_radio("database", defaults.database.as_str());
    write_phases(&defaults.phases);
    write_thresholds(&defaults.thresholds);
    sync_phase_controls(&defaults.phases);
    hide_banner();
}

fn show_banner(message: &str, kind: BannerKind) {
    set_text("status_message", message);
    set_class("status_message", &banner_class(kind));
    set_display("status_message", true);
}

fn hide_banner() {
    set_display("status_message", false);
}

fn set_submitting(busy: bool) {
    let Some(button) = element_by_id::<HtmlButtonElement>("run_prediction") else {
        return;
    };
    button.set_disabled(busy);
    button.set_text_content(Some(if busy { SUBMITTING_LABEL } else { SUBMIT_LABEL }));
}

fn load_demo() {
    spawn_local(async {
        match fetch_text(DEMO_FASTA_PATH).await {
            Ok(text) => {
                if let Some(area) = sequence_text_area() {
                    area.set_value(&text);
                }
                show_banner(DEMO_LOADED_BANNER, BannerKind::Success);
            }
            Err(_) => show_banner(DEMO_FAILED_BANNER, BannerKind::Error),
        }
    });
}

fn submit() {
    let request = match read_snapshot().validate() {
        Ok(request) => request,
        Err(err) => {
            show_banner(&err.to_string(), BannerKind::Error);
            return;
        }
    };

    let form = match build_form_data(&request) {
        Ok(form) => form,
        Err(err) => {
            let failure = FetchFailure::Transport(js_error_text(&err));
            show_banner(
                &SubmitOutcome::from_failure(&failure).banner_text(),
                BannerKind::Error,
            );
            return;
        }
    };

    set_submitting(true);
    show_banner(SUBMITTING_BANNER, BannerKind::Info);

    spawn_local(async move {
        let outcome = match post_job(form).await {
            Ok(outcome) => outcome,
            Err(failure) => SubmitOutcome::from_failure(&failure),
        };

        match &outcome {
            SubmitOutcome::Accepted { job_id } => {
                show_banner(&outcome.banner_text(), BannerKind::Success);
                let target = results_page_url(job_id);
                Timeout::new(REDIRECT_DELAY_MS, move || navigate(&target)).forget();
            }
            SubmitOutcome::Rejected { .. } => {
                show_banner(&outcome.banner_text(), BannerKind::Error);
                set_submitting(false);
            }
        }
    });
}

fn build_form_data(request: &JobRequest) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    for field in request.fields() {
        match field {
            FormField::Text { name, value } => form.append_with_str(&name, &value)?,
            FormField::File { name } => {
                let file = selected_file()
                    .ok_or_else(|| JsValue::from_str("the selected file is no longer available"))?;
                form.append_with_blob_and_filename(name, &file, &file.name())?;
            }
        }
    }
    Ok(form)
}

async fn post_job(form: FormData) -> Result<SubmitOutcome, FetchFailure> {
    let response = Request::post(PREDICT_ENDPOINT)
        .body(form)
        .map_err(transport_failure)?
        .send()
        .await
        .map_err(transport_failure)?;
    let ok = response.ok();
    let body = response
        .json::<SubmitResponse>()
        .await
        .map_err(transport_failure)?;
    Ok(SubmitOutcome::from_response(ok, body))
}

fn navigate(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.location().set_href(url);
    }
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
