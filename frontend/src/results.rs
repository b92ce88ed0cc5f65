//! Results page: polls job status, then renders charts and tables once the
//! job completes.

use std::cell::RefCell;
use std::rc::Rc;

use covvar_common::poller::{NO_JOB_ID_MESSAGE, POLL_INTERVAL_MS, results_failure_message};
use covvar_common::results::{DownloadFormat, PieChart, ResultTable};
use covvar_common::{JobPoller, JobResults, PollEvent, StatusResponse, StatusView};
use gloo_timers::callback::Interval;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlAnchorElement, UrlSearchParams};

use crate::dom::{
    element_by_id, fetch_json, set_class, set_display, set_text, set_width, web_document,
};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const CHART_SIZE: f64 = 220.0;
const CHART_MARGIN: f64 = 4.0;

type SharedInterval = Rc<RefCell<Option<Interval>>>;

pub fn init() {
    if element_by_id::<Element>("results-root").is_none() {
        return;
    }

    let poller = JobPoller::new(query_job_id());
    let Some(job_id) = poller.job_id().map(str::to_string) else {
        show_terminal_error(NO_JOB_ID_MESSAGE);
        return;
    };

    set_text("job_id", &job_id);
    for format in DownloadFormat::ALL {
        if let Some(link) = element_by_id::<HtmlAnchorElement>(&format.link_id()) {
            link.set_href(&format.url(&job_id));
        }
    }

    let poller = Rc::new(RefCell::new(poller));
    let interval: SharedInterval = Rc::new(RefCell::new(None));

    check_status(poller.clone(), interval.clone());
    let tick = {
        let poller = poller.clone();
        let interval = interval.clone();
        Interval::new(POLL_INTERVAL_MS, move || {
            check_status(poller.clone(), interval.clone());
        })
    };
    *interval.borrow_mut() = Some(tick);
}

fn query_job_id() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    UrlSearchParams::new_with_str(&search).ok()?.get("job_id")
}

fn check_status(poller: Rc<RefCell<JobPoller>>, interval: SharedInterval) {
    let url = {
        let poller = poller.borrow();
        if !poller.should_poll() {
            return;
        }
        poller.status_url()
    };
    let Some(url) = url else {
        return;
    };

    spawn_local(async move {
        let event = match fetch_json::<StatusResponse>(&url).await {
            Ok(status) => poller.borrow_mut().on_status(&status),
            Err(failure) => poller.borrow().on_status_failure(&failure),
        };

        match event {
            PollEvent::Render(view) => {
                render_status(&view);
                hide_error();
            }
            PollEvent::Complete(view) => {
                stop_polling(&interval);
                render_status(&view);
                hide_error();
                let results_url = poller.borrow().results_url();
                if let Some(results_url) = results_url {
                    load_results(&results_url).await;
                }
            }
            PollEvent::Fail { view, reason } => {
                stop_polling(&interval);
                render_status(&view);
                show_terminal_error(&reason);
            }
            PollEvent::Error(message) => show_error(&message),
            PollEvent::Ignored => {}
        }
    });
}

fn stop_polling(interval: &SharedInterval) {
    if let Some(tick) = interval.borrow_mut().take() {
        let _ = tick.cancel();
    }
}

fn render_status(view: &StatusView) {
    set_text("status_badge", &view.badge_text);
    set_class("status_badge", &view.badge_class);
    if let Some(timestamp) = view.timestamp.as_deref() {
        set_text("timestamp", locale_timestamp(timestamp));
    }

    match &view.progress {
        Some(progress) => {
            set_display("progress_container", true);
            set_width("progress_fill", &progress.width);
            set_text("progress_fill", &progress.label);
            set_text("progress_message", &progress.message);
        }
        None => set_display("progress_container", false),
    }
}

fn locale_timestamp(raw: &str) -> String {
    let date = js_sys::Date::new(&JsValue::from_str(raw));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

fn show_error(message: &str) {
    set_text("error_message", message);
    set_display("error_panel", true);
}

fn show_terminal_error(message: &str) {
    set_display("loading_section", false);
    show_error(message);
}

fn hide_error() {
    set_display("error_panel", false);
}

async fn load_results(url: &str) {
    match fetch_json::<JobResults>(url).await {
        Ok(results) => display_results(&results),
        Err(failure) => show_terminal_error(&results_failure_message(&failure)),
    }
}

fn display_results(results: &JobResults) {
    set_display("loading_section", false);
    hide_error();
    set_display("results_section", true);

    if let Some(total) = results.total_sequences() {
        set_text("total_sequences", total);
    }

    let Some(doc) = web_document() else {
        return;
    };

    if let Some(container) = element_by_id::<Element>("charts_container") {
        container.set_inner_html("");
        for chart in results.charts() {
            if let Some(node) = chart_box(&doc, &chart) {
                let _ = container.append_child(&node);
            }
        }
    }

    if let Some(container) = element_by_id::<Element>("results_tables") {
        container.set_inner_html("");
        for table in results.tables() {
            if let Some(node) = table_section(&doc, &table) {
                let _ = container.append_child(&node);
            }
        }
    }
}

fn create(doc: &Document, tag: &str, class_name: &str, text: Option<&str>) -> Option<Element> {
    let node = doc.create_element(tag).ok()?;
    if !class_name.is_empty() {
        node.set_class_name(class_name);
    }
    if let Some(text) = text {
        node.set_text_content(Some(text));
    }
    Some(node)
}

fn create_svg(doc: &Document, tag: &str) -> Option<Element> {
    doc.create_element_ns(Some(SVG_NS), tag).ok()
}

fn chart_box(doc: &Document, chart: &PieChart) -> Option<Element> {
    let container = create(doc, "div", "chart-box", None)?;
    let title = create(doc, "h3", "chart-title", Some(&chart.title))?;
    container.append_child(&title).ok()?;

    let svg = create_svg(doc, "svg")?;
    svg.set_attribute("viewBox", &format!("0 0 {CHART_SIZE} {CHART_SIZE}"))
        .ok()?;
    svg.set_attribute("role", "img").ok()?;
    svg.set_attribute("aria-label", &chart.title).ok()?;

    let center = CHART_SIZE / 2.0;
    let radius = center - CHART_MARGIN;
    for slice in &chart.slices {
        let d = slice.svg_path(center, center, radius);
        if d.is_empty() {
            continue;
        }
        let path = create_svg(doc, "path")?;
        path.set_attribute("d", &d).ok()?;
        path.set_attribute("fill", slice.color).ok()?;
        path.set_attribute("stroke", "#fff").ok()?;
        path.set_attribute("stroke-width", "2").ok()?;

        let tooltip = create_svg(doc, "title")?;
        tooltip.set_text_content(Some(&slice.tooltip()));
        path.append_child(&tooltip).ok()?;
        svg.append_child(&path).ok()?;
    }
    container.append_child(&svg).ok()?;

    let legend = create(doc, "ul", "chart-legend", None)?;
    for slice in &chart.slices {
        let item = create(doc, "li", "", None)?;
        let swatch = create(doc, "span", "legend-swatch", None)?;
        swatch
            .set_attribute("style", &format!("background-color: {}", slice.color))
            .ok()?;
        item.append_child(&swatch).ok()?;
        let label = create(doc, "span", "", Some(&slice.tooltip()))?;
        item.append_child(&label).ok()?;
        legend.append_child(&item).ok()?;
    }
    container.append_child(&legend).ok()?;

    Some(container)
}

fn table_section(doc: &Document, table: &ResultTable) -> Option<Element> {
    let section = create(doc, "div", "phase-table", None)?;
    let title = create(doc, "h3", "", Some(&table.title))?;
    section.append_child(&title).ok()?;

    let element = create(doc, "table", "results-table", None)?;

    let head = create(doc, "thead", "", None)?;
    let header_row = create(doc, "tr", "", None)?;
    for header in &table.headers {
        let cell = create(doc, "th", "", Some(header))?;
        header_row.append_child(&cell).ok()?;
    }
    head.append_child(&header_row).ok()?;
    element.append_child(&head).ok()?;

    let body = create(doc, "tbody", "", None)?;
    for row in &table.rows {
        let tr = create(doc, "tr", "", None)?;
        for value in row {
            let cell = create(doc, "td", "", Some(value))?;
            tr.append_child(&cell).ok()?;
        }
        body.append_child(&tr).ok()?;
    }
    element.append_child(&body).ok()?;
    section.append_child(&element).ok()?;

    if let Some(note) = table.truncation_note() {
        let note = create(doc, "p", "table-note", Some(&note))?;
        section.append_child(&note).ok()?;
    }

    Some(section)
}
