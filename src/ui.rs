use covvar_common::phase::{DEFAULT_THRESHOLD, Database, Phase, SequenceType};
use covvar_common::request::{NO_FILE_LABEL, SELECT_ALL_LABEL, SUBMIT_LABEL};
use covvar_common::results::DownloadFormat;
use html_compile::compile::build_component;
use html_compile::types::{Attribute, Child, Component};

use crate::state::BuildStamp;

const BASE_CSS: &str = include_str!("ui_assets/base.css");
const APP_NAME: &str = "CovVar Predict";
const ACCEPTED_EXTENSIONS: &str = ".fasta,.fa,.faa,.fna,.txt";

/// Loads the wasm bundle trunk writes into `frontend/dist`.
const FRONTEND_LOADER: &str = "import init from '/assets/covvar-frontend.js';\ninit('/assets/covvar-frontend_bg.wasm');";

#[derive(Debug, Clone)]
struct UiElement {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    content: UiContent,
}

#[derive(Debug, Clone)]
enum UiContent {
    Empty,
    Text(String),
    Children(Vec<UiElement>),
}

impl UiElement {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            content: UiContent::Empty,
        }
    }

    fn with_attr(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((label, value.into()));
        self
    }

    fn maybe_attr(
        mut self,
        condition: bool,
        label: &'static str,
        value: impl Into<String>,
    ) -> Self {
        if condition {
            self.attrs.push((label, value.into()));
        }
        self
    }

    fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = UiContent::Text(text.into());
        self
    }

    fn with_children(mut self, children: Vec<UiElement>) -> Self {
        self.content = UiContent::Children(children);
        self
    }

    fn hidden(self) -> Self {
        self.with_attr("style", "display: none;")
    }

    fn render(&self) -> String {
        let component = self.to_component();
        build_component(&component)
    }

    fn to_component<'a>(&'a self) -> Component<'a> {
        let meta = if self.attrs.is_empty() {
            None
        } else {
            Some(
                self.attrs
                    .iter()
                    .map(|(label, value)| Attribute {
                        label,
                        value: value.as_str(),
                    })
                    .collect(),
            )
        };

        let child = match &self.content {
            UiContent::Empty => Child::NoChild,
            UiContent::Text(value) => Child::Text(value.as_str()),
            UiContent::Children(nodes) => Child::ComponentVec(
                nodes
                    .iter()
                    .map(|node| Box::new(node.to_component()))
                    .collect(),
            ),
        };

        Component {
            tag: self.tag,
            meta,
            child,
        }
    }
}

fn el(tag: &'static str) -> UiElement {
    UiElement::new(tag)
}

fn text_el(tag: &'static str, text: impl Into<String>) -> UiElement {
    UiElement::new(tag).with_text(text)
}

fn card(title: &str, children: Vec<UiElement>) -> UiElement {
    let mut nodes = vec![text_el("h2", escape_html(title))];
    nodes.extend(children);
    el("section").with_attr("class", "card").with_children(nodes)
}

fn button(id: &str, label: &str, class_name: &str) -> UiElement {
    text_el("button", escape_html(label))
        .with_attr("type", "button")
        .with_attr("id", escape_html_attr(id))
        .with_attr("class", class_name)
}

fn radio(name: &str, value: &str, label: &str, checked: bool) -> UiElement {
    let id = format!("{name}_{value}");
    el("label")
        .with_attr("class", "choice")
        .with_attr("for", id.clone())
        .with_children(vec![
            el("input")
                .with_attr("type", "radio")
                .with_attr("name", escape_html_attr(name))
                .with_attr("id", id)
                .with_attr("value", escape_html_attr(value))
                .maybe_attr(checked, "checked", "checked"),
            text_el("span", escape_html(label)),
        ])
}

fn render_input_card() -> UiElement {
    let file_picker = el("div").with_attr("class", "form-group").with_children(vec![
        text_el("label", "Upload FASTA file").with_attr("for", "file_upload"),
        el("div").with_attr("class", "file-picker").with_children(vec![
            el("input")
                .with_attr("type", "file")
                .with_attr("id", "file_upload")
                .with_attr("name", "file")
                .with_attr("accept", ACCEPTED_EXTENSIONS),
            text_el("span", NO_FILE_LABEL).with_attr("id", "file_name"),
        ]),
    ]);

    let paste = el("div").with_attr("class", "form-group").with_children(vec![
        el("div").with_attr("class", "row-between").with_children(vec![
            text_el("label", "Or paste sequences (FASTA)").with_attr("for", "sequence_text"),
            button("load_demo", "Load Demo", "btn secondary small"),
        ]),
        el("textarea")
            .with_attr("id", "sequence_text")
            .with_attr("name", "sequence_text")
            .with_attr("rows", "8")
            .with_attr("spellcheck", "false")
            .with_attr("placeholder", "&gt;sequence_1\nMFVFLVLLPLVSSQCVNLT..."),
    ]);

    let mut database_choices = vec![text_el("span", "Database").with_attr("class", "inline-label")];
    database_choices.extend(Database::ALL.into_iter().map(|database| {
        radio(
            "database",
            database.as_str(),
            database.label(),
            database == Database::default(),
        )
    }));

    let accession = el("div").with_attr("class", "form-group").with_children(vec![
        text_el("label", "Or fetch by accession ID").with_attr("for", "accession_id"),
        el("input")
            .with_attr("type", "text")
            .with_attr("id", "accession_id")
            .with_attr("name", "accession_id")
            .with_attr("placeholder", "e.g. P0DTC2"),
        el("div")
            .with_attr("class", "choices")
            .with_children(database_choices),
    ]);

    let mut sequence_types =
        vec![text_el("span", "Sequence type").with_attr("class", "inline-label")];
    sequence_types.extend(SequenceType::ALL.into_iter().map(|kind| {
        radio(
            "sequence_type",
            kind.as_str(),
            kind.label(),
            kind == SequenceType::default(),
        )
    }));

    card(
        "Input Sequences",
        vec![
            file_picker,
            paste,
            accession,
            el("div")
                .with_attr("class", "choices")
                .with_children(sequence_types),
        ],
    )
}

fn render_phase_card() -> UiElement {
    let phases = Phase::ALL
        .into_iter()
        .map(|phase| {
            let id = format!("phase_{}", phase.number());
            el("label")
                .with_attr("class", "phase-option")
                .with_attr("for", id.clone())
                .with_children(vec![
                    el("input")
                        .with_attr("type", "checkbox")
                        .with_attr("name", "phases")
                        .with_attr("id", id)
                        .with_attr("value", phase.to_string()),
                    text_el("strong", format!("Phase {}", phase.number())),
                    text_el("span", escape_html(phase.label())),
                ])
        })
        .collect::<Vec<_>>();

    card(
        "Prediction Phases",
        vec![
            el("div").with_attr("class", "phase-list").with_children(phases),
            button("select_all_phases", SELECT_ALL_LABEL, "btn secondary small"),
            render_threshold_controls(),
        ],
    )
}

fn render_threshold_controls() -> UiElement {
    let rows = Phase::ALL
        .into_iter()
        .filter(|phase| phase.requires_thresholds())
        .map(|phase| {
            let inputs = (1..=2u8)
                .map(|slot| {
                    let id = phase.threshold_input_id(slot);
                    el("label")
                        .with_attr("for", id.clone())
                        .with_attr("class", "threshold-input")
                        .with_children(vec![
                            text_el("span", format!("Class {slot} (%)")),
                            el("input")
                                .with_attr("type", "number")
                                .with_attr("id", id)
                                .with_attr("class", "threshold-input-field")
                                .with_attr("min", "0")
                                .with_attr("max", "100")
                                .with_attr("step", "1")
                                .with_attr("value", DEFAULT_THRESHOLD),
                        ])
                })
                .collect::<Vec<_>>();

            let mut children = vec![text_el("span", format!("Phase {}", phase.number()))
                .with_attr("class", "threshold-phase")];
            children.extend(inputs);
            el("div")
                .with_attr("class", "threshold-row")
                .with_children(children)
        })
        .collect::<Vec<_>>();

    let mut children = vec![text_el("h3", "Classification thresholds")];
    children.extend(rows);
    children.push(button(
        "reset_thresholds",
        "Reset Thresholds",
        "btn secondary small",
    ));

    el("div")
        .with_attr("id", "threshold_controls")
        .with_attr("class", "threshold-controls")
        .with_children(children)
        .hidden()
}

fn render_submit_content() -> Vec<UiElement> {
    vec![
        el("div")
            .with_attr("id", "submission-root")
            .with_children(vec![
                render_input_card(),
                render_phase_card(),
                card(
                    "Notification",
                    vec![
                        text_el("label", "Email (optional)").with_attr("for", "email"),
                        el("input")
                            .with_attr("type", "email")
                            .with_attr("id", "email")
                            .with_attr("name", "email")
                            .with_attr("placeholder", "you@example.org"),
                    ],
                ),
                el("div").with_attr("class", "actions").with_children(vec![
                    button("run_prediction", SUBMIT_LABEL, "btn"),
                    button("reset_button", "Reset", "btn secondary"),
                ]),
                el("div")
                    .with_attr("id", "status_message")
                    .with_attr("class", "status-message")
                    .hidden(),
            ]),
    ]
}

pub fn render_submit_page(build: &BuildStamp) -> String {
    render_app_page(
        &format!("New Prediction - {APP_NAME}"),
        build,
        render_submit_content(),
    )
}

fn render_results_content() -> Vec<UiElement> {
    let downloads = DownloadFormat::ALL
        .into_iter()
        .map(|format| {
            text_el("a", format!("Download {}", format.label()))
                .with_attr("id", format.link_id())
                .with_attr("class", "btn secondary")
                .with_attr("href", "#")
        })
        .collect::<Vec<_>>();

    vec![
        el("div")
            .with_attr("id", "results-root")
            .with_children(vec![
                el("section")
                    .with_attr("class", "card status-card")
                    .with_children(vec![
                        el("div").with_attr("class", "row-between").with_children(vec![
                            el("h2").with_children(vec![
                                text_el("span", "Job "),
                                text_el("code", "-").with_attr("id", "job_id"),
                            ]),
                            text_el("span", "Pending")
                                .with_attr("id", "status_badge")
                                .with_attr("class", "status-badge status-pending"),
                        ]),
                        text_el("p", "")
                            .with_attr("id", "timestamp")
                            .with_attr("class", "dim"),
                    ]),
                el("section")
                    .with_attr("id", "loading_section")
                    .with_attr("class", "card")
                    .with_children(vec![
                        el("div")
                            .with_attr("id", "progress_container")
                            .with_children(vec![
                                el("div").with_attr("class", "progress-bar").with_children(vec![
                                    text_el("div", "0%")
                                        .with_attr("id", "progress_fill")
                                        .with_attr("class", "progress-fill")
                                        .with_attr("style", "width: 0%;"),
                                ]),
                                text_el("p", "Processing...").with_attr("id", "progress_message"),
                            ])
                            .hidden(),
                        text_el("p", "Waiting for the job to finish...").with_attr("class", "dim"),
                    ]),
                el("section")
                    .with_attr("id", "error_panel")
                    .with_attr("class", "card error-panel")
                    .with_children(vec![
                        text_el("p", "Error").with_attr("class", "error-title"),
                        text_el("p", "").with_attr("id", "error_message"),
                        text_el("a", "Return to Home")
                            .with_attr("href", "index.html")
                            .with_attr("id", "error_home_link")
                            .with_attr("class", "btn"),
                    ])
                    .hidden(),
                el("section")
                    .with_attr("id", "results_section")
                    .with_children(vec![
                        card(
                            "Summary",
                            vec![
                                el("p").with_children(vec![
                                    text_el("span", "Total sequences: "),
                                    text_el("strong", "-").with_attr("id", "total_sequences"),
                                ]),
                                el("div").with_attr("class", "actions").with_children(downloads),
                            ],
                        ),
                        card(
                            "Prediction Overview",
                            vec![
                                el("div")
                                    .with_attr("id", "charts_container")
                                    .with_attr("class", "charts"),
                            ],
                        ),
                        card(
                            "Detailed Results",
                            vec![el("div").with_attr("id", "results_tables")],
                        ),
                    ])
                    .hidden(),
            ]),
    ]
}

pub fn render_results_page(build: &BuildStamp) -> String {
    render_app_page(
        &format!("Results - {APP_NAME}"),
        build,
        render_results_content(),
    )
}

fn render_app_page(title: &str, build: &BuildStamp, content: Vec<UiElement>) -> String {
    let body_nodes = vec![
        render_nav(),
        el("main").with_children(content),
        render_footer(build),
        el("script")
            .with_attr("type", "module")
            .with_text(FRONTEND_LOADER),
    ];

    render_document(title, BASE_CSS, body_nodes)
}

fn render_document(title: &str, css: &str, body_nodes: Vec<UiElement>) -> String {
    let head_children = vec![
        el("meta").with_attr("charset", "UTF-8"),
        el("meta")
            .with_attr("name", "viewport")
            .with_attr("content", "width=device-width, initial-scale=1.0"),
        text_el("title", escape_html(title)),
        el("style").with_text(css.to_string()),
    ];

    let html = el("html").with_attr("lang", "en").with_children(vec![
        el("head").with_children(head_children),
        el("body").with_children(body_nodes),
    ]);

    format!("<!DOCTYPE html>\n{}", html.render())
}

fn render_nav() -> UiElement {
    el("nav").with_children(vec![
        text_el("span", APP_NAME).with_attr("class", "logo"),
        text_el("a", "New Prediction").with_attr("href", "index.html"),
    ])
}

fn render_footer(build: &BuildStamp) -> UiElement {
    text_el(
        "footer",
        format!(
            "build {} ({})",
            escape_html(&build.hash),
            escape_html(&build.timestamp)
        ),
    )
    .with_attr("title", escape_html_attr(&build.epoch.to_string()))
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_html_attr(input: &str) -> String {
    escape_html(input)
}
