use covvar_common::error::{ErrorBody, FetchFailure};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlInputElement};

pub fn web_document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

pub fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
    web_document()?
        .get_element_by_id(id)?
        .dyn_into::<T>()
        .ok()
}

pub fn set_text(id: &str, value: impl AsRef<str>) {
    let Some(node) = element_by_id::<Element>(id) else {
        return;
    };
    let next = value.as_ref();
    if node.text_content().as_deref() == Some(next) {
        return;
    }
    node.set_text_content(Some(next));
}

pub fn set_class(id: &str, class_name: &str) {
    let Some(node) = element_by_id::<Element>(id) else {
        return;
    };
    node.set_class_name(class_name);
}

pub fn set_display(id: &str, visible: bool) {
    let Some(node) = element_by_id::<HtmlElement>(id) else {
        return;
    };
    let _ = node
        .style()
        .set_property("display", if visible { "block" } else { "none" });
}

pub fn set_width(id: &str, width: &str) {
    let Some(node) = element_by_id::<HtmlElement>(id) else {
        return;
    };
    let _ = node.style().set_property("width", width);
}

/// Every `<input>` matching `selector`, in document order.
pub fn inputs_matching(selector: &str) -> Vec<HtmlInputElement> {
    let Some(doc) = web_document() else {
        return Vec::new();
    };
    let Ok(nodes) = doc.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

/// Value of the checked radio in group `name`.
pub fn checked_radio_value(name: &str) -> Option<String> {
    inputs_matching(&format!("input[name=\"{name}\"]:checked"))
        .first()
        .map(|input| input.value())
}

pub fn check_radio(name: &str, value: &str) {
    for input in inputs_matching(&format!("input[name=\"{name}\"]")) {
        input.set_checked(input.value() == value);
    }
}

pub fn input_value(id: &str) -> String {
    element_by_id::<HtmlInputElement>(id)
        .map(|input| input.value())
        .unwrap_or_default()
}

pub fn set_input_value(id: &str, value: &str) {
    if let Some(input) = element_by_id::<HtmlInputElement>(id) {
        input.set_value(value);
    }
}

/// Attaches `handler` for the lifetime of the page.
pub fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    let _ = target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
    callback.forget();
}

pub fn listen_by_id(id: &str, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    if let Some(node) = element_by_id::<Element>(id) {
        listen(&node, event, handler);
    }
}

pub fn transport_failure(err: gloo_net::Error) -> FetchFailure {
    match err {
        gloo_net::Error::JsError(js) => FetchFailure::Transport(js.message),
        other => FetchFailure::Transport(other.to_string()),
    }
}

/// Decodes a job API body: `T` on 2xx, otherwise the server's `error`.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchFailure> {
    if !response.ok() {
        let status = response.status();
        let error = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        return Err(FetchFailure::Http { status, error });
    }
    response.json::<T>().await.map_err(transport_failure)
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchFailure> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(transport_failure)?;
    read_json(response).await
}

pub async fn fetch_text(url: &str) -> Result<String, FetchFailure> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(transport_failure)?;
    if !response.ok() {
        return Err(FetchFailure::Http {
            status: response.status(),
            error: None,
        });
    }
    response.text().await.map_err(transport_failure)
}
