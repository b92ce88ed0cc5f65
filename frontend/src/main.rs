mod dom;
mod results;
mod submit;

use leptos::*;

#[component]
fn App() -> impl IntoView {
    view! {
        <div
            id="leptos-runtime-marker"
            data-runtime="covvar-frontend"
            style="display:none;"
        ></div>
    }
}

fn main() {
    console_error_panic_hook::set_once();

    mount_to_body(|| view! { <App /> });

    // Each page wires itself up only when its root element is present.
    submit::init();
    results::init();
}
