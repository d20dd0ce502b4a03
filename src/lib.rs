//! Client-side "add more" rows for server-rendered formsets.
//!
//! The page renders a container of rows, a hidden empty-row template whose
//! field names carry a placeholder token, and the formset's management form.
//! Clicking an "add more" control appends the template with the placeholder
//! replaced by the next row index and bumps the total-forms counter, so the
//! server sees every row on submit.

mod appender;
mod binding;
mod config;
mod dom;
mod error;
mod host;
mod template;

pub use appender::RowAppender;
pub use binding::{bind_all, bind_formset, bind_formset_with, bind_from_window, on_add_clicked, on_page_ready};
pub use config::FormsetConfig;
pub use dom::DomHost;
pub use error::{FormsetError, Result};
pub use host::FormsetHost;
pub use template::{count_occurrences, render_row};

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let document = leptos::prelude::document();
    let ready_document = document.clone();
    let registered = on_page_ready(&document, move || {
        if let Err(err) = bind_from_window(&ready_document) {
            leptos::logging::error!("formset: {err}");
        }
    });

    if let Err(err) = registered {
        leptos::logging::error!("formset: could not wait for page ready: {err}");
    }
}
