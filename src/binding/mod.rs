use crate::appender::RowAppender;
use crate::config::FormsetConfig;
use crate::dom::DomHost;
use crate::error::{FormsetError, Result};
use crate::host::FormsetHost;
use leptos::logging::{error, log, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

/// Set on every trigger that already carries an "add more" listener.
pub(crate) const BOUND_ATTR: &str = "data-formset-bound";

/// Run `f` once the document has been parsed: right away if that already
/// happened, otherwise on `DOMContentLoaded`.
pub fn on_page_ready(document: &Document, f: impl FnOnce() + 'static) -> Result<()> {
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }

    let cb = Closure::once_into_js(f);
    document.add_event_listener_with_callback("DOMContentLoaded", cb.unchecked_ref())?;
    Ok(())
}

/// Click handler body for an "add more" control.
///
/// Returns the appended row's index, or `None` when nothing was appended.
pub fn on_add_clicked<H: FormsetHost>(
    appender: &RowAppender<H>,
    ev: &web_sys::Event,
) -> Option<usize> {
    // The control is usually a link; never navigate.
    ev.prevent_default();

    match appender.append_row() {
        Ok(index) => Some(index),
        Err(err @ FormsetError::LimitReached { .. }) => {
            warn!("formset: {err}");
            None
        }
        Err(err) => {
            error!("formset: {err}");
            None
        }
    }
}

/// Resolve the formset's elements and attach the click handler to every
/// element matching `config.trigger`. Returns how many triggers were newly
/// bound.
///
/// Missing container/template/counter elements fail here, at page load,
/// rather than on the user's first click. Triggers marked with
/// `data-formset-bound` are skipped so a second bind never doubles a click.
pub fn bind_formset(document: &Document, config: &FormsetConfig) -> Result<usize> {
    config.validate()?;

    let host = DomHost::resolve(document, config)?;
    let appender = RowAppender::new(host, config.placeholder.clone());

    let triggers = document.query_selector_all(&config.trigger)?;
    if triggers.length() == 0 {
        warn!("formset: no element matches `{}`; nothing bound", config.trigger);
        return Ok(0);
    }

    let mut bound = 0;
    for i in 0..triggers.length() {
        let Some(trigger) = triggers.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if trigger.has_attribute(BOUND_ATTR) {
            continue;
        }

        let appender = appender.clone();
        let cb = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            on_add_clicked(&appender, &ev);
        }) as Box<dyn FnMut(web_sys::Event)>);

        trigger.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        trigger.set_attribute(BOUND_ATTR, &config.container_id)?;

        // Triggers live for the page's lifetime.
        cb.forget();
        bound += 1;
    }

    Ok(bound)
}

/// Bind each config on its own. A broken entry is logged and skipped; the
/// first error is returned only when every entry failed.
pub fn bind_all(document: &Document, configs: &[FormsetConfig]) -> Result<usize> {
    let mut total = 0;
    let mut first_err = None;
    let mut any_ok = false;

    for config in configs {
        match bind_formset(document, config) {
            Ok(bound) => {
                log!(
                    "formset: bound {bound} trigger(s) `{}` to #{}",
                    config.trigger,
                    config.container_id
                );
                any_ok = true;
                total += bound;
            }
            Err(err) => {
                error!("formset: `{}` not bound: {err}", config.trigger);
                first_err.get_or_insert(err);
            }
        }
    }

    match first_err {
        Some(err) if !any_ok => Err(err),
        _ => Ok(total),
    }
}

/// Bind every formset configured on `window.FORMSET` (or the defaults).
/// Returns the total number of triggers bound.
pub fn bind_from_window(document: &Document) -> Result<usize> {
    let configs = FormsetConfig::load_from_window()?;
    bind_all(document, &configs)
}

/// JS entry point for pages that bind a formset themselves, e.g. after
/// injecting its markup. `options` takes the same keys as `window.FORMSET`.
#[wasm_bindgen(js_name = bindFormset)]
pub fn bind_formset_with(options: JsValue) -> std::result::Result<u32, JsValue> {
    let configs = if options.is_undefined() || options.is_null() {
        vec![FormsetConfig::default()]
    } else {
        let json = js_sys::JSON::stringify(&options)?;
        FormsetConfig::from_settings_json(&String::from(json))?
    };

    let document = leptos::prelude::document();
    let total = bind_all(&document, &configs)?;
    Ok(total as u32)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::{Event, EventInit, HtmlInputElement};

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("document should exist")
    }

    /// Mount an isolated formset whose ids all carry `tag`.
    fn mount(tag: &str, existing_rows: usize) -> (FormsetConfig, Element) {
        let document = document();
        let rows: String = (0..existing_rows)
            .map(|i| format!(r#"<div><input name="{tag}-{i}-file"></div>"#))
            .collect();
        let root = document.create_element("div").expect("should create root");
        root.set_inner_html(&format!(
            r##"
            <input type="hidden" id="id_{tag}-TOTAL_FORMS" value="{existing_rows}">
            <div id="{tag}-rows">{rows}</div>
            <div id="{tag}-template" hidden><div><input name="{tag}-__prefix__-file"><input name="{tag}-__prefix__-id"></div></div>
            <a href="#navigated" class="add-{tag}"><span id="{tag}-label">Add more</span></a>
            "##
        ));
        document
            .body()
            .expect("body should exist")
            .append_child(&root)
            .expect("should mount");

        let config = FormsetConfig {
            trigger: format!(".add-{tag}"),
            container_id: format!("{tag}-rows"),
            template_id: format!("{tag}-template"),
            total_forms_id: format!("id_{tag}-TOTAL_FORMS"),
            max_forms_id: None,
            placeholder: "__prefix__".to_string(),
        };
        (config, root)
    }

    fn click(target: &web_sys::EventTarget) -> bool {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let ev = Event::new_with_event_init_dict("click", &init).expect("should build event");
        target.dispatch_event(&ev).expect("should dispatch")
    }

    fn by_id(id: &str) -> Element {
        document().get_element_by_id(id).expect("element should exist")
    }

    fn total(tag: &str) -> String {
        by_id(&format!("id_{tag}-TOTAL_FORMS"))
            .dyn_into::<HtmlInputElement>()
            .expect("should be input")
            .value()
    }

    #[wasm_bindgen_test]
    fn test_click_appends_row_and_prevents_navigation() {
        let (config, root) = mount("pa", 0);
        assert_eq!(bind_formset(&document(), &config), Ok(1));

        let trigger = document()
            .query_selector(".add-pa")
            .expect("valid selector")
            .expect("trigger exists");
        let not_cancelled = click(&trigger);

        assert!(!not_cancelled, "default action must be prevented");
        let container = by_id("pa-rows");
        assert_eq!(container.child_element_count(), 1);
        assert!(container.inner_html().contains(r#"name="pa-0-file""#));
        assert!(container.inner_html().contains(r#"name="pa-0-id""#));
        assert!(!container.inner_html().contains("__prefix__"));
        assert_eq!(total("pa"), "1");

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_click_on_trigger_descendant() {
        let (config, root) = mount("pb", 2);
        bind_formset(&document(), &config).expect("should bind");

        assert!(!click(&by_id("pb-label")));

        let container = by_id("pb-rows");
        assert_eq!(container.child_element_count(), 3);
        assert!(container.inner_html().contains(r#"name="pb-2-file""#));
        assert_eq!(total("pb"), "3");

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_repeated_clicks_index_in_order() {
        let (config, root) = mount("pc", 0);
        bind_formset(&document(), &config).expect("should bind");

        for _ in 0..3 {
            click(&by_id("pc-label"));
        }

        let container = by_id("pc-rows");
        assert_eq!(container.child_element_count(), 3);
        let children = container.children();
        for i in 0..3u32 {
            let row = children.item(i).expect("row exists");
            assert!(row.inner_html().contains(&format!(r#"name="pc-{i}-file""#)));
        }
        assert_eq!(total("pc"), "3");

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_missing_template_fails_at_bind_time() {
        let (config, root) = mount("pd", 0);
        by_id("pd-template").remove();

        let err = bind_formset(&document(), &config).expect_err("should fail");
        assert!(matches!(err, FormsetError::MissingElement { role: "template", .. }));

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_no_trigger_binds_nothing() {
        let (mut config, root) = mount("pe", 0);
        config.trigger = ".add-nothing-here".to_string();

        assert_eq!(bind_formset(&document(), &config), Ok(0));

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_on_page_ready_runs_immediately_after_load() {
        use std::cell::Cell;
        use std::rc::Rc;

        let ran = Rc::new(Cell::new(false));
        let ran2 = ran.clone();
        on_page_ready(&document(), move || ran2.set(true)).expect("should register");
        assert!(ran.get());
    }
    #[wasm_bindgen_test]
    fn test_second_bind_does_not_double_clicks() {
        let (config, root) = mount("ph", 0);
        assert_eq!(bind_formset(&document(), &config), Ok(1));
        assert_eq!(bind_formset(&document(), &config), Ok(0));
        assert_eq!(bind_all(&document(), &[config.clone()]), Ok(0));

        click(&by_id("ph-label"));

        assert_eq!(by_id("ph-rows").child_element_count(), 1);
        assert_eq!(total("ph"), "1");

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_window_settings_broken_entry_does_not_block_others() {
        let (_, root) = mount("pg", 0);
        let settings = js_sys::JSON::parse(
            r#"[
                {"trigger": ".add-pg", "container": "pg-gone"},
                {"prefix": "pg", "trigger": ".add-pg", "container": "pg-rows", "template": "pg-template"}
            ]"#,
        )
        .expect("valid json");
        let window = web_sys::window().expect("window should exist");
        js_sys::Reflect::set(&window, &"FORMSET".into(), &settings).expect("should set settings");

        let bound = bind_from_window(&document());
        js_sys::Reflect::set(&window, &"FORMSET".into(), &JsValue::UNDEFINED)
            .expect("should clear settings");
        assert_eq!(bound, Ok(1));

        assert!(!click(&by_id("pg-label")));
        let container = by_id("pg-rows");
        assert_eq!(container.child_element_count(), 1);
        assert!(container.inner_html().contains(r#"name="pg-0-file""#));
        assert_eq!(total("pg"), "1");

        root.remove();
    }

    #[wasm_bindgen_test]
    fn test_bind_all_fails_only_when_nothing_binds() {
        let (mut config, root) = mount("pi", 0);
        config.container_id = "pi-gone".to_string();

        let err = bind_all(&document(), &[config]).expect_err("should fail");
        assert!(matches!(err, FormsetError::MissingElement { role: "container", .. }));

        root.remove();
    }
}
