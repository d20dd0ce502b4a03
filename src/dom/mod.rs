use crate::config::FormsetConfig;
use crate::error::{FormsetError, Result};
use crate::host::FormsetHost;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

/// `FormsetHost` over the live page.
#[derive(Clone, Debug)]
pub struct DomHost {
    container: Element,
    template_holder: Element,
    total_forms: HtmlInputElement,
    max_forms: Option<HtmlInputElement>,
}

impl DomHost {
    /// Look up every element `config` names. Missing required elements are
    /// configuration errors; a missing max-forms field just disables the
    /// ceiling.
    pub fn resolve(document: &Document, config: &FormsetConfig) -> Result<Self> {
        let container = require(document, "container", &config.container_id)?;
        let template_holder = require(document, "template", &config.template_id)?;
        let total_forms = require(document, "total forms", &config.total_forms_id)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| FormsetError::WrongElementKind {
                id: config.total_forms_id.clone(),
                expected: "an <input>",
            })?;

        let max_forms = config
            .max_forms_id
            .as_deref()
            .and_then(|id| document.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());

        Ok(Self {
            container,
            template_holder,
            total_forms,
            max_forms,
        })
    }

    #[cfg(test)]
    pub(crate) fn container(&self) -> &Element {
        &self.container
    }

    #[cfg(test)]
    pub(crate) fn total_forms(&self) -> &HtmlInputElement {
        &self.total_forms
    }
}

fn require(document: &Document, role: &'static str, id: &str) -> Result<Element> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| FormsetError::MissingElement {
            role,
            id: id.to_string(),
        })
}

impl FormsetHost for DomHost {
    fn row_count(&self) -> Result<usize> {
        // Element children only; stray whitespace text nodes are not rows.
        Ok(self.container.child_element_count() as usize)
    }

    fn template_markup(&self) -> Result<String> {
        Ok(self.template_holder.inner_html())
    }

    fn append_markup(&self, markup: &str) -> Result<()> {
        self.container.insert_adjacent_html("beforeend", markup)?;
        Ok(())
    }

    fn set_total_forms(&self, total: usize) -> Result<()> {
        let value = total.to_string();
        // Attribute for serialisation, property for submission.
        self.total_forms.set_attribute("value", &value)?;
        self.total_forms.set_value(&value);
        Ok(())
    }

    fn max_forms(&self) -> Option<usize> {
        self.max_forms
            .as_ref()
            .and_then(|el| el.value().trim().parse::<usize>().ok())
    }
}
