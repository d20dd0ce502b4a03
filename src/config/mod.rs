use crate::error::{FormsetError, Result};
use serde::{Deserialize, Deserializer};

pub(crate) const DEFAULT_PREFIX: &str = "images";
pub(crate) const DEFAULT_TRIGGER: &str = ".add-images";
pub(crate) const DEFAULT_CONTAINER_ID: &str = "item-images";
pub(crate) const DEFAULT_TEMPLATE_ID: &str = "images-template";
pub(crate) const DEFAULT_PLACEHOLDER: &str = "__prefix__";

/// Name of the page global holding formset settings, like `window.ENV`.
pub(crate) const WINDOW_SETTINGS_KEY: &str = "FORMSET";

/// Where the appender finds its elements.
///
/// The management-form ids follow Django's formset naming and belong to the
/// server side, so they are configuration rather than literals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormsetConfig {
    /// CSS selector for the "add more" control(s).
    pub trigger: String,
    pub container_id: String,
    pub template_id: String,
    pub total_forms_id: String,
    /// Optional ceiling field; `None` disables the check.
    pub max_forms_id: Option<String>,
    pub placeholder: String,
}

impl FormsetConfig {
    /// Page defaults with the management-form ids derived from `prefix`.
    pub fn for_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim();
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            total_forms_id: total_forms_id(prefix),
            max_forms_id: Some(max_forms_id(prefix)),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("trigger", &self.trigger),
            ("container", &self.container_id),
            ("template", &self.template_id),
            ("total_forms", &self.total_forms_id),
            ("placeholder", &self.placeholder),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(FormsetError::Config(format!("`{key}` must not be empty")));
            }
        }
        if let Some(max) = &self.max_forms_id {
            if max.trim().is_empty() {
                return Err(FormsetError::Config("`max_forms` must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Parse page settings: either one settings object or an array of them.
    pub fn from_settings_json(json: &str) -> Result<Vec<Self>> {
        let parsed: OneOrMany = serde_json::from_str(json)?;
        let raw = match parsed {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        };

        if raw.is_empty() {
            return Err(FormsetError::Config("settings array is empty".to_string()));
        }

        raw.into_iter()
            .map(|s| {
                let config = s.into_config();
                config.validate()?;
                Ok(config)
            })
            .collect()
    }

    /// Read `window.FORMSET`.
    ///
    /// A page that does not set it gets the defaults; a page that sets it to
    /// something unparsable gets an error, since that is a template mistake.
    pub fn load_from_window() -> Result<Vec<Self>> {
        let Some(window) = web_sys::window() else {
            return Ok(vec![Self::default()]);
        };
        let Some(settings) = window.get(WINDOW_SETTINGS_KEY) else {
            return Ok(vec![Self::default()]);
        };
        if settings.is_undefined() || settings.is_null() {
            return Ok(vec![Self::default()]);
        }

        let json = js_sys::JSON::stringify(&settings)?;
        Self::from_settings_json(&String::from(json))
    }
}

impl Default for FormsetConfig {
    fn default() -> Self {
        Self::for_prefix(DEFAULT_PREFIX)
    }
}

pub(crate) fn total_forms_id(prefix: &str) -> String {
    format!("id_{prefix}-TOTAL_FORMS")
}

pub(crate) fn max_forms_id(prefix: &str) -> String {
    format!("id_{prefix}-MAX_NUM_FORMS")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(FormsetSettings),
    Many(Vec<FormsetSettings>),
}

/// Settings as written by the page. Every key is optional; explicit ids win
/// over ids derived from `prefix`. `"max_forms": null` turns the ceiling off.
#[derive(Deserialize, Default, Debug)]
#[serde(default, deny_unknown_fields)]
struct FormsetSettings {
    prefix: Option<String>,
    trigger: Option<String>,
    container: Option<String>,
    template: Option<String>,
    total_forms: Option<String>,
    #[serde(deserialize_with = "present")]
    max_forms: Option<Option<String>>,
    placeholder: Option<String>,
}

/// Absent key stays `None` via `#[serde(default)]`; an explicit `null` becomes
/// `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl FormsetSettings {
    fn into_config(self) -> FormsetConfig {
        let base = match &self.prefix {
            Some(prefix) => FormsetConfig::for_prefix(prefix),
            None => FormsetConfig::default(),
        };

        FormsetConfig {
            trigger: self.trigger.unwrap_or(base.trigger),
            container_id: self.container.unwrap_or(base.container_id),
            template_id: self.template.unwrap_or(base.template_id),
            total_forms_id: self.total_forms.unwrap_or(base.total_forms_id),
            max_forms_id: self.max_forms.unwrap_or(base.max_forms_id),
            placeholder: self.placeholder.unwrap_or(base.placeholder),
        }
    }
}
