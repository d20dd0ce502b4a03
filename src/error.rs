use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, FormsetError>;

/// Everything that can stop a row from being appended.
///
/// Apart from `LimitReached` these are integration errors: the page markup
/// does not match the configuration, so they are logged loudly and never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormsetError {
    #[error("{role} element `#{id}` not found")]
    MissingElement { role: &'static str, id: String },

    #[error("element `#{id}` is not {expected}")]
    WrongElementKind { id: String, expected: &'static str },

    #[error("placeholder token must not be empty")]
    EmptyPlaceholder,

    #[error("formset already holds the maximum of {max} forms")]
    LimitReached { max: usize },

    #[error("invalid formset config: {0}")]
    Config(String),

    #[error("dom error: {0}")]
    Dom(String),
}

impl From<JsValue> for FormsetError {
    fn from(value: JsValue) -> Self {
        Self::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<serde_json::Error> for FormsetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<FormsetError> for JsValue {
    fn from(err: FormsetError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
