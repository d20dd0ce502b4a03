use crate::error::{FormsetError, Result};
use crate::host::FormsetHost;
use crate::template::render_row;

/// Appends one uniquely indexed row per call and keeps the total-forms
/// counter equal to the container's row count.
#[derive(Clone, Debug)]
pub struct RowAppender<H> {
    host: H,
    placeholder: String,
}

impl<H: FormsetHost> RowAppender<H> {
    pub fn new(host: H, placeholder: impl Into<String>) -> Self {
        Self {
            host,
            placeholder: placeholder.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn host(&self) -> &H {
        &self.host
    }

    /// Append the next row and return its index.
    ///
    /// Nothing is written unless every read succeeded, so a failed call
    /// leaves the container and the counter as they were.
    pub fn append_row(&self) -> Result<usize> {
        let index = self.host.row_count()?;

        if let Some(max) = self.host.max_forms() {
            if index >= max {
                return Err(FormsetError::LimitReached { max });
            }
        }

        let template = self.host.template_markup()?;
        let row = render_row(&template, &self.placeholder, index)?;

        self.host.append_markup(&row)?;
        self.host.set_total_forms(index + 1)?;
        Ok(index)
    }
}
