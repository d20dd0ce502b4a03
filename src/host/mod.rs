use crate::error::Result;

/// The page surface a formset row appender works against.
///
/// `DomHost` is the browser implementation; tests use an in-memory one.
pub trait FormsetHost {
    /// Current number of row blocks in the container. Read fresh each call.
    fn row_count(&self) -> Result<usize>;

    /// Raw markup of the empty-row template, placeholder still in place.
    fn template_markup(&self) -> Result<String>;

    /// Append rendered markup after the container's last row.
    fn append_markup(&self, markup: &str) -> Result<()>;

    /// Write the management form's total-forms value.
    fn set_total_forms(&self, total: usize) -> Result<()>;

    /// Ceiling from the management form, if the page renders one.
    fn max_forms(&self) -> Option<usize> {
        None
    }
}
