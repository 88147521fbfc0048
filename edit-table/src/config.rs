//! Editing behavior configuration.

/// How a finished edit is written back to its cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitMode {
    /// Restore the text the cell had before the edit and report it as both
    /// the old and the new text. This matches the long-standing behavior
    /// of the widget, where typed text is discarded on blur.
    #[default]
    Restore,
    /// Write the input's value back and report it as the new text.
    Apply,
}

/// Per-table editing configuration.
///
/// # Example
///
/// ```
/// use edit_table::{CommitMode, EditConfig};
///
/// let config = EditConfig::new()
///     .readonly_class("locked")
///     .commit(CommitMode::Apply);
/// assert_eq!(config.readonly_class, "locked");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditConfig {
    /// Cells carrying this class are never made editable.
    ///
    /// Default: `"readonly"`
    pub readonly_class: String,

    /// How an edit is committed on blur.
    pub commit: CommitMode,

    /// Class added to the transient input element, if any.
    pub input_class: Option<String>,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            readonly_class: "readonly".to_string(),
            commit: CommitMode::default(),
            input_class: None,
        }
    }
}

impl EditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class that marks cells as read-only.
    pub fn readonly_class(mut self, class: impl Into<String>) -> Self {
        self.readonly_class = class.into();
        self
    }

    /// Set the commit mode.
    pub fn commit(mut self, mode: CommitMode) -> Self {
        self.commit = mode;
        self
    }

    /// Add a class to the input shown while editing.
    pub fn input_class(mut self, class: impl Into<String>) -> Self {
        self.input_class = Some(class.into());
        self
    }
}
