//! Error types for table operations.

/// Why a table operation could not resolve its target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// No element matches the selector.
    #[error("table '{selector}' not found")]
    TableNotFound { selector: String },

    /// The table has no row at this index.
    #[error("row {row} not found in table '{selector}'")]
    RowNotFound { selector: String, row: usize },

    /// The row exists but has no cell at this index.
    #[error("cell {cell} not found in row {row} of table '{selector}'")]
    CellNotFound {
        selector: String,
        row: usize,
        cell: usize,
    },

    /// The table exists but has no rows at all.
    #[error("table '{selector}' has no rows")]
    EmptyTable { selector: String },
}

pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    pub fn table_not_found(selector: impl Into<String>) -> Self {
        Self::TableNotFound {
            selector: selector.into(),
        }
    }

    pub fn row_not_found(selector: impl Into<String>, row: usize) -> Self {
        Self::RowNotFound {
            selector: selector.into(),
            row,
        }
    }

    pub fn cell_not_found(selector: impl Into<String>, row: usize, cell: usize) -> Self {
        Self::CellNotFound {
            selector: selector.into(),
            row,
            cell,
        }
    }

    /// Checks whether the table itself was missing, as opposed to an
    /// address inside it.
    pub fn is_table_missing(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }
}

/// Log a soft fault and hand the result back unchanged.
///
/// Soft faults never abort the caller; they are reported on the error log
/// and surface as an `Err` value the caller is free to ignore.
pub(crate) fn report<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::error!("{operation}: {e}");
    }
    result
}
