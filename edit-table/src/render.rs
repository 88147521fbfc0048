//! Rendering row objects into a table.

use serde_json::{Number, Value};

use crate::dom::TableDom;
use crate::error::{Result, TableError};

/// One source row: field name to value, in insertion order.
pub type RowData = serde_json::Map<String, Value>;

/// Called with each new `<tr>` before its cells are appended.
pub type RowCallback<D> = Box<dyn FnMut(&mut D, <D as TableDom>::Node, &RowData)>;

/// Called with each new `<td>` right after its text is set.
pub type CellCallback<D> = Box<dyn FnMut(&mut D, <D as TableDom>::Node, &Value, &RowData)>;

/// Input for [`array_to_table`].
pub struct TableOptions<D: TableDom> {
    /// Existing table to clear and refill. A detached table is created
    /// when this is None.
    pub selector: Option<String>,
    pub data: Vec<RowData>,
    pub row_callback: Option<RowCallback<D>>,
    pub cell_callback: Option<CellCallback<D>>,
}

impl<D: TableDom> TableOptions<D> {
    pub fn new(data: Vec<RowData>) -> Self {
        Self {
            selector: None,
            data,
            row_callback: None,
            cell_callback: None,
        }
    }

    /// Render into the table matching `selector` instead of a new one.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn on_row(mut self, callback: impl FnMut(&mut D, D::Node, &RowData) + 'static) -> Self {
        self.row_callback = Some(Box::new(callback));
        self
    }

    pub fn on_cell(
        mut self,
        callback: impl FnMut(&mut D, D::Node, &Value, &RowData) + 'static,
    ) -> Self {
        self.cell_callback = Some(Box::new(callback));
        self
    }
}

/// Text shown for a value, following JavaScript string conversion:
/// strings as-is, nothing for null, whole floats without a fraction,
/// arrays joined with commas and objects as `[object Object]`.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        // Integral values below 1e21 print without exponent or fraction
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Build a table from row objects.
///
/// Header cells come from the keys of the first row. Each body row takes
/// its cells from its own keys, so rows with different shapes produce
/// ragged rows rather than an error.
///
/// Fails with [`TableError::TableNotFound`] if a selector is given and
/// matches nothing.
pub fn array_to_table<D: TableDom>(dom: &mut D, options: TableOptions<D>) -> Result<D::Node> {
    let TableOptions {
        selector,
        data,
        mut row_callback,
        mut cell_callback,
    } = options;

    let table = match &selector {
        Some(selector) => {
            let table = dom
                .query_selector(selector)
                .ok_or_else(|| TableError::table_not_found(selector))?;
            dom.clear(table);
            table
        }
        None => dom.create_element("table"),
    };

    // Header
    let head = dom.create_element("thead");
    let header_row = dom.create_element("tr");
    let columns = data.first().map_or(0, |first| first.len());
    if let Some(first) = data.first() {
        for key in first.keys() {
            let th = dom.create_element("th");
            dom.set_text_content(th, key);
            dom.append_child(header_row, th);
        }
    }
    dom.append_child(head, header_row);
    dom.append_child(table, head);

    // Body
    let body = dom.create_element("tbody");
    for (index, row_data) in data.iter().enumerate() {
        let tr = dom.create_element("tr");

        if let Some(callback) = row_callback.as_mut() {
            callback(dom, tr, row_data);
        }

        if row_data.len() != columns {
            log::debug!(
                "row {index} has {} field(s), header has {columns}",
                row_data.len()
            );
        }

        for value in row_data.values() {
            let td = dom.create_element("td");
            dom.set_text_content(td, &cell_text(value));

            if let Some(callback) = cell_callback.as_mut() {
                callback(dom, td, value, row_data);
            }

            dom.append_child(tr, td);
        }
        dom.append_child(body, tr);
    }
    dom.append_child(table, body);

    log::debug!(
        "rendered {} row(s) x {columns} column(s) into {}",
        data.len(),
        selector.as_deref().unwrap_or("a new table")
    );
    Ok(table)
}
