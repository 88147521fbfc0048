//! Reading a table back into row objects.

use serde_json::Value;

use crate::dom::TableDom;
use crate::error::{Result, TableError};
use crate::render::RowData;

/// Read a table into one object per data row.
///
/// Field names are the text of every `<th>` in the table, in document
/// order. The first `<tr>` is taken to be the header row and skipped; each
/// remaining row pairs the headers with its `<td>` cells by position.
/// Missing cells read as an empty string, and a repeated header name keeps
/// the last cell's value.
///
/// Fails with [`TableError::TableNotFound`] if no table matches.
pub fn fetch_table_data<D: TableDom>(dom: &D, selector: &str) -> Result<Vec<RowData>> {
    let table = dom
        .query_selector(selector)
        .ok_or_else(|| TableError::table_not_found(selector))?;

    let headers: Vec<String> = dom
        .descendants_by_tag(table, "th")
        .into_iter()
        .map(|th| dom.text_content(th))
        .collect();

    let data = dom
        .descendants_by_tag(table, "tr")
        .into_iter()
        .skip(1)
        .map(|row| {
            let cells = dom.descendants_by_tag(row, "td");
            let mut record = RowData::new();
            for (i, header) in headers.iter().enumerate() {
                let text = cells
                    .get(i)
                    .map(|cell| dom.text_content(*cell))
                    .unwrap_or_default();
                record.insert(header.clone(), Value::String(text));
            }
            record
        })
        .collect();

    Ok(data)
}
