//! Cell and row helpers addressed by selector.
//!
//! Every helper locates its table afresh on each call. Row indices address
//! the whole table's row list, header rows included ("table row index"),
//! except in [`for_each_row_in_table`], which counts from the first row
//! after the header section.
//!
//! Apart from [`add_row_to_table`], these helpers treat a missing table,
//! row or cell as a soft fault: it is logged at error level, nothing is
//! changed, and the error comes back as a value.

use crate::dom::TableDom;
use crate::error::{Result, TableError, report};

/// Outcome of [`update_row_in_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowUpdate {
    /// Number of cells whose text was written.
    pub updated: usize,
    /// Value positions that had no matching cell.
    pub missing: Vec<usize>,
}

impl RowUpdate {
    /// True when every value found a cell.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub(crate) fn find_table<D: TableDom>(dom: &D, selector: &str) -> Result<D::Node> {
    dom.query_selector(selector)
        .ok_or_else(|| TableError::table_not_found(selector))
}

fn find_row<D: TableDom>(dom: &D, selector: &str, row: usize) -> Result<D::Node> {
    let table = find_table(dom, selector)?;
    dom.rows(table)
        .get(row)
        .copied()
        .ok_or_else(|| TableError::row_not_found(selector, row))
}

fn find_cell<D: TableDom>(dom: &D, selector: &str, row: usize, cell: usize) -> Result<D::Node> {
    let row_node = find_row(dom, selector, row)?;
    dom.cells(row_node)
        .get(cell)
        .copied()
        .ok_or_else(|| TableError::cell_not_found(selector, row, cell))
}

/// Number of rows in the table's header section (0 without a `<thead>`).
pub(crate) fn header_row_count<D: TableDom>(dom: &D, table: D::Node) -> usize {
    dom.head_rows(table).map_or(0, |rows| rows.len())
}

/// Text of the cell at (`row`, `cell`).
pub fn get_cell_value<D: TableDom>(
    dom: &D,
    selector: &str,
    row: usize,
    cell: usize,
) -> Result<String> {
    let cell = report("get_cell_value", find_cell(dom, selector, row, cell))?;
    Ok(dom.text_content(cell))
}

/// Replace the text of the cell at (`row`, `cell`).
pub fn update_table_cell<D: TableDom>(
    dom: &mut D,
    selector: &str,
    row: usize,
    cell: usize,
    text: &str,
) -> Result<()> {
    let cell = report("update_table_cell", find_cell(dom, selector, row, cell))?;
    dom.set_text_content(cell, text);
    Ok(())
}

/// Replace the text of a cell in whichever row is last at call time.
pub fn update_last_row_cell<D: TableDom>(
    dom: &mut D,
    selector: &str,
    cell: usize,
    text: &str,
) -> Result<()> {
    let target = report("update_last_row_cell", {
        find_table(dom, selector).and_then(|table| {
            let rows = dom.rows(table);
            let (row, last) = rows
                .iter()
                .enumerate()
                .next_back()
                .ok_or_else(|| TableError::EmptyTable {
                    selector: selector.to_string(),
                })?;
            dom.cells(*last)
                .get(cell)
                .copied()
                .ok_or_else(|| TableError::cell_not_found(selector, row, cell))
        })
    })?;
    dom.set_text_content(target, text);
    Ok(())
}

/// Append a row with one cell per value and return it.
///
/// A missing table is not a soft fault here: the error is returned without
/// being logged.
pub fn add_row_to_table<D, S>(dom: &mut D, selector: &str, values: &[S]) -> Result<D::Node>
where
    D: TableDom,
    S: AsRef<str>,
{
    let table = find_table(dom, selector)?;
    let row = dom.insert_row(table);
    for value in values {
        let cell = dom.insert_cell(row);
        dom.set_text_content(cell, value.as_ref());
    }
    Ok(row)
}

/// Overwrite a row's cells by position.
///
/// Values without a matching cell are reported one by one; the rest are
/// still written.
pub fn update_row_in_table<D, S>(
    dom: &mut D,
    selector: &str,
    row: usize,
    values: &[S],
) -> Result<RowUpdate>
where
    D: TableDom,
    S: AsRef<str>,
{
    let row_node = report("update_row_in_table", find_row(dom, selector, row))?;
    let cells = dom.cells(row_node);

    let mut outcome = RowUpdate::default();
    for (i, value) in values.iter().enumerate() {
        match cells.get(i) {
            Some(cell) => {
                dom.set_text_content(*cell, value.as_ref());
                outcome.updated += 1;
            }
            None => {
                log::error!(
                    "update_row_in_table: {}",
                    TableError::cell_not_found(selector, row, i)
                );
                outcome.missing.push(i);
            }
        }
    }
    Ok(outcome)
}

/// Remove the row at `row`. Remaining rows keep their order.
pub fn delete_row_from_table<D: TableDom>(dom: &mut D, selector: &str, row: usize) -> Result<()> {
    let table = report("delete_row_from_table", find_table(dom, selector))?;
    if dom.delete_row(table, row) {
        Ok(())
    } else {
        report(
            "delete_row_from_table",
            Err(TableError::row_not_found(selector, row)),
        )
    }
}

/// Visit every row after the header section.
///
/// The callback receives the row's cell texts, its index counted from the
/// first non-header row, and the row itself. Returns the number of rows
/// visited.
pub fn for_each_row_in_table<D, F>(dom: &D, selector: &str, mut callback: F) -> Result<usize>
where
    D: TableDom,
    F: FnMut(Vec<String>, usize, D::Node),
{
    let table = report("for_each_row_in_table", find_table(dom, selector))?;
    let rows = dom.rows(table);
    if rows.is_empty() {
        return report(
            "for_each_row_in_table",
            Err(TableError::EmptyTable {
                selector: selector.to_string(),
            }),
        );
    }

    let header_rows = header_row_count(dom, table);
    let mut visited = 0;
    for (i, row) in rows.into_iter().enumerate().skip(header_rows) {
        let texts = dom
            .cells(row)
            .into_iter()
            .map(|cell| dom.text_content(cell))
            .collect();
        callback(texts, i - header_rows, row);
        visited += 1;
    }
    Ok(visited)
}
