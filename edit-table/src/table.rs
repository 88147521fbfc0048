//! The editable table controller.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::config::EditConfig;
use crate::crud::{self, RowUpdate};
use crate::dom::TableDom;
use crate::edit::{self, EditContext, Notifier, OnTextChanged, TextChange};
use crate::error::Result;
use crate::extract::fetch_table_data;
use crate::render::{CellCallback, RowCallback, RowData, TableOptions, array_to_table};

/// Input for [`init_editable_table`].
pub struct InitOptions<D: TableDom> {
    /// Table to make editable (and render into, when `data` is set).
    pub selector: String,
    /// Rows to render before wiring.
    pub data: Option<Vec<RowData>>,
    pub row_callback: Option<RowCallback<D>>,
    pub cell_callback: Option<CellCallback<D>>,
    pub on_text_changed: Option<OnTextChanged<D::Node>>,
    pub config: EditConfig,
}

impl<D: TableDom> InitOptions<D> {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            data: None,
            row_callback: None,
            cell_callback: None,
            on_text_changed: None,
            config: EditConfig::default(),
        }
    }

    /// Render these rows into the table before wiring it.
    pub fn data(mut self, data: Vec<RowData>) -> Self {
        self.data = Some(data);
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

    /// Notify `callback` after each committed edit. The returned future is
    /// spawned and never awaited.
    pub fn on_text_changed(
        mut self,
        callback: impl Fn(TextChange<D::Node>) -> BoxFuture<'static, ()> + 'static,
    ) -> Self {
        self.on_text_changed = Some(Rc::new(callback));
        self
    }

    pub fn config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }
}

/// Make a table's cells editable in place.
///
/// With `data`, the rows are first rendered into the table matching the
/// selector and the rendered cells are wired; otherwise every `<td>` under
/// the selector is. Cells carrying the configured read-only class are left
/// alone.
///
/// Double-clicking a cell swaps its text for a focused input with the caret
/// at the end. When the input loses focus it is removed, the cell text is
/// written back according to [`EditConfig::commit`], and the change
/// callback is notified.
///
/// Fails with [`crate::TableError::TableNotFound`] if the table does not
/// exist.
pub fn init_editable_table<D: TableDom>(
    dom: &mut D,
    options: InitOptions<D>,
) -> Result<EditableTable<D>> {
    let InitOptions {
        selector,
        data,
        row_callback,
        cell_callback,
        on_text_changed,
        config,
    } = options;

    let cells = match data {
        Some(data) => {
            let table = array_to_table(
                dom,
                TableOptions {
                    selector: Some(selector.clone()),
                    data,
                    row_callback,
                    cell_callback,
                },
            )?;
            dom.descendants_by_tag(table, "td")
        }
        None => dom.query_selector_all(&format!("{selector} td")),
    };

    let ctx = Rc::new(EditContext {
        notifier: on_text_changed.map(Notifier::new),
        config,
    });

    let mut wired = 0;
    for cell in &cells {
        if dom.has_class(*cell, &ctx.config.readonly_class) {
            continue;
        }
        edit::wire_cell(dom, *cell, Rc::clone(&ctx));
        wired += 1;
    }
    log::debug!(
        "{selector}: {wired} editable cell(s), {} read-only",
        cells.len() - wired
    );

    let length = fetch_table_data(dom, &selector)?.len();
    Ok(EditableTable {
        selector,
        length,
        _dom: PhantomData,
    })
}

/// Handle returned by [`init_editable_table`].
///
/// Operations re-locate the table by selector on every call and take the
/// document explicitly.
pub struct EditableTable<D: TableDom> {
    selector: String,
    length: usize,
    _dom: PhantomData<fn(&mut D)>,
}

impl<D: TableDom> fmt::Debug for EditableTable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableTable")
            .field("selector", &self.selector)
            .field("length", &self.length)
            .finish()
    }
}

impl<D: TableDom> Clone for EditableTable<D> {
    fn clone(&self) -> Self {
        Self {
            selector: self.selector.clone(),
            length: self.length,
            _dom: PhantomData,
        }
    }
}

impl<D: TableDom> EditableTable<D> {
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Number of data rows when the table was initialised. Not updated by
    /// later row changes.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn fetch_table_data(&self, dom: &D) -> Result<Vec<RowData>> {
        fetch_table_data(dom, &self.selector)
    }

    pub fn get_cell_value(&self, dom: &D, row: usize, cell: usize) -> Result<String> {
        crud::get_cell_value(dom, &self.selector, row, cell)
    }

    pub fn update_table_cell(&self, dom: &mut D, row: usize, cell: usize, text: &str) -> Result<()> {
        crud::update_table_cell(dom, &self.selector, row, cell, text)
    }

    pub fn update_last_row_cell(&self, dom: &mut D, cell: usize, text: &str) -> Result<()> {
        crud::update_last_row_cell(dom, &self.selector, cell, text)
    }

    pub fn add_row<S: AsRef<str>>(&self, dom: &mut D, values: &[S]) -> Result<D::Node> {
        crud::add_row_to_table(dom, &self.selector, values)
    }

    pub fn update_row<S: AsRef<str>>(
        &self,
        dom: &mut D,
        row: usize,
        values: &[S],
    ) -> Result<RowUpdate> {
        crud::update_row_in_table(dom, &self.selector, row, values)
    }

    pub fn delete_row(&self, dom: &mut D, row: usize) -> Result<()> {
        crud::delete_row_from_table(dom, &self.selector, row)
    }

    pub fn for_each<F>(&self, dom: &D, callback: F) -> Result<usize>
    where
        F: FnMut(Vec<String>, usize, D::Node),
    {
        crud::for_each_row_in_table(dom, &self.selector, callback)
    }
}
