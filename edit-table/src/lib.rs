//! Inline-editable HTML tables.
//!
//! [`init_editable_table`] turns a table (optionally rendered from row
//! objects first) into a grid whose cells switch to an input on
//! double-click and commit on blur. The free functions read, write, add,
//! delete and iterate rows of a table located by selector.
//!
//! Nothing here touches a global document: every operation takes a
//! [`TableDom`] explicitly. [`tabledom::Document`] implements it.
//!
//! # Example
//!
//! ```
//! use edit_table::{InitOptions, init_editable_table};
//! use serde_json::json;
//! use tabledom::Document;
//!
//! let mut doc = Document::parse_html(r#"<table id="people"></table>"#).unwrap();
//! let rows = vec![
//!     json!({"Name": "Ann", "Age": 30}).as_object().unwrap().clone(),
//!     json!({"Name": "Bo", "Age": 25}).as_object().unwrap().clone(),
//! ];
//! let table = init_editable_table(&mut doc, InitOptions::new("#people").data(rows)).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get_cell_value(&doc, 1, 1).unwrap(), "30");
//! ```

pub mod config;
pub mod crud;
mod document;
pub mod dom;
pub mod edit;
pub mod error;
pub mod extract;
pub mod render;
pub mod table;

pub use config::{CommitMode, EditConfig};
pub use crud::{
    RowUpdate, add_row_to_table, delete_row_from_table, for_each_row_in_table, get_cell_value,
    update_last_row_cell, update_row_in_table, update_table_cell,
};
pub use dom::{Listener, TableDom, Trigger};
pub use edit::{EditState, OnTextChanged, TextChange};
pub use error::{Result, TableError};
pub use extract::fetch_table_data;
pub use render::{CellCallback, RowCallback, RowData, TableOptions, array_to_table, cell_text};
pub use table::{EditableTable, InitOptions, init_editable_table};
