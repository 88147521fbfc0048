use std::cell::RefCell;
use std::rc::Rc;

use edit_table::{RowData, TableDom, TableError, TableOptions, array_to_table, fetch_table_data};
use serde_json::{Value, json};
use tabledom::Document;

fn row(value: Value) -> RowData {
    value.as_object().cloned().expect("fixture rows are objects")
}

fn people() -> Vec<RowData> {
    vec![
        row(json!({"Name": "Ann", "Age": 30, "City": "Oslo"})),
        row(json!({"Name": "Bo", "Age": 25, "City": "Rome"})),
        row(json!({"Name": "Cy", "Age": null, "City": "Lima"})),
    ]
}

fn texts(doc: &Document, nodes: Vec<tabledom::NodeId>) -> Vec<String> {
    nodes.into_iter().map(|n| doc.text_content(n)).collect()
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_renders_header_from_first_row_keys() {
    let mut doc = Document::new();
    let table = array_to_table(&mut doc, TableOptions::new(people())).unwrap();

    let headers = doc.descendants_by_tag(table, "th");
    assert_eq!(texts(&doc, headers), vec!["Name", "Age", "City"]);
}

#[test]
fn test_renders_one_body_row_per_object() {
    let mut doc = Document::new();
    let table = array_to_table(&mut doc, TableOptions::new(people())).unwrap();

    let head_rows = doc.head_rows(table).unwrap();
    let rows = doc.rows(table);
    assert_eq!(head_rows.len(), 1);
    assert_eq!(rows.len() - head_rows.len(), 3);

    let last = doc.cells(rows[3]);
    assert_eq!(texts(&doc, last), vec!["Cy", "", "Lima"]);
}

#[test]
fn test_new_table_is_detached() {
    let mut doc = Document::new();
    let table = array_to_table(&mut doc, TableOptions::new(people())).unwrap();
    assert!(!doc.is_connected(table));
    assert_eq!(doc.tag(table), Some("table"));
}

#[test]
fn test_renders_into_existing_table_replacing_content() {
    let mut doc =
        Document::parse_html(r#"<table id="t"><tr><td>old</td></tr></table>"#).unwrap();
    let table = array_to_table(&mut doc, TableOptions::new(people()).selector("#t")).unwrap();

    assert_eq!(doc.get_element_by_id("t"), Some(table));
    let body_cells = doc.descendants_by_tag(table, "td");
    assert_eq!(body_cells.len(), 9);
    assert!(!texts(&doc, body_cells).contains(&"old".to_string()));
}

#[test]
fn test_missing_target_table_fails() {
    let mut doc = Document::new();
    let err = array_to_table(&mut doc, TableOptions::new(people()).selector("#nope")).unwrap_err();
    assert_eq!(err, TableError::table_not_found("#nope"));
}

#[test]
fn test_empty_data_gives_empty_header_row() {
    let mut doc = Document::new();
    let table = array_to_table(&mut doc, TableOptions::new(Vec::new())).unwrap();
    let rows = doc.rows(table);
    assert_eq!(rows.len(), 1);
    assert!(doc.cells(rows[0]).is_empty());
}

#[test]
fn test_ragged_rows_follow_their_own_keys() {
    let mut doc = Document::new();
    let data = vec![
        row(json!({"a": "1", "b": "2"})),
        row(json!({"b": "3"})),
        row(json!({"c": "4", "a": "5", "d": "6"})),
    ];
    let table = array_to_table(&mut doc, TableOptions::new(data)).unwrap();
    let rows = doc.rows(table);

    assert_eq!(doc.cells(rows[1]).len(), 2);
    assert_eq!(texts(&doc, doc.cells(rows[2])), vec!["3"]);
    assert_eq!(texts(&doc, doc.cells(rows[3])), vec!["4", "5", "6"]);
}

#[test]
fn test_non_string_values_render_like_script_strings() {
    let mut doc = Document::new();
    let data = vec![row(json!({
        "n": 1.5,
        "whole": 1.0,
        "neg": -0.0,
        "b": true,
        "list": ["a", 2, null, [3, 4]],
        "o": {"x": 1},
        "s": "plain"
    }))];
    let table = array_to_table(&mut doc, TableOptions::new(data)).unwrap();
    let body = doc.rows(table)[1];
    assert_eq!(
        texts(&doc, doc.cells(body)),
        vec!["1.5", "1", "0", "true", "a,2,,3,4", "[object Object]", "plain"]
    );
}

// ============================================================================
// Callbacks
// ============================================================================

#[test]
fn test_row_callback_runs_before_cells_are_added() {
    let mut doc = Document::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_rows = seen.clone();

    let options = TableOptions::<Document>::new(people()).on_row(move |doc: &mut Document, tr, data| {
        seen_rows
            .borrow_mut()
            .push((doc.cells(tr).len(), data["Name"].clone()));
        doc.add_class(tr, "person");
    });
    let table = array_to_table(&mut doc, options).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![(0, json!("Ann")), (0, json!("Bo")), (0, json!("Cy"))]
    );
    let body_rows = &doc.rows(table)[1..];
    assert!(body_rows.iter().all(|r| doc.has_class(*r, "person")));
}

#[test]
fn test_cell_callback_sees_text_value_and_row() {
    let mut doc = Document::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_cells = seen.clone();

    let options = TableOptions::<Document>::new(people()).on_cell(move |doc: &mut Document, td, value, data| {
        seen_cells
            .borrow_mut()
            .push((doc.text_content(td), value.clone(), data["City"].clone()));
        if value.is_null() {
            doc.add_class(td, "empty");
        }
    });
    let table = array_to_table(&mut doc, options).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 9);
    assert_eq!(seen[1], ("30".to_string(), json!(30), json!("Oslo")));
    assert_eq!(doc.query_selector_all("td.empty").unwrap().len(), 0);
    assert_eq!(
        doc.query_selector_all_within(table, "td.empty").unwrap().len(),
        1
    );
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_fetch_table_data_pairs_headers_with_cells() {
    let doc = Document::parse_html(
        r#"<table id="t">
             <tr><th>Name</th><th>Age</th></tr>
             <tr><td>Ann</td><td>30</td></tr>
             <tr><td>Bo</td><td>25</td></tr>
           </table>"#,
    )
    .unwrap();

    let data = fetch_table_data(&doc, "#t").unwrap();
    assert_eq!(
        data,
        vec![
            row(json!({"Name": "Ann", "Age": "30"})),
            row(json!({"Name": "Bo", "Age": "25"})),
        ]
    );
}

#[test]
fn test_fetch_table_data_pads_short_rows_and_overwrites_duplicates() {
    let doc = Document::parse_html(
        r#"<table id="t">
             <tr><th>A</th><th>B</th><th>A</th></tr>
             <tr><td>1</td><td>2</td><td>3</td></tr>
             <tr><td>4</td></tr>
           </table>"#,
    )
    .unwrap();

    let data = fetch_table_data(&doc, "#t").unwrap();
    assert_eq!(data[0], row(json!({"A": "3", "B": "2"})));
    assert_eq!(data[1], row(json!({"A": "", "B": ""})));
    assert_eq!(data[0].keys().collect::<Vec<_>>(), vec!["A", "B"]);
}

#[test]
fn test_fetch_table_data_missing_table_fails() {
    let doc = Document::new();
    assert!(fetch_table_data(&doc, "#t").unwrap_err().is_table_missing());
}

#[test]
fn test_render_then_fetch_round_trips_strings() {
    let mut doc = Document::parse_html(r#"<table id="t"></table>"#).unwrap();
    let data = vec![
        row(json!({"Name": "Ann", "Age": "30"})),
        row(json!({"Name": "Bo", "Age": "25"})),
    ];
    array_to_table(&mut doc, TableOptions::new(data.clone()).selector("#t")).unwrap();
    assert_eq!(fetch_table_data(&doc, "#t").unwrap(), data);
}
