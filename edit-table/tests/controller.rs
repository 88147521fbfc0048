use std::time::Duration;

use edit_table::{
    CommitMode, EditConfig, InitOptions, RowData, TableDom, TableError, TextChange,
    init_editable_table,
};
use futures::FutureExt;
use serde_json::json;
use tabledom::{Document, EventKind, Key, Modifiers, NodeId};
use tokio::sync::mpsc;

const PEOPLE: &str = r#"
<table id="t">
  <thead><tr><th>Name</th><th>Age</th></tr></thead>
  <tbody>
    <tr><td>Ann</td><td class="readonly">30</td></tr>
    <tr><td>Bo</td><td>25</td></tr>
  </tbody>
</table>"#;

fn people() -> Document {
    Document::parse_html(PEOPLE).unwrap()
}

fn cell(doc: &Document, row: usize, col: usize) -> NodeId {
    let table = TableDom::query_selector(doc, "#t").unwrap();
    doc.cells(doc.rows(table)[row])[col]
}

fn inputs(doc: &Document, cell: NodeId) -> Vec<NodeId> {
    doc.query_selector_all_within(cell, "input").unwrap()
}

fn replace_text(doc: &mut Document, text: &str) {
    doc.press_key(Key::Char('a'), Modifiers::ctrl());
    doc.type_text(text);
}

fn with_channel(
    options: InitOptions<Document>,
) -> (
    InitOptions<Document>,
    mpsc::UnboundedReceiver<TextChange<NodeId>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let options = options.on_text_changed(move |change| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(change);
        }
        .boxed()
    });
    (options, rx)
}

// ============================================================================
// Edit session
// ============================================================================

#[test]
fn test_double_click_opens_focused_input_with_caret_at_end() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let ann = cell(&doc, 1, 0);

    doc.double_click(ann);

    let input = inputs(&doc, ann);
    assert_eq!(input.len(), 1);
    assert_eq!(doc.text_content(ann), "");
    assert_eq!(doc.focused(), Some(input[0]));

    let data = doc.input(input[0]).unwrap();
    assert_eq!(data.text, "Ann");
    assert_eq!(data.cursor, 3);
    assert!(!data.has_selection());
}

#[test]
fn test_blur_restores_pre_edit_text_by_default() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let ann = cell(&doc, 1, 0);

    doc.double_click(ann);
    replace_text(&mut doc, "Zed");
    doc.blur();

    assert_eq!(doc.text_content(ann), "Ann");
    assert!(inputs(&doc, ann).is_empty());
    assert_eq!(doc.focused(), None);
}

#[test]
fn test_apply_mode_keeps_typed_text() {
    let mut doc = people();
    let options = InitOptions::new("#t").config(EditConfig::new().commit(CommitMode::Apply));
    init_editable_table(&mut doc, options).unwrap();
    let bo = cell(&doc, 2, 0);

    doc.double_click(bo);
    doc.type_text("b");
    doc.blur();

    assert_eq!(doc.text_content(bo), "Bob");
}

#[test]
fn test_double_click_while_editing_is_ignored() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let ann = cell(&doc, 1, 0);

    doc.double_click(ann);
    doc.type_text("ie");
    let input = inputs(&doc, ann)[0];

    doc.double_click(ann);
    doc.double_click(input);

    assert_eq!(inputs(&doc, ann), vec![input]);
    assert_eq!(doc.input_value(input), Some("Annie"));
    assert_eq!(doc.focused(), Some(input));
}

#[test]
fn test_cell_can_be_edited_again_after_commit() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let ann = cell(&doc, 1, 0);

    for _ in 0..3 {
        doc.double_click(ann);
        assert_eq!(inputs(&doc, ann).len(), 1);
        doc.blur();
        assert_eq!(doc.text_content(ann), "Ann");
    }
}

#[test]
fn test_readonly_and_header_cells_are_not_editable() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();

    for (row, col) in [(1, 1), (0, 0)] {
        let target = cell(&doc, row, col);
        let before = doc.text_content(target);
        doc.double_click(target);
        assert!(inputs(&doc, target).is_empty());
        assert_eq!(doc.text_content(target), before);
    }
}

#[test]
fn test_custom_readonly_and_input_classes() {
    let mut doc = people();
    let config = EditConfig::new()
        .readonly_class("locked")
        .input_class("cell-editor");
    init_editable_table(&mut doc, InitOptions::new("#t").config(config)).unwrap();

    // "readonly" means nothing now
    let age = cell(&doc, 1, 1);
    doc.double_click(age);
    let input = inputs(&doc, age);
    assert_eq!(input.len(), 1);
    assert!(doc.has_class(input[0], "cell-editor"));
}

#[test]
fn test_focusing_another_cell_commits_the_first() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let ann = cell(&doc, 1, 0);
    let bo = cell(&doc, 2, 0);

    doc.double_click(ann);
    doc.double_click(bo);

    assert_eq!(doc.text_content(ann), "Ann");
    assert!(inputs(&doc, ann).is_empty());
    assert_eq!(inputs(&doc, bo).len(), 1);
}

#[test]
fn test_replacing_text_mid_edit_allows_a_new_edit() {
    let mut doc = people();
    let table = init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let bo = cell(&doc, 2, 0);

    doc.double_click(bo);
    table.update_table_cell(&mut doc, 2, 0, "Bea").unwrap();
    assert_eq!(doc.focused(), None);

    doc.double_click(bo);
    let input = inputs(&doc, bo);
    assert_eq!(input.len(), 1);
    assert_eq!(doc.input_value(input[0]), Some("Bea"));
}

#[test]
fn test_committed_inputs_leave_no_listeners_behind() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let bo = cell(&doc, 2, 0);

    let mut used = Vec::new();
    for _ in 0..100 {
        doc.double_click(bo);
        let input = inputs(&doc, bo)[0];
        assert_eq!(doc.listener_count(input, EventKind::Blur), 1);
        doc.blur();
        used.push(input);
    }

    let leaked = used
        .iter()
        .filter(|input| doc.listener_count(**input, EventKind::Blur) > 0)
        .count();
    assert_eq!(leaked, 0);
    assert_eq!(doc.listener_count(bo, EventKind::DoubleClick), 1);
}

#[test]
fn test_overwritten_input_is_unregistered_on_next_edit() {
    let mut doc = people();
    let table = init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let bo = cell(&doc, 2, 0);

    doc.double_click(bo);
    let stale = inputs(&doc, bo)[0];
    table.update_table_cell(&mut doc, 2, 0, "Bea").unwrap();
    doc.double_click(bo);

    assert_eq!(doc.listener_count(stale, EventKind::Blur), 0);
    let fresh = inputs(&doc, bo)[0];
    assert_eq!(doc.listener_count(fresh, EventKind::Blur), 1);
}

// ============================================================================
// Change notification
// ============================================================================

#[tokio::test]
async fn test_change_reports_pre_edit_text_as_old_and_new() {
    let mut doc = people();
    let (options, mut rx) = with_channel(InitOptions::new("#t"));
    init_editable_table(&mut doc, options).unwrap();
    let ann = cell(&doc, 1, 0);

    doc.double_click(ann);
    replace_text(&mut doc, "Zed");
    doc.blur();

    let change = rx.recv().await.unwrap();
    assert_eq!(change.old_text, "Ann");
    assert_eq!(change.new_text, "Ann");
    assert_eq!(change.draft, "Zed");
    assert_eq!(change.row_index, 1);
    assert_eq!(change.body_row_index, Some(0));
    assert_eq!(change.cell_index, 0);
    assert_eq!(change.cell, ann);
    assert_eq!(Some(change.row), doc.parent(ann));

    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_change_in_apply_mode_reports_typed_text() {
    let mut doc = people();
    let options = InitOptions::new("#t").config(EditConfig::new().commit(CommitMode::Apply));
    let (options, mut rx) = with_channel(options);
    init_editable_table(&mut doc, options).unwrap();

    doc.double_click(cell(&doc, 2, 1));
    replace_text(&mut doc, "26");
    doc.blur();

    let change = rx.recv().await.unwrap();
    assert_eq!(change.old_text, "25");
    assert_eq!(change.new_text, "26");
    assert_eq!((change.row_index, change.cell_index), (2, 1));
    assert_eq!(change.body_row_index, Some(1));
}

#[tokio::test]
async fn test_panicking_callback_does_not_break_the_table() {
    let mut doc = people();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let options = InitOptions::<Document>::new("#t").on_text_changed(move |change| {
        let tx = tx.clone();
        async move {
            if change.row_index == 1 {
                panic!("remote rejected the edit");
            }
            let _ = tx.send(change.row_index);
        }
        .boxed()
    });
    init_editable_table(&mut doc, options).unwrap();

    doc.double_click(cell(&doc, 1, 0));
    doc.blur();
    doc.double_click(cell(&doc, 2, 0));
    doc.blur();

    assert_eq!(rx.recv().await, Some(2));
    assert_eq!(doc.text_content(cell(&doc, 1, 0)), "Ann");
}

#[test]
fn test_notification_without_runtime_uses_helper_thread() {
    let mut doc = people();
    let (tx, rx) = std::sync::mpsc::channel();
    let options = InitOptions::<Document>::new("#t").on_text_changed(move |change| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(change.old_text);
        }
        .boxed()
    });
    init_editable_table(&mut doc, options).unwrap();

    doc.double_click(cell(&doc, 2, 0));
    doc.blur();

    let old = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(old, "Bo");
}

#[test]
fn test_no_callback_means_no_notification_needed() {
    let mut doc = people();
    init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    doc.double_click(cell(&doc, 2, 1));
    doc.blur();
    assert_eq!(doc.text_content(cell(&doc, 2, 1)), "25");
}

// ============================================================================
// Construction and handle
// ============================================================================

fn rows() -> Vec<RowData> {
    vec![
        json!({"Name": "Ann", "Age": "30"}).as_object().cloned().unwrap(),
        json!({"Name": "Bo", "Age": "25"}).as_object().cloned().unwrap(),
    ]
}

#[test]
fn test_init_with_data_renders_then_wires() {
    let mut doc = Document::parse_html(r#"<table id="t"><tr><td>stale</td></tr></table>"#).unwrap();
    let options = InitOptions::<Document>::new("#t")
        .data(rows())
        .on_row(|doc: &mut Document, tr, _| doc.add_class(tr, "person"))
        .on_cell(|doc: &mut Document, td, _, data| {
            if data["Name"] == "Bo" {
                doc.add_class(td, "readonly");
            }
        });
    let table = init_editable_table(&mut doc, options).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(doc.query_selector_all("tr.person").unwrap().len(), 2);

    let ann = cell(&doc, 1, 0);
    doc.double_click(ann);
    assert_eq!(inputs(&doc, ann).len(), 1);
    doc.blur();

    let bo = cell(&doc, 2, 0);
    doc.double_click(bo);
    assert!(inputs(&doc, bo).is_empty());
}

#[test]
fn test_init_on_missing_table_fails() {
    let mut doc = people();
    let err = init_editable_table(&mut doc, InitOptions::new("#nope")).unwrap_err();
    assert_eq!(err, TableError::table_not_found("#nope"));

    let err = init_editable_table(&mut doc, InitOptions::new("#nope").data(rows())).unwrap_err();
    assert!(err.is_table_missing());
}

#[test]
fn test_length_is_computed_once() {
    let mut doc = people();
    let table = init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    assert_eq!(table.len(), 2);

    table.add_row(&mut doc, &["Cy", "41"]).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.fetch_table_data(&doc).unwrap().len(), 3);
}

#[test]
fn test_handle_forwards_to_helpers() {
    let mut doc = people();
    let table = init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    assert_eq!(table.selector(), "#t");

    table.update_table_cell(&mut doc, 1, 1, "31").unwrap();
    assert_eq!(table.get_cell_value(&doc, 1, 1).unwrap(), "31");

    table.add_row(&mut doc, &["Cy", "41"]).unwrap();
    table.update_last_row_cell(&mut doc, 1, "42").unwrap();
    let outcome = table.update_row(&mut doc, 2, &["Bea"]).unwrap();
    assert!(outcome.is_complete());
    table.delete_row(&mut doc, 1).unwrap();

    let mut seen = Vec::new();
    let visited = table
        .for_each(&doc, |texts, index, _| seen.push((index, texts.join("/"))))
        .unwrap();
    assert_eq!(visited, 2);
    assert_eq!(seen, vec![(0, "Bea/25".to_string()), (1, "Cy/42".to_string())]);

    assert!(table.get_cell_value(&doc, 9, 0).is_err());
}

#[test]
fn test_rows_added_later_are_not_editable() {
    let mut doc = people();
    let table = init_editable_table(&mut doc, InitOptions::new("#t")).unwrap();
    let row = table.add_row(&mut doc, &["Cy"]).unwrap();
    let new_cell = doc.cells(row)[0];

    doc.double_click(new_cell);
    assert!(inputs(&doc, new_cell).is_empty());
}
