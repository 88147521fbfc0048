//! The double-click / blur edit session wired onto each cell.

use std::any::Any;
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::config::{CommitMode, EditConfig};
use crate::crud::header_row_count;
use crate::dom::{TableDom, Trigger};

/// Reported after every committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange<N> {
    /// Table row index of the edited row, header rows included. This is
    /// the index [`crate::get_cell_value`] and friends take.
    pub row_index: usize,
    /// Index counted from the first row after the header section, as
    /// [`crate::for_each_row_in_table`] reports it. None for header rows.
    pub body_row_index: Option<usize>,
    pub cell_index: usize,
    /// Text the cell shows after the commit.
    pub new_text: String,
    /// Text the cell showed before the edit.
    pub old_text: String,
    /// What the input held when it lost focus.
    pub draft: String,
    pub cell: N,
    pub row: N,
}

/// Async change callback. Its future is spawned, never awaited.
pub type OnTextChanged<N> = Rc<dyn Fn(TextChange<N>) -> BoxFuture<'static, ()>>;

/// Edit state of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState<N> {
    /// Showing its text.
    Display,
    /// Showing an input. `original` is the text captured on entry.
    Editing { original: String, input: N },
}

/// Delivers change notifications without blocking the caller.
pub(crate) struct Notifier<N> {
    callback: OnTextChanged<N>,
    runtime: Option<Handle>,
}

impl<N: Send + 'static> Notifier<N> {
    /// Bind to the tokio runtime current at construction, if any.
    pub(crate) fn new(callback: OnTextChanged<N>) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            log::debug!("no tokio runtime; change notifications run on helper threads");
        }
        Self { callback, runtime }
    }

    pub(crate) fn notify(&self, change: TextChange<N>) {
        let future = (self.callback)(change);
        let guarded = async move {
            if let Err(panic) = AssertUnwindSafe(future).catch_unwind().await {
                log::error!(
                    "change notification panicked: {}",
                    extract_panic_message(&panic)
                );
            }
        };

        match &self.runtime {
            Some(handle) => {
                handle.spawn(guarded);
            }
            None => {
                std::thread::spawn(move || futures::executor::block_on(guarded));
            }
        }
    }
}

/// Extract a human-readable message from a panic payload.
fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// State shared by every cell of one editable table.
pub(crate) struct EditContext<N> {
    pub(crate) config: EditConfig,
    pub(crate) notifier: Option<Notifier<N>>,
}

/// Make a cell editable on double-click.
pub(crate) fn wire_cell<D: TableDom>(dom: &mut D, cell: D::Node, ctx: Rc<EditContext<D::Node>>) {
    let state = Rc::new(RefCell::new(EditState::Display));
    dom.add_listener(
        cell,
        Trigger::DoubleClick,
        Box::new(move |dom: &mut D, cell: D::Node| {
            begin_edit(dom, cell, &state, &ctx)
        }),
    );
}

fn begin_edit<D: TableDom>(
    dom: &mut D,
    cell: D::Node,
    state: &Rc<RefCell<EditState<D::Node>>>,
    ctx: &Rc<EditContext<D::Node>>,
) {
    let stale = match &*state.borrow() {
        EditState::Editing { input, .. } if dom.parent(*input) == Some(cell) => {
            log::trace!("cell {cell:?} is already being edited");
            return;
        }
        EditState::Editing { input, .. } => Some(*input),
        EditState::Display => None,
    };
    if let Some(stale) = stale {
        // Cell text was replaced from outside while editing
        log::debug!("input of cell {cell:?} went away; starting a fresh edit");
        dom.remove_listeners(stale, Trigger::Blur);
    }

    let original = dom.text_content(cell);
    dom.set_text_content(cell, "");

    let input = dom.create_element("input");
    if let Some(class) = &ctx.config.input_class {
        dom.add_class(input, class);
    }
    dom.set_input_value(input, &original);
    dom.append_child(cell, input);

    let end = original.chars().count();
    *state.borrow_mut() = EditState::Editing {
        original,
        input,
    };

    let blur_state = Rc::clone(state);
    let blur_ctx = Rc::clone(ctx);
    dom.add_listener(
        input,
        Trigger::Blur,
        Box::new(move |dom: &mut D, input: D::Node| {
            commit_edit(dom, cell, input, &blur_state, &blur_ctx)
        }),
    );

    dom.focus(input);
    dom.set_selection_range(input, end, end);
    log::debug!("editing cell {cell:?}");
}

fn commit_edit<D: TableDom>(
    dom: &mut D,
    cell: D::Node,
    input: D::Node,
    state: &Rc<RefCell<EditState<D::Node>>>,
    ctx: &Rc<EditContext<D::Node>>,
) {
    let original = match &*state.borrow() {
        EditState::Editing {
            original,
            input: active,
        } if *active == input => original.clone(),
        _ => {
            log::trace!("ignoring blur from a stale input of cell {cell:?}");
            return;
        }
    };

    let draft = dom.input_value(input);
    let row = dom.parent(cell);
    let cell_index = dom.cell_index(cell);
    let row_index = row.and_then(|row| dom.row_index(row));
    let body_row_index = row
        .and_then(|row| dom.owning_table(row))
        .zip(row_index)
        .and_then(|(table, index)| index.checked_sub(header_row_count(dom, table)));

    dom.remove_listeners(input, Trigger::Blur);
    dom.remove_child(cell, input);

    let new_text = match ctx.config.commit {
        CommitMode::Restore => original.clone(),
        CommitMode::Apply => draft.clone(),
    };
    dom.set_text_content(cell, &new_text);
    *state.borrow_mut() = EditState::Display;
    log::debug!("committed cell {cell:?} at row {row_index:?}, column {cell_index:?}");

    let Some(notifier) = &ctx.notifier else {
        return;
    };
    match (row, row_index, cell_index) {
        (Some(row), Some(row_index), Some(cell_index)) => notifier.notify(TextChange {
            row_index,
            body_row_index,
            cell_index,
            new_text,
            old_text: original,
            draft,
            cell,
            row,
        }),
        _ => log::warn!("cell {cell:?} is no longer in a table; change not reported"),
    }
}
