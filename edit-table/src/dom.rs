//! The document capabilities the table operations rely on.
//!
//! Every operation takes its environment explicitly, so any document model
//! can be plugged in by implementing [`TableDom`]. The required methods are
//! generic tree primitives; the HTML table model (`rows`, `insert_row`, ...)
//! is provided on top of them.

use std::fmt::Debug;
use std::hash::Hash;

/// Events the editable table subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    DoubleClick,
    Blur,
}

/// Listener registered through [`TableDom::add_listener`]. It receives the
/// environment and the node it was registered on.
pub type Listener<D> = Box<dyn FnMut(&mut D, <D as TableDom>::Node)>;

pub trait TableDom: Sized + 'static {
    /// Handle to a node. Handles must stay valid after the node is detached.
    type Node: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// First element matching `selector`, in document order.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// Every element matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    fn remove_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Remove every child of `node`.
    fn clear(&mut self, node: Self::Node);

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Element children of `node`, in order. Text nodes are skipped.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Lower-case tag name; None for non-element nodes.
    fn tag_name(&self, node: Self::Node) -> Option<String>;

    fn text_content(&self, node: Self::Node) -> String;

    fn set_text_content(&mut self, node: Self::Node, text: &str);

    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    fn add_class(&mut self, node: Self::Node, class: &str);

    fn input_value(&self, input: Self::Node) -> String;

    fn set_input_value(&mut self, input: Self::Node, value: &str);

    fn focus(&mut self, node: Self::Node);

    /// Select `start..end` (character offsets) inside an input.
    fn set_selection_range(&mut self, input: Self::Node, start: usize, end: usize);

    fn add_listener(&mut self, node: Self::Node, trigger: Trigger, listener: Listener<Self>);

    /// Unregister every `trigger` listener of `node`. May be called from
    /// inside one of those listeners.
    fn remove_listeners(&mut self, node: Self::Node, trigger: Trigger);

    // ------------------------------------------------------------------
    // Provided: tree helpers
    // ------------------------------------------------------------------

    fn is_tag(&self, node: Self::Node, tag: &str) -> bool {
        self.tag_name(node).as_deref() == Some(tag)
    }

    /// Descendant elements of `root` with the given tag, in document order.
    fn descendants_by_tag(&self, root: Self::Node, tag: &str) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.is_tag(node, tag) {
                out.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }

    fn children_by_tag(&self, node: Self::Node, tag: &str) -> Vec<Self::Node> {
        self.children(node)
            .into_iter()
            .filter(|c| self.is_tag(*c, tag))
            .collect()
    }

    // ------------------------------------------------------------------
    // Provided: HTML table model
    // ------------------------------------------------------------------

    /// The table's rows: rows of every `<thead>`, then body rows and
    /// direct `<tr>` children in tree order, then rows of every `<tfoot>`.
    fn rows(&self, table: Self::Node) -> Vec<Self::Node> {
        let children = self.children(table);
        let section = |tag: &str| -> Vec<Self::Node> {
            children
                .iter()
                .filter(|c| self.is_tag(**c, tag))
                .flat_map(|c| self.children_by_tag(*c, "tr"))
                .collect()
        };

        let mut rows = section("thead");
        for child in &children {
            match self.tag_name(*child).as_deref() {
                Some("tr") => rows.push(*child),
                Some("tbody") => rows.extend(self.children_by_tag(*child, "tr")),
                _ => {}
            }
        }
        rows.extend(section("tfoot"));
        rows
    }

    /// Rows of the first `<thead>`, or None if the table has no head.
    fn head_rows(&self, table: Self::Node) -> Option<Vec<Self::Node>> {
        self.children(table)
            .into_iter()
            .find(|c| self.is_tag(*c, "thead"))
            .map(|head| self.children_by_tag(head, "tr"))
    }

    /// `<td>` and `<th>` children of a row.
    fn cells(&self, row: Self::Node) -> Vec<Self::Node> {
        self.children(row)
            .into_iter()
            .filter(|c| self.is_tag(*c, "td") || self.is_tag(*c, "th"))
            .collect()
    }

    /// The table a row belongs to, directly or through a section element.
    fn owning_table(&self, row: Self::Node) -> Option<Self::Node> {
        let parent = self.parent(row)?;
        if self.is_tag(parent, "table") {
            return Some(parent);
        }
        match self.tag_name(parent).as_deref() {
            Some("thead" | "tbody" | "tfoot") => {
                self.parent(parent).filter(|t| self.is_tag(*t, "table"))
            }
            _ => None,
        }
    }

    /// Position of `row` in its table's [`rows`](Self::rows).
    fn row_index(&self, row: Self::Node) -> Option<usize> {
        let table = self.owning_table(row)?;
        self.rows(table).iter().position(|r| *r == row)
    }

    /// Position of `cell` among its row's cells.
    fn cell_index(&self, cell: Self::Node) -> Option<usize> {
        let row = self.parent(cell)?;
        self.cells(row).iter().position(|c| *c == cell)
    }

    /// Append a new row, following `HTMLTableElement.insertRow()`.
    fn insert_row(&mut self, table: Self::Node) -> Self::Node {
        let row = self.create_element("tr");
        let rows = self.rows(table);

        let parent = match rows.last() {
            Some(last) => self.parent(*last).unwrap_or(table),
            None => match self.children_by_tag(table, "tbody").last() {
                Some(body) => *body,
                None => {
                    let body = self.create_element("tbody");
                    self.append_child(table, body);
                    body
                }
            },
        };
        self.append_child(parent, row);
        row
    }

    /// Append a new `<td>` to a row.
    fn insert_cell(&mut self, row: Self::Node) -> Self::Node {
        let cell = self.create_element("td");
        self.append_child(row, cell);
        cell
    }

    /// Remove the row at `index` of [`rows`](Self::rows). Returns false if
    /// there is no such row.
    fn delete_row(&mut self, table: Self::Node, index: usize) -> bool {
        let Some(row) = self.rows(table).get(index).copied() else {
            return false;
        };
        match self.parent(row) {
            Some(parent) => {
                self.remove_child(parent, row);
                true
            }
            None => false,
        }
    }
}
