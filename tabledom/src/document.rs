use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::element::{Element, NodeKind};
use crate::event::{Event, EventKind, Key, Modifiers};
use crate::focus::FocusState;
use crate::selector::{Selector, SelectorError};
use crate::text_input::{TextEditResult, TextInputData};

/// Handle to a node in a [`Document`].
///
/// Handles stay valid for the lifetime of the document; a removed node is
/// merely detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback invoked when an event reaches the node it was registered on.
pub type Listener = Box<dyn FnMut(&mut Document, &Event)>;

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An in-memory document: a node arena plus focus and listener state.
pub struct Document {
    nodes: Vec<Node>,
    focus: FocusState,
    listeners: HashMap<(NodeId, EventKind), Vec<Listener>>,
    // Keys whose listeners are running, and which of those were removed meanwhile
    dispatching: Vec<(NodeId, EventKind)>,
    cleared: HashSet<(NodeId, EventKind)>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("focused", &self.focus.focused())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            focus: FocusState::new(),
            listeners: HashMap::new(),
            dispatching: Vec::new(),
            cleared: HashSet::new(),
        }
    }

    /// The document node. Parsed and appended content hangs off it.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ------------------------------------------------------------------
    // Node creation and access
    // ------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert_node(NodeKind::Element(Element::new(tag)))
    }

    /// Add a pre-built element to the arena, detached.
    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.insert_node(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert_node(NodeKind::Text(text.into()))
    }

    fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(|n| n.kind.as_element())
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(|n| n.kind.as_element_mut())
    }

    /// Lower-case tag name, or None for text and document nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Parent, if it is an element (not the document node).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// All nodes below `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether the node is attached to the document.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent. Returns false if the move would create a cycle or
    /// the parent cannot hold children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.node(parent).is_none() || self.node(child).is_none() {
            log::warn!("append_child: unknown node {parent} or {child}");
            return false;
        }
        if matches!(self.kind(parent), Some(NodeKind::Text(_))) {
            log::warn!("append_child: text node {parent} cannot have children");
            return false;
        }
        if child == self.root() || self.contains(child, parent) {
            log::warn!("append_child: {child} is an ancestor of {parent}");
            return false;
        }

        if let Some(old_parent) = self.parent(child) {
            self.detach(old_parent, child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Remove `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(parent, child);
        true
    }

    /// Remove every child of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.detach(id, child);
        }
    }

    /// Remove a node from its parent, if it has one.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => false,
        }
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        // Removing the focused subtree drops focus without an event
        if let Some(focused) = self.focus.focused() {
            if self.contains(child, focused) {
                self.focus.blur();
            }
        }
        self.nodes[parent.0].children.retain(|c| *c != child);
        self.nodes[child.0].parent = None;
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| match self.kind(d) {
                    Some(NodeKind::Text(text)) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children with a single text node (none for empty text).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if let NodeKind::Text(existing) = &mut node.kind {
                *existing = text.to_string();
                return;
            }
        } else {
            return;
        }

        self.remove_children(id);
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        self.query_selector_within(self.root(), selector)
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        self.query_selector_all_within(self.root(), selector)
    }

    /// First descendant of `scope` matching the selector.
    pub fn query_selector_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|node| selector.matches(self, *node)))
    }

    /// Every descendant of `scope` matching the selector, in document order.
    pub fn query_selector_all_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect())
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|node| self.element(*node).and_then(|el| el.id.as_deref()) == Some(id))
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focused(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Move focus to `id`, blurring the previous holder first.
    pub fn focus(&mut self, id: NodeId) {
        if !self.is_element(id) || self.focus.is_focused(id) {
            return;
        }
        if let Some(previous) = self.focus.blur() {
            self.dispatch(Event::Blur { target: previous });
        }
        self.focus.focus(id);
        self.dispatch(Event::Focus { target: id });
    }

    /// Clear focus. Focus is cleared before `Blur` is dispatched, so
    /// listeners may detach the blurred node.
    pub fn blur(&mut self) {
        if let Some(previous) = self.focus.blur() {
            self.dispatch(Event::Blur { target: previous });
        }
    }

    // ------------------------------------------------------------------
    // Text inputs
    // ------------------------------------------------------------------

    pub fn input(&self, id: NodeId) -> Option<&TextInputData> {
        self.element(id).and_then(|el| el.input.as_ref())
    }

    fn input_mut(&mut self, id: NodeId) -> Option<&mut TextInputData> {
        self.element_mut(id).and_then(|el| el.input.as_mut())
    }

    pub fn input_value(&self, id: NodeId) -> Option<&str> {
        self.input(id).map(|data| data.text.as_str())
    }

    /// Set an input's value, placing the caret at the end.
    pub fn set_input_value(&mut self, id: NodeId, value: &str) -> bool {
        match self.input_mut(id) {
            Some(data) => {
                data.set_text(value);
                true
            }
            None => false,
        }
    }

    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> bool {
        match self.input_mut(id) {
            Some(data) => {
                data.set_selection_range(start, end);
                true
            }
            None => false,
        }
    }

    /// Insert text into the focused input at its caret.
    /// Returns false if no input has focus.
    pub fn type_text(&mut self, text: &str) -> bool {
        let Some(target) = self.focused() else {
            return false;
        };
        match self.input_mut(target) {
            Some(data) => {
                data.insert_str(text);
                true
            }
            None => false,
        }
    }

    /// Deliver a key press to the focused element, then apply its default
    /// editing action if that element is an input.
    pub fn press_key(&mut self, key: Key, modifiers: Modifiers) -> TextEditResult {
        let Some(target) = self.focused() else {
            return TextEditResult::Ignored;
        };
        self.dispatch(Event::Key {
            target,
            key,
            modifiers,
        });

        // A listener may have moved focus elsewhere
        if !self.focus.is_focused(target) {
            return TextEditResult::Ignored;
        }
        if matches!(key, Key::Tab | Key::Escape) && self.input(target).is_some() {
            self.blur();
            return TextEditResult::Handled;
        }
        match self.input_mut(target) {
            Some(data) => data.handle_key(key, modifiers),
            None => TextEditResult::Ignored,
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        kind: EventKind,
        listener: impl FnMut(&mut Document, &Event) + 'static,
    ) {
        self.listeners
            .entry((id, kind))
            .or_default()
            .push(Box::new(listener));
    }

    /// Unregister every `kind` listener of `id`. Safe to call from inside
    /// one of those listeners: they still finish the current dispatch but
    /// are dropped afterwards. Returns how many were removed outside of
    /// a running dispatch.
    pub fn remove_event_listeners(&mut self, id: NodeId, kind: EventKind) -> usize {
        let key = (id, kind);
        if self.dispatching.contains(&key) {
            self.cleared.insert(key);
        }
        self.listeners.remove(&key).map_or(0, |removed| removed.len())
    }

    pub fn listener_count(&self, id: NodeId, kind: EventKind) -> usize {
        self.listeners.get(&(id, kind)).map_or(0, Vec::len)
    }

    /// Dispatch an event along its propagation path. The path is fixed
    /// before any listener runs.
    pub fn dispatch(&mut self, event: Event) {
        let kind = event.kind();
        let target = event.target();
        let mut path = vec![target];
        if event.bubbles() {
            let mut current = self.parent(target);
            while let Some(node) = current {
                path.push(node);
                current = self.parent(node);
            }
        }

        log::trace!("dispatch {event:?} along {} node(s)", path.len());
        for node in path {
            let key = (node, kind);
            let Some(mut listeners) = self.listeners.remove(&key) else {
                continue;
            };
            self.dispatching.push(key);
            for listener in listeners.iter_mut() {
                listener(self, &event);
            }
            self.dispatching.pop();
            if self.cleared.remove(&key) {
                continue;
            }
            // Keep listeners registered while we were dispatching
            if let Some(added) = self.listeners.remove(&key) {
                listeners.extend(added);
            }
            self.listeners.insert(key, listeners);
        }
    }

    /// Simulate a pointer double-click on `id`.
    pub fn double_click(&mut self, id: NodeId) {
        self.dispatch(Event::DoubleClick { target: id });
    }
}
