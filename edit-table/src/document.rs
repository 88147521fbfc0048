//! [`TableDom`] for the in-memory [`tabledom::Document`].

use tabledom::{Document, EventKind, NodeId};

use crate::dom::{Listener, TableDom, Trigger};

impl TableDom for Document {
    type Node = NodeId;

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        Document::query_selector(self, selector).unwrap_or_else(|e| {
            log::warn!("invalid selector {selector:?}: {e}");
            None
        })
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        Document::query_selector_all(self, selector).unwrap_or_else(|e| {
            log::warn!("invalid selector {selector:?}: {e}");
            Vec::new()
        })
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        Document::create_element(self, tag)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Document::append_child(self, parent, child);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        Document::remove_child(self, parent, child);
    }

    fn clear(&mut self, node: NodeId) {
        self.remove_children(node);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.element_children(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tag(node).map(str::to_string)
    }

    fn text_content(&self, node: NodeId) -> String {
        Document::text_content(self, node)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        Document::set_text_content(self, node, text);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.add_class(class);
        }
    }

    fn input_value(&self, input: NodeId) -> String {
        Document::input_value(self, input)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn set_input_value(&mut self, input: NodeId, value: &str) {
        Document::set_input_value(self, input, value);
    }

    fn focus(&mut self, node: NodeId) {
        Document::focus(self, node);
    }

    fn set_selection_range(&mut self, input: NodeId, start: usize, end: usize) {
        Document::set_selection_range(self, input, start, end);
    }

    fn add_listener(&mut self, node: NodeId, trigger: Trigger, mut listener: Listener<Self>) {
        self.add_event_listener(node, event_kind(trigger), move |doc, _event| {
            listener(doc, node)
        });
    }

    fn remove_listeners(&mut self, node: NodeId, trigger: Trigger) {
        self.remove_event_listeners(node, event_kind(trigger));
    }
}

fn event_kind(trigger: Trigger) -> EventKind {
    match trigger {
        Trigger::DoubleClick => EventKind::DoubleClick,
        Trigger::Blur => EventKind::Blur,
    }
}
