use crate::document::NodeId;

/// Tracks which element is currently focused.
///
/// Only bookkeeping lives here; [`crate::Document`] dispatches the
/// matching `Focus`/`Blur` events around these transitions.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<NodeId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the currently focused element.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, node: NodeId) -> bool {
        self.focused == Some(node)
    }

    /// Focus an element.
    /// Returns the previously focused element if focus moved away from it.
    pub fn focus(&mut self, node: NodeId) -> Option<NodeId> {
        if self.focused == Some(node) {
            return None;
        }
        self.focused.replace(node)
    }

    /// Clear focus.
    /// Returns the element that was focused, if any.
    pub fn blur(&mut self) -> Option<NodeId> {
        self.focused.take()
    }
}
