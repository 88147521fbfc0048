mod node;

pub use node::Element;

/// What a node in the document arena holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The document itself. Exactly one per [`crate::Document`].
    Document,
    Element(Element),
    Text(String),
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }
}
