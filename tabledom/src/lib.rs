pub mod document;
pub mod element;
pub mod event;
pub mod focus;
pub mod html;
pub mod selector;
pub mod text_input;

pub use document::{Document, Listener, NodeId};
pub use element::{Element, NodeKind};
pub use event::{Event, EventKind, Key, Modifiers};
pub use focus::FocusState;
pub use html::HtmlError;
pub use selector::{Selector, SelectorError};
pub use text_input::{TextEditResult, TextInputData};
