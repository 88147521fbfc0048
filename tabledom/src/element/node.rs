use std::collections::BTreeMap;

use crate::text_input::TextInputData;

#[derive(Debug, Clone, Default)]
pub struct Element {
    // Identity
    /// Lower-case tag name.
    pub tag: String,
    pub id: Option<String>,

    // Styling hooks
    pub classes: Vec<String>,

    /// Remaining attributes, excluding `id` and `class`.
    pub attributes: BTreeMap<String, String>,

    /// Editing state, present only on `<input>` elements.
    pub input: Option<TextInputData>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into().to_ascii_lowercase();
        let input = (tag == "input").then(TextInputData::default);
        Self {
            tag,
            input,
            ..Default::default()
        }
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    // Classes
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class if it is not already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !class.is_empty() && !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Replace the class list from a whitespace-separated `class` attribute.
    pub fn set_class_attr(&mut self, value: &str) {
        self.classes.clear();
        for class in value.split_whitespace() {
            self.add_class(class);
        }
    }

    // Attributes
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Look up an attribute, including the `id` and `class` pseudo-attributes.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "class" => None,
            "value" if self.input.is_some() => self.input.as_ref().map(|i| i.text.clone()),
            _ => self.attributes.get(name).cloned(),
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match name.as_str() {
            "id" => self.id = Some(value),
            "class" => self.set_class_attr(&value),
            "value" if self.input.is_some() => {
                if let Some(input) = &mut self.input {
                    *input = TextInputData::new(value);
                }
            }
            _ => {
                self.attributes.insert(name, value);
            }
        }
    }

    pub fn is_input(&self) -> bool {
        self.input.is_some()
    }
}
