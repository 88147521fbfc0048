use crate::event::{Key, Modifiers};

/// Data for a single text input: text content and cursor state.
///
/// Cursor and anchor are character offsets, not byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputData {
    pub text: String,
    pub cursor: usize,
    /// Anchor position for selection. When Some and != cursor, text is selected.
    pub anchor: Option<usize>,
}

impl TextInputData {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            anchor: None,
        }
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Get the selection range as (start, end) where start <= end.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.anchor.and_then(|a| {
            if a != self.cursor {
                Some(if a < self.cursor {
                    (a, self.cursor)
                } else {
                    (self.cursor, a)
                })
            } else {
                None
            }
        })
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn select_all(&mut self) {
        if !self.text.is_empty() {
            self.anchor = Some(0);
            self.cursor = self.char_count();
        }
    }

    /// Select `start..end`, clamped to the text. The caret ends up at `end`.
    pub fn set_selection_range(&mut self, start: usize, end: usize) {
        let len = self.char_count();
        let end = end.min(len);
        let start = start.min(end);
        self.anchor = (start != end).then_some(start);
        self.cursor = end;
    }

    /// Replace the value, placing the caret at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    /// Insert text at the caret, replacing the selection if any.
    pub fn insert_str(&mut self, s: &str) {
        self.delete_selection();
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_pos, s);
        self.cursor += s.chars().count();
    }

    /// Remove the selected range. Returns true if anything was selected.
    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection() else {
            self.clear_selection();
            return false;
        };
        let from = char_to_byte_index(&self.text, start);
        let to = char_to_byte_index(&self.text, end);
        self.text.replace_range(from..to, "");
        self.cursor = start;
        self.clear_selection();
        true
    }

    /// Delete character before cursor or delete selection.
    /// Returns true if text changed.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let from = char_to_byte_index(&self.text, self.cursor - 1);
        let to = char_to_byte_index(&self.text, self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor -= 1;
        true
    }

    /// Delete character after cursor or delete selection.
    /// Returns true if text changed.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.char_count() {
            return false;
        }
        let from = char_to_byte_index(&self.text, self.cursor);
        let to = char_to_byte_index(&self.text, self.cursor + 1);
        self.text.replace_range(from..to, "");
        true
    }

    /// Move cursor by delta characters.
    pub fn move_cursor(&mut self, delta: isize, extend_selection: bool) {
        let char_count = self.char_count();

        if extend_selection && self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        } else if !extend_selection {
            // Collapse to the edge of an existing selection
            if let Some((start, end)) = self.selection() {
                self.cursor = if delta < 0 { start } else { end };
                self.clear_selection();
                return;
            }
            self.clear_selection();
        }

        self.cursor = self.cursor.saturating_add_signed(delta).min(char_count);
    }

    pub fn move_to_start(&mut self, extend_selection: bool) {
        if extend_selection && self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        } else if !extend_selection {
            self.clear_selection();
        }
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self, extend_selection: bool) {
        if extend_selection && self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        } else if !extend_selection {
            self.clear_selection();
        }
        self.cursor = self.char_count();
    }

    /// Handle a key press for text editing.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> TextEditResult {
        match key {
            Key::Char('a') if modifiers.ctrl => {
                self.select_all();
                TextEditResult::Handled
            }

            Key::Char(c) if !modifiers.ctrl && !modifiers.alt => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
                TextEditResult::Changed
            }

            Key::Backspace if modifiers.none() => {
                if self.delete_back() {
                    TextEditResult::Changed
                } else {
                    TextEditResult::Handled
                }
            }

            Key::Delete if modifiers.none() => {
                if self.delete_forward() {
                    TextEditResult::Changed
                } else {
                    TextEditResult::Handled
                }
            }

            Key::Left if !modifiers.ctrl => {
                self.move_cursor(-1, modifiers.shift);
                TextEditResult::Handled
            }

            Key::Right if !modifiers.ctrl => {
                self.move_cursor(1, modifiers.shift);
                TextEditResult::Handled
            }

            Key::Home if !modifiers.ctrl => {
                self.move_to_start(modifiers.shift);
                TextEditResult::Handled
            }

            Key::End if !modifiers.ctrl => {
                self.move_to_end(modifiers.shift);
                TextEditResult::Handled
            }

            Key::Enter => TextEditResult::Submitted,

            _ => TextEditResult::Ignored,
        }
    }
}

/// Result of handling a text editing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Text was modified.
    Changed,
    /// Enter was pressed.
    Submitted,
    /// Key was handled but text didn't change (e.g., cursor movement).
    Handled,
    /// Key was not handled, should be passed through.
    Ignored,
}

/// Convert character index to byte index in a string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
