use crate::util::unicode;

/// A single text field with a byte-offset cursor kept on grapheme boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    /// A field holding `text`, cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        LineInput { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    /// Delete back to the start of the previous word
    pub fn delete_word_left(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text before and after the cursor
    pub fn split(&self) -> (&str, &str) {
        self.text.split_at(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_moving() {
        let mut input = LineInput::default();
        for c in "milk".chars() {
            input.insert_char(c);
        }
        input.home();
        input.insert_str("buy ");
        assert_eq!(input.text(), "buy milk");
        assert_eq!(input.split(), ("buy ", "milk"));
        input.end();
        input.left();
        input.backspace();
        assert_eq!(input.text(), "buy mik");
        input.delete();
        assert_eq!(input.text(), "buy mi");
    }

    #[test]
    fn graphemes_move_as_one() {
        let mut input = LineInput::new("cafe\u{0301}");
        input.left();
        assert_eq!(input.cursor(), 3);
        input.right();
        input.backspace();
        assert_eq!(input.text(), "caf");
    }

    #[test]
    fn word_delete() {
        let mut input = LineInput::new("call the plumber");
        input.delete_word_left();
        assert_eq!(input.text(), "call the ");
        input.delete_word_left();
        assert_eq!(input.text(), "call ");
        input.clear();
        assert!(input.is_empty());
        input.backspace();
        assert_eq!(input.cursor(), 0);
    }
}
