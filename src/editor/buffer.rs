use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text mutation at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert one character (typing)
    InsertChar(char),
    /// Insert a string, e.g. a paste
    InsertStr(String),
    /// Break the line at the cursor (Enter)
    SplitLine,
    /// Delete the character before the cursor (Backspace)
    DeleteBack,
    /// Delete the character under the cursor (Delete)
    DeleteForward,
}

/// A text buffer backed by a rope.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl EditorBuffer {
    /// Create a new buffer from a string, cursor at the origin.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// True when the buffer holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    /// Replace the whole buffer, keeping the cursor inside the new text.
    ///
    /// Returns `true` if the content actually changed.
    pub fn replace_text(&mut self, text: &str) -> bool {
        if self.rope == text {
            return false;
        }
        self.rope = Rope::from_str(text);
        let line = self.cursor.line;
        let col = self.cursor.col;
        self.move_to(line, col);
        true
    }

    /// Apply an edit at the cursor. Returns `true` if the text changed.
    pub fn apply(&mut self, edit: &Edit) -> bool {
        match edit {
            Edit::InsertChar(ch) => {
                self.insert_char(*ch);
                true
            }
            Edit::InsertStr(s) => self.insert_str(s),
            Edit::SplitLine => {
                self.split_line();
                true
            }
            Edit::DeleteBack => self.delete_back(),
            Edit::DeleteForward => self.delete_forward(),
        }
    }

    fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
    }

    fn insert_str(&mut self, s: &str) -> bool {
        if s.is_empty() {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, s);

        let lines: Vec<&str> = s.split('\n').collect();
        if lines.len() > 1 {
            self.cursor.line += lines.len() - 1;
            self.cursor.set_col(lines.last().map_or(0, |l| l.len()));
        } else {
            self.cursor.set_col(self.cursor.col + s.len());
        }
        true
    }

    fn split_line(&mut self) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
    }

    fn delete_back(&mut self) -> bool {
        let Cursor { line, col, .. } = self.cursor;
        if line == 0 && col == 0 {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        let joined_col = if col == 0 {
            self.line_len(line - 1)
        } else {
            col - self.prev_char_len()
        };
        self.rope.remove(char_idx - 1..char_idx);
        if col == 0 {
            self.cursor.line -= 1;
        }
        self.cursor.set_col(joined_col);
        true
    }

    fn delete_forward(&mut self) -> bool {
        let at_line_end = self.cursor.col >= self.line_len(self.cursor.line);
        if at_line_end && self.cursor.line + 1 >= self.line_count() {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.remove(char_idx..=char_idx);
        true
    }

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.step_left(),
            Direction::Right => self.step_right(),
            Direction::Up => self.move_lines(-1),
            Direction::Down => self.move_lines(1),
        }
    }

    /// Move the cursor by whole lines, keeping the sticky column.
    pub fn move_lines(&mut self, delta: isize) {
        let last = self.line_count().saturating_sub(1);
        let target = self.cursor.line.saturating_add_signed(delta).min(last);
        if target != self.cursor.line {
            self.cursor.line = target;
            self.cursor.col = self.snap_col(target, self.cursor.col_memory);
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Move to the start of the previous word, or to the end of the
    /// previous line from column 0.
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            self.wrap_to_previous_line();
            return;
        }
        let text = self.current_line();
        let head = text[..self.cursor.col].trim_end();
        // A run of punctuation counts as a word of its own.
        let start = head.chars().next_back().map_or(0, |last| {
            let word = is_word_char(last);
            head.char_indices()
                .rev()
                .take_while(|&(_, c)| is_word_char(c) == word && !c.is_whitespace())
                .last()
                .map_or(0, |(idx, _)| idx)
        });
        self.cursor.set_col(start);
    }

    /// Move past the current word and the gap after it, or to the next
    /// line from the end of a line.
    pub fn move_word_right(&mut self) {
        if self.cursor.col >= self.line_len(self.cursor.line) {
            self.wrap_to_next_line();
            return;
        }
        let text = self.current_line();
        let tail = &text[self.cursor.col..];
        let skip = tail
            .char_indices()
            .skip_while(|&(_, c)| is_word_char(c))
            .find(|&(_, c)| is_word_char(c))
            .map_or(tail.len(), |(idx, _)| idx);
        self.cursor.set_col(self.cursor.col + skip);
    }

    /// Move cursor to a specific line and column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        let col = self.snap_col(self.cursor.line, col);
        self.cursor.set_col(col);
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        self.cursor.line = self.line_count().saturating_sub(1);
        self.move_end();
    }

    fn current_line(&self) -> String {
        self.line_at(self.cursor.line).unwrap_or_default()
    }

    /// Largest char boundary in `line` at or before byte `col`.
    fn snap_col(&self, line: usize, col: usize) -> usize {
        let text = self.line_at(line).unwrap_or_default();
        let mut col = col.min(text.len());
        while !text.is_char_boundary(col) {
            col -= 1;
        }
        col
    }

    fn prev_char_len(&self) -> usize {
        self.current_line()[..self.cursor.col]
            .chars()
            .next_back()
            .map_or(1, char::len_utf8)
    }

    fn cursor_char_idx(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.line);
        let text = self.current_line();
        line_start + text[..self.cursor.col.min(text.len())].chars().count()
    }

    fn wrap_to_previous_line(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.move_end();
        }
    }

    fn wrap_to_next_line(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn step_left(&mut self) {
        if self.cursor.col == 0 {
            self.wrap_to_previous_line();
        } else {
            self.cursor.set_col(self.cursor.col - self.prev_char_len());
        }
    }

    fn step_right(&mut self) {
        let text = self.current_line();
        match text[self.cursor.col.min(text.len())..].chars().next() {
            Some(ch) => self.cursor.set_col(self.cursor.col + ch.len_utf8()),
            None => self.wrap_to_next_line(),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("rope", &format_args!("Rope({} lines)", self.rope.len_lines()))
            .field("cursor", &self.cursor)
            .finish()
    }
}
