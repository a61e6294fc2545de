//! Line cursor with one line of pushback.
//!
//! Every field parser reads lines until something tells it to stop. The line
//! that stops it belongs to whoever called it, so it is handed back with
//! [`LineCursor::unread`] and comes out of the next [`LineCursor::next`].

use std::str::Lines;

/// Cursor over the lines of a document.
#[derive(Debug)]
pub struct LineCursor<'a> {
    lines: Lines<'a>,
    pushed_back: Option<&'a str>,
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    /// Create a cursor positioned before the first line.
    pub fn new(text: &'a str) -> Self {
        Self { lines: text.lines(), pushed_back: None, line_no: 0 }
    }

    /// Take the next line, the pushed back one first.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a str> {
        let line = self.pushed_back.take().or_else(|| self.lines.next())?;
        self.line_no += 1;
        Some(line)
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> Option<&'a str> {
        if self.pushed_back.is_none() {
            self.pushed_back = self.lines.next();
        }
        self.pushed_back
    }

    /// Hand back the line last returned by [`next`](Self::next).
    ///
    /// Only one line can be pending at a time.
    pub fn unread(&mut self, line: &'a str) {
        debug_assert!(self.pushed_back.is_none(), "only one line of pushback");
        self.pushed_back = Some(line);
        self.line_no = self.line_no.saturating_sub(1);
    }

    /// 1-based number of the line last returned, 0 before the first.
    pub fn line_number(&self) -> usize {
        self.line_no
    }
}
