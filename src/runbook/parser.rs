//! Runbook document compiler.
//!
//! Parses the step/suggestion specification format into the flat record
//! stream. Only the subset of YAML the format needs is understood: scalar
//! fields, `|` block literals, one level of `- ` lists and `---` separators.
//!
//! Unrecognized lines are skipped with a debug trace instead of failing the
//! whole document.

use std::path::Path;

use super::cursor::LineCursor;
use super::{CompileError, CompileResult, Record, SuggestionKind};

/// Document separator line.
const SEPARATOR: &str = "---";

/// Block indicator that keeps trailing blank lines.
const KEEP_INDICATOR: &str = "|+";

/// Parse a runbook specification from a file.
pub fn parse_runbook(path: &Path) -> CompileResult<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| CompileError::Read { path: path.to_path_buf(), source })?;
    parse_runbook_str(&content)
}

/// Parse a runbook specification from a string.
pub fn parse_runbook_str(content: &str) -> CompileResult<Vec<Record>> {
    let mut compiler = Compiler::new(content);
    compiler.run();

    let records = compiler.records;
    if !records.iter().any(|r| matches!(r, Record::Step { .. })) {
        return Err(CompileError::NoSteps);
    }

    tracing::debug!(records = records.len(), "Compiled specification");
    Ok(records)
}

/// Step being assembled.
#[derive(Debug, Default)]
struct OpenStep {
    description: String,
}

/// Suggestion fields collected so far.
#[derive(Debug, Default)]
struct SuggestionDraft {
    kind: Option<String>,
    note: Option<String>,
    cmd: Option<String>,
    content: Option<String>,
}

impl SuggestionDraft {
    fn into_record(self) -> Record {
        let kind = self.kind.as_deref().map(SuggestionKind::parse_lenient).unwrap_or_default();
        let (body, other) = match kind {
            SuggestionKind::Cmd => (self.cmd, self.content),
            SuggestionKind::Snippet => (self.content, self.cmd),
        };
        if body.is_none() && other.is_some() {
            tracing::debug!(kind = %kind, "Suggestion body given under the wrong field, ignoring it");
        }

        Record::Suggestion {
            kind,
            note: self.note.filter(|n| !n.is_empty()),
            body: body.unwrap_or_default(),
        }
    }
}

struct Compiler<'a> {
    cursor: LineCursor<'a>,
    records: Vec<Record>,
    open: Option<OpenStep>,
}

impl<'a> Compiler<'a> {
    fn new(content: &'a str) -> Self {
        Self { cursor: LineCursor::new(content), records: Vec::new(), open: None }
    }

    fn run(&mut self) {
        while let Some(line) = self.cursor.next() {
            if is_blank(line) || is_comment(line) {
                continue;
            }
            if is_separator(line) {
                self.close_step();
                continue;
            }

            let indent = indent_of(line);
            let Some((key, value)) = split_field(line.trim_start()) else {
                self.ignore(line);
                continue;
            };

            match key {
                "step" => {
                    let title = read_value(&mut self.cursor, indent, value);
                    self.open_step(title.lines().collect::<Vec<_>>().join(" "));
                }
                "desc" => {
                    let text = read_value(&mut self.cursor, indent, value);
                    match self.open.as_mut() {
                        Some(step) => step.description = text,
                        None => tracing::debug!("Ignoring description outside of a step"),
                    }
                }
                "suggestions" => self.parse_list(indent),
                "suggestion" => self.parse_single(indent),
                _ => {
                    self.ignore(line);
                    if is_block_indicator(value) {
                        read_block(&mut self.cursor, indent, value);
                    }
                }
            }
        }

        self.close_step();
    }

    /// Entries of a `suggestions:` list. Ends at the first line indented no
    /// deeper than the list key, which is left for the caller.
    fn parse_list(&mut self, list_indent: usize) {
        let mut draft: Option<SuggestionDraft> = None;

        while let Some(line) = self.cursor.next() {
            if is_blank(line) {
                continue;
            }
            let indent = indent_of(line);
            if indent <= list_indent {
                self.cursor.unread(line);
                break;
            }

            let text = line.trim_start();
            if is_comment(text) {
                continue;
            }

            if let Some(rest) = strip_dash(text) {
                if let Some(done) = draft.take() {
                    self.push_suggestion(done);
                }
                let mut next = SuggestionDraft::default();
                let field = rest.trim_start();
                if !field.is_empty() {
                    let key_indent = indent + (text.len() - field.len());
                    self.read_suggestion_field(&mut next, key_indent, field);
                }
                draft = Some(next);
            } else if let Some(current) = draft.as_mut() {
                self.read_suggestion_field(current, indent, text);
            } else {
                self.ignore(line);
            }
        }

        if let Some(done) = draft {
            self.push_suggestion(done);
        }
    }

    /// Legacy `suggestion:` block holding exactly one suggestion.
    fn parse_single(&mut self, key_indent: usize) {
        let mut draft = SuggestionDraft::default();
        let mut seen = false;

        while let Some(line) = self.cursor.next() {
            if is_blank(line) {
                continue;
            }
            let indent = indent_of(line);
            if indent <= key_indent {
                self.cursor.unread(line);
                break;
            }

            let text = line.trim_start();
            if is_comment(text) {
                continue;
            }
            let (field, field_indent) = match strip_dash(text) {
                Some(rest) => {
                    let field = rest.trim_start();
                    (field, indent + (text.len() - field.len()))
                }
                None => (text, indent),
            };
            self.read_suggestion_field(&mut draft, field_indent, field);
            seen = true;
        }

        if seen {
            self.push_suggestion(draft);
        }
    }

    fn read_suggestion_field(&mut self, draft: &mut SuggestionDraft, key_indent: usize, text: &str) {
        let Some((key, value)) = split_field(text) else {
            self.ignore(text);
            return;
        };
        let value = read_value(&mut self.cursor, key_indent, value);

        match key {
            "kind" => draft.kind = Some(value),
            "note" => draft.note = Some(value),
            "cmd" => draft.cmd = Some(value),
            "content" => draft.content = Some(value),
            _ => self.ignore(text),
        }
    }

    fn open_step(&mut self, title: String) {
        self.close_step();
        self.records.push(Record::Step { title });
        self.open = Some(OpenStep::default());
    }

    fn push_suggestion(&mut self, draft: SuggestionDraft) {
        if self.open.is_some() {
            self.records.push(draft.into_record());
        } else {
            tracing::debug!("Ignoring suggestion outside of a step");
        }
    }

    /// Flush the open step: description (if any), then the boundary.
    fn close_step(&mut self) {
        if let Some(step) = self.open.take() {
            if !step.description.is_empty() {
                self.records.push(Record::Description { text: step.description });
            }
            self.records.push(Record::EndOfStep);
        }
    }

    fn ignore(&self, line: &str) {
        tracing::debug!(line = self.cursor.line_number(), text = line, "Ignoring unrecognized line");
    }
}

/// Scalar value, or the block literal that follows when `value` is a block
/// indicator.
fn read_value(cursor: &mut LineCursor<'_>, key_indent: usize, value: &str) -> String {
    if is_block_indicator(value) {
        read_block(cursor, key_indent, value)
    } else {
        unquote(value).to_string()
    }
}

/// Capture a block literal whose key sits at `key_indent`.
///
/// The body margin is `key_indent + 1`. Blank lines are kept; trailing ones
/// are dropped unless the indicator is `|+`. The first non-blank line at or
/// above the key's indentation ends the body and is pushed back.
fn read_block(cursor: &mut LineCursor<'_>, key_indent: usize, indicator: &str) -> String {
    let margin = key_indent + 1;
    let mut body: Vec<&str> = Vec::new();

    while let Some(line) = cursor.next() {
        if is_blank(line) {
            body.push("");
            continue;
        }
        if indent_of(line) <= key_indent {
            cursor.unread(line);
            break;
        }
        body.push(strip_columns(line, margin));
    }

    if indicator != KEEP_INDICATOR {
        while body.last().is_some_and(|l| l.is_empty()) {
            body.pop();
        }
    }
    body.join("\n")
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Remove up to `columns` leading whitespace characters.
fn strip_columns(line: &str, columns: usize) -> &str {
    let mut rest = line;
    for _ in 0..columns {
        match rest.chars().next() {
            Some(c) if c.is_whitespace() => rest = &rest[c.len_utf8()..],
            _ => break,
        }
    }
    rest
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_separator(line: &str) -> bool {
    line.trim() == SEPARATOR
}

fn is_block_indicator(value: &str) -> bool {
    matches!(value, "|" | "|-" | "|+")
}

/// `- rest` list entry marker.
fn strip_dash(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('-')?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Split `key: value` where the key is a plain identifier.
fn split_field(text: &str) -> Option<(&str, &str)> {
    let (key, rest) = text.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((key, rest.trim()))
}

/// Drop the surrounding quotes of a single quoted scalar.
///
/// `"a" b "c"` is not one scalar and is kept verbatim.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() < 2 || !value.starts_with(quote) || !value.ends_with(quote) {
            continue;
        }
        let inner = &value[1..value.len() - 1];
        if has_unescaped(inner, quote) {
            return value;
        }
        return inner;
    }
    value
}

fn has_unescaped(text: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            c if c == quote && !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}
