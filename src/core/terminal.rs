//! Terminal input handling.
//!
//! Lines are read either from a raw-mode line editor (interactive terminals)
//! or from any buffered reader (pipes, tests). Raw mode is only held while a
//! line is being typed, so editors and commands always start in cooked mode.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};

/// Source of input lines.
pub trait LineReader {
    /// Read one line without its terminator. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Make a line available for later recall.
    fn remember(&mut self, _line: &str) {}
}

/// Line reader over any buffered input.
#[derive(Debug)]
pub struct PlainReader<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PlainReader<R, W> {
    /// Create a reader that writes prompts to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> LineReader for PlainReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Raw-mode line editor with history recall.
///
/// Up/Down walk the history, Left/Right/Home/End move, Ctrl-U clears to the
/// start, Ctrl-C abandons the line and Ctrl-D on an empty line ends input.
#[derive(Debug, Default)]
pub struct TerminalReader {
    history: Vec<String>,
}

impl TerminalReader {
    /// Create an editor seeded with previously entered lines, oldest first.
    pub fn new(history: Vec<String>) -> Self {
        Self { history }
    }
}

/// Line being edited.
#[derive(Debug, Default)]
struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl EditBuffer {
    fn set(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

/// What a key press did to the line.
enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
    EndOfInput,
}

impl TerminalReader {
    fn apply_key(&self, key: KeyEvent, line: &mut EditBuffer, recall: &mut usize, draft: &mut String) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return KeyOutcome::Submit,
            KeyCode::Char('c') if ctrl => return KeyOutcome::Cancel,
            KeyCode::Char('d') if ctrl => {
                if line.chars.is_empty() {
                    return KeyOutcome::EndOfInput;
                }
            }
            KeyCode::Char('u') if ctrl => {
                line.chars.drain(..line.cursor);
                line.cursor = 0;
            }
            KeyCode::Char('a') if ctrl => line.cursor = 0,
            KeyCode::Char('e') if ctrl => line.cursor = line.chars.len(),
            KeyCode::Char(c) if !ctrl => {
                line.chars.insert(line.cursor, c);
                line.cursor += 1;
            }
            KeyCode::Backspace if line.cursor > 0 => {
                line.cursor -= 1;
                line.chars.remove(line.cursor);
            }
            KeyCode::Delete if line.cursor < line.chars.len() => {
                line.chars.remove(line.cursor);
            }
            KeyCode::Left => line.cursor = line.cursor.saturating_sub(1),
            KeyCode::Right => line.cursor = (line.cursor + 1).min(line.chars.len()),
            KeyCode::Home => line.cursor = 0,
            KeyCode::End => line.cursor = line.chars.len(),
            KeyCode::Up if *recall > 0 => {
                if *recall == self.history.len() {
                    *draft = line.text();
                }
                *recall -= 1;
                line.set(&self.history[*recall]);
            }
            KeyCode::Down if *recall < self.history.len() => {
                *recall += 1;
                match self.history.get(*recall) {
                    Some(entry) => line.set(entry),
                    None => line.set(draft),
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }
}

impl LineReader for TerminalReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let prompt_width = prompt.chars().count();
        let mut line = EditBuffer::default();
        let mut recall = self.history.len();
        let mut draft = String::new();

        let _guard = RawModeGuard::acquire()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.apply_key(key, &mut line, &mut recall, &mut draft) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(Some(line.text()));
                }
                KeyOutcome::Cancel => {
                    write!(stdout, "^C\r\n")?;
                    stdout.flush()?;
                    return Ok(Some(String::new()));
                }
                KeyOutcome::EndOfInput => {
                    write!(stdout, "\r\n")?;
                    stdout.flush()?;
                    return Ok(None);
                }
            }

            let column = u16::try_from(prompt_width + line.cursor).unwrap_or(u16::MAX);
            queue!(
                stdout,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(prompt),
                Print(line.text()),
                MoveToColumn(column)
            )?;
            stdout.flush()?;
        }
    }

    fn remember(&mut self, line: &str) {
        if line.trim().is_empty() || self.history.last().is_some_and(|last| last == line) {
            return;
        }
        self.history.push(line.to_string());
    }
}

/// Keeps the terminal in raw mode until dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enter raw mode.
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Restore cooked mode before the default panic output is printed.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        original_hook(panic_info);
    }));
}

/// Visible rows of the controlling terminal, if there is one.
pub fn terminal_rows() -> Option<u16> {
    if !io::stdout().is_terminal() {
        return None;
    }
    terminal::size().ok().map(|(_, rows)| rows)
}

/// Whether stdin is attached to a terminal.
pub fn stdin_is_terminal() -> bool {
    io::stdin().is_terminal()
}
