//! The interactive walkthrough session.
//!
//! A session enters a step (header, flow overview, acknowledgement, first
//! page of suggestions) and then prompts until a command moves it elsewhere.
//! Every handler works on the one [`SessionState`] and returns a
//! [`Transition`] telling the outer loop where to go next.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::scratch::{command_buffer, extract_snippet, snippet_buffer, strip_comments, write_scratch};
use super::{Action, Pager, PasteMode, Renderer, SnippetCommand, SnippetStash, UserCommandError};
use crate::core::{Config, HistoryManager, LineReader, ProcessRunner};
use crate::runbook::{Runbook, SuggestionKind};

/// History file inside a walkthrough's state directory.
pub const HISTORY_FILE: &str = "history.json";

/// Snippet stash inside a walkthrough's state directory.
pub const SNIPPET_FILE: &str = "snippet.txt";

/// Position of the user in the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// 1-based index of the current step
    pub current_step: usize,
    /// 1-based page of the current step's suggestions
    pub current_page: usize,
}

impl SessionState {
    pub fn new(step: usize) -> Self {
        Self { current_step: step, current_page: 1 }
    }

    fn enter(&mut self, step: usize) {
        self.current_step = step;
        self.current_page = 1;
    }
}

/// Where the session goes after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Keep prompting on the current step
    Stay,
    /// Enter the given step
    Enter(usize),
    /// Leave the prompt loop; the outer loop picks the step to enter
    Exit,
    Finish,
    Complete,
    Quit,
    /// Input ended
    Closed,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Finished, with or without pending steps
    Completed,
    /// The user quit
    Quit,
    /// Input ended at a prompt
    InputClosed,
}

/// Persistent state and scratch location of one walkthrough.
#[derive(Debug)]
pub struct SessionStore {
    pub stash: SnippetStash,
    pub history: HistoryManager,
    pub scratch_dir: PathBuf,
}

impl SessionStore {
    /// Store for the walkthrough called `identity`, located by `config`.
    pub fn open(config: &Config, identity: &str) -> Self {
        let state_dir = config.state_dir_for(identity);
        tracing::debug!(state_dir = ?state_dir, "Opening walkthrough state");
        Self {
            stash: SnippetStash::new(state_dir.join(SNIPPET_FILE)),
            history: HistoryManager::with_path(state_dir.join(HISTORY_FILE), config.general.max_history),
            scratch_dir: config.scratch_dir(),
        }
    }

    /// Store with everything kept under `dir`.
    pub fn in_dir(dir: &Path, max_history: usize) -> Self {
        Self {
            stash: SnippetStash::new(dir.join(SNIPPET_FILE)),
            history: HistoryManager::with_path(dir.join(HISTORY_FILE), max_history),
            scratch_dir: dir.join("scratch"),
        }
    }
}

/// Drives one interactive session over a runbook.
pub struct Walkthrough<'a> {
    runbook: Runbook,
    store: SessionStore,
    reader: &'a mut dyn LineReader,
    runner: &'a mut dyn ProcessRunner,
    out: &'a mut dyn Write,
    pager: Pager,
    renderer: Renderer,
    start_step: usize,
}

impl<'a> Walkthrough<'a> {
    pub fn new(
        runbook: Runbook,
        store: SessionStore,
        reader: &'a mut dyn LineReader,
        runner: &'a mut dyn ProcessRunner,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            runbook,
            store,
            reader,
            runner,
            out,
            pager: Pager::from_settings(None, None),
            renderer: Renderer::new(false),
            start_step: 1,
        }
    }

    pub fn with_pager(mut self, pager: Pager) -> Self {
        self.pager = pager;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Start at `step` instead of the first step.
    pub fn starting_at(mut self, step: usize) -> Self {
        self.start_step = step;
        self
    }

    /// The runbook, with step statuses as updated by the session.
    pub fn runbook(&self) -> &Runbook {
        &self.runbook
    }

    /// Run until the user finishes or quits, or input ends.
    pub fn run(&mut self) -> anyhow::Result<SessionEnd> {
        let start = self.start_step.clamp(1, self.runbook.step_count().max(1));
        let mut state = SessionState::new(start);
        let mut transition = Transition::Enter(start);

        loop {
            transition = match transition {
                Transition::Enter(index) => self.enter_step(&mut state, index)?,
                Transition::Stay => self.prompt_loop(&mut state)?,
                Transition::Exit => self.after_exit(&state),
                Transition::Finish => self.finishing(&state)?,
                Transition::Complete => break Ok(SessionEnd::Completed),
                Transition::Quit => break Ok(SessionEnd::Quit),
                Transition::Closed => break Ok(SessionEnd::InputClosed),
            };
        }
    }

    fn enter_step(&mut self, state: &mut SessionState, index: usize) -> anyhow::Result<Transition> {
        state.enter(index);
        tracing::debug!(step = index, "Entering step");

        if let Some(step) = self.runbook.step(index) {
            self.renderer.step_header(self.out, index, self.runbook.step_count(), step)?;
        }
        writeln!(self.out)?;
        self.renderer.flow(self.out, &self.runbook, index)?;

        if self.ask("Press Enter to continue... ")?.is_none() {
            return Ok(Transition::Closed);
        }

        self.show_suggestions(state)?;
        self.renderer.hint(self.out)?;
        Ok(Transition::Stay)
    }

    fn prompt_loop(&mut self, state: &mut SessionState) -> anyhow::Result<Transition> {
        loop {
            let prompt = format!("[{}/{}]> ", state.current_step, self.runbook.step_count());
            let Some(line) = self.ask(&prompt)? else {
                return Ok(Transition::Closed);
            };
            self.reader.remember(&line);

            let action = match Action::normalize(&line) {
                Ok(action) => action,
                Err(e) => {
                    self.renderer.error(self.out, &e.to_string())?;
                    continue;
                }
            };

            match self.dispatch(state, action) {
                Ok(Transition::Stay) => {}
                Ok(transition) => return Ok(transition),
                Err(e) => self.report(&e)?,
            }
        }
    }

    fn dispatch(&mut self, state: &mut SessionState, action: Action) -> anyhow::Result<Transition> {
        let total_steps = self.runbook.step_count();
        let total_suggestions = self.runbook.suggestions_of(state.current_step).len();

        match action {
            Action::Nothing => {}
            Action::Home => {
                state.current_page = 1;
                if let Some(step) = self.runbook.step(state.current_step) {
                    self.renderer.step_header(self.out, state.current_step, total_steps, step)?;
                }
                self.show_suggestions(state)?;
            }
            Action::ShowSuggestions => self.show_suggestions(state)?,
            Action::Flow => self.renderer.flow(self.out, &self.runbook, state.current_step)?,
            Action::Help => self.renderer.help(self.out)?,
            Action::Pick(number) => {
                if number == 0 || number > total_suggestions {
                    return Err(UserCommandError::InvalidPick { number, max: total_suggestions }.into());
                }
                return self.pick(state, number - 1);
            }
            Action::NextStep => {
                self.runbook.mark_done(state.current_step);
                if state.current_step >= total_steps {
                    return Ok(Transition::Finish);
                }
                return Ok(Transition::Enter(state.current_step + 1));
            }
            Action::GotoStep(number) => {
                if number == 0 || number > total_steps {
                    return Err(UserCommandError::InvalidStep { number, max: total_steps }.into());
                }
                return Ok(Transition::Enter(number));
            }
            Action::NextPage => {
                let page = state.current_page + 1;
                self.turn_page(state, page, total_suggestions)?;
            }
            Action::PrevPage => {
                let page = state.current_page.saturating_sub(1);
                self.turn_page(state, page, total_suggestions)?;
            }
            Action::Page(number) => self.turn_page(state, number, total_suggestions)?,
            Action::Finish => return Ok(Transition::Finish),
            Action::Quit => return Ok(Transition::Quit),
            Action::Exit => return Ok(Transition::Exit),
            Action::Snippet(command) => return self.snippet(command),
            Action::Shell(command) => self.execute(state, &command)?,
        }
        Ok(Transition::Stay)
    }

    fn turn_page(&mut self, state: &mut SessionState, page: usize, total: usize) -> io::Result<()> {
        state.current_page = self.pager.clamp(page, total);
        self.show_suggestions(state)
    }

    fn show_suggestions(&mut self, state: &SessionState) -> io::Result<()> {
        self.renderer.suggestions(self.out, &self.runbook, state.current_step, &self.pager, state.current_page)
    }

    /// Edit then run (or stash) the suggestion at `offset` of the current step.
    fn pick(&mut self, state: &SessionState, offset: usize) -> anyhow::Result<Transition> {
        let index = state.current_step;
        let (Some(step), Some(suggestion)) =
            (self.runbook.step(index).cloned(), self.runbook.suggestions_of(index).get(offset).cloned())
        else {
            return Ok(Transition::Stay);
        };

        match suggestion.kind {
            SuggestionKind::Cmd => {
                let buffer = command_buffer(index, &step, &suggestion);
                let Some(edited) = self.edit_scratch(".sh", &buffer)? else {
                    self.renderer.notice(self.out, "Nothing was run.")?;
                    return Ok(Transition::Stay);
                };
                let command = strip_comments(&edited);
                if command.is_empty() {
                    self.renderer.notice(self.out, "Nothing to run.")?;
                } else {
                    self.execute(state, &command)?;
                }
            }
            SuggestionKind::Snippet => {
                let buffer = snippet_buffer(index, &step, &suggestion);
                let Some(edited) = self.edit_scratch(".txt", &buffer)? else {
                    self.renderer.notice(self.out, "The snippet stash was left unchanged.")?;
                    return Ok(Transition::Stay);
                };
                let snippet = extract_snippet(&edited).ok_or(UserCommandError::MissingMarkers)?;
                self.store.stash.replace(&snippet)?;
                self.renderer.notice(
                    self.out,
                    "Snippet stashed. Use ':snippet paste <file>' or ':snippet open <file>' to use it.",
                )?;
            }
        }
        Ok(Transition::Stay)
    }

    /// Open `contents` in the editor and return what was saved, or `None`
    /// when the editor failed.
    fn edit_scratch(&mut self, suffix: &str, contents: &str) -> anyhow::Result<Option<String>> {
        let file = write_scratch(&self.store.scratch_dir, suffix, contents)?;
        if !self.open_editor(file.path())? {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(file.path())?))
    }

    /// Run the editor on `path`, reporting a failed exit.
    fn open_editor(&mut self, path: &Path) -> anyhow::Result<bool> {
        self.out.flush()?;
        let result = self.runner.open_editor(path)?;
        if !result.success() {
            self.renderer.warning(self.out, &format!("Editor exited with {} ({})", result.code, result.outcome()))?;
        }
        Ok(result.success())
    }

    fn execute(&mut self, state: &SessionState, command: &str) -> anyhow::Result<()> {
        self.out.flush()?;
        tracing::info!(step = state.current_step, command, "Running command");
        let result = self.runner.run_command(command)?;

        self.store.history.record(command, Some(state.current_step));
        if let Err(e) = self.store.history.save() {
            self.renderer.warning(self.out, &format!("Could not save history: {e:#}"))?;
        }

        self.renderer.outcome(self.out, &result)?;
        Ok(())
    }

    fn snippet(&mut self, command: SnippetCommand) -> anyhow::Result<Transition> {
        match command {
            SnippetCommand::Show => {
                let content = self.store.stash.read()?;
                if content.is_empty() {
                    self.renderer.notice(self.out, "The snippet stash is empty.")?;
                } else {
                    writeln!(self.out, "{}", content.trim_end_matches('\n'))?;
                }
            }
            SnippetCommand::Edit => {
                self.store.stash.touch()?;
                let path = self.store.stash.path().to_path_buf();
                self.open_editor(&path)?;
            }
            SnippetCommand::Clear => {
                self.store.stash.clear()?;
                self.renderer.notice(self.out, "Snippet stash cleared.")?;
            }
            SnippetCommand::Paste { file, mode } => self.paste(&file, mode)?,
            SnippetCommand::Open { file } => {
                if !self.store.stash.is_empty()? {
                    let prompt = format!("Put the snippet into {}? [a]ppend, [o]verwrite, [s]kip: ", file.display());
                    let Some(answer) = self.ask(&prompt)? else {
                        return Ok(Transition::Closed);
                    };
                    match answer.trim().to_ascii_lowercase().as_str() {
                        "a" | "append" => self.paste(&file, PasteMode::Append)?,
                        "o" | "overwrite" => self.paste(&file, PasteMode::Overwrite)?,
                        _ => {}
                    }
                }
                self.open_editor(&file)?;
            }
        }
        Ok(Transition::Stay)
    }

    fn paste(&mut self, file: &Path, mode: PasteMode) -> anyhow::Result<()> {
        self.store.stash.paste_into(file, mode)?;
        self.renderer.notice(self.out, &format!("Snippet pasted into {} ({mode}).", file.display()))?;
        Ok(())
    }

    fn after_exit(&self, state: &SessionState) -> Transition {
        let current = state.current_step;
        match self.runbook.step(current) {
            Some(step) if !step.is_done() => Transition::Enter(current),
            _ if current < self.runbook.step_count() => Transition::Enter(current + 1),
            _ => Transition::Finish,
        }
    }

    /// Confirm finishing from the current step. The current step only
    /// counts as done once the session actually completes.
    fn finishing(&mut self, state: &SessionState) -> anyhow::Result<Transition> {
        let current = state.current_step;
        let pending: Vec<usize> = self.runbook.pending_steps().into_iter().filter(|&i| i != current).collect();
        if pending.is_empty() {
            self.renderer.notice(self.out, "All steps done.")?;
            return Ok(self.complete(current));
        }

        self.renderer.notice(self.out, "Steps not done yet:")?;
        for index in &pending {
            if let Some(step) = self.runbook.step(*index) {
                writeln!(self.out, "  {index}. {}", step.title)?;
            }
        }

        let Some(answer) = self.ask("Finish anyway? [y/N] ")? else {
            return Ok(Transition::Closed);
        };
        if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            return Ok(self.complete(current));
        }

        let total = self.runbook.step_count();
        let Some(answer) = self.ask(&format!("Jump to step [1-{total}], Enter to cancel: "))? else {
            return Ok(Transition::Closed);
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(Transition::Stay);
        }

        match answer.parse::<usize>() {
            Ok(number) if (1..=total).contains(&number) => Ok(Transition::Enter(number)),
            Ok(number) => {
                self.renderer.error(self.out, &UserCommandError::InvalidStep { number, max: total }.to_string())?;
                Ok(Transition::Stay)
            }
            Err(_) => {
                let error = UserCommandError::InvalidNumber { value: answer.to_string() };
                self.renderer.error(self.out, &error.to_string())?;
                Ok(Transition::Stay)
            }
        }
    }

    fn complete(&mut self, current: usize) -> Transition {
        self.runbook.mark_done(current);
        Transition::Complete
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.out.flush()?;
        self.reader.read_line(prompt)
    }

    fn report(&mut self, error: &anyhow::Error) -> io::Result<()> {
        if let Some(user_error) = error.downcast_ref::<UserCommandError>() {
            return self.renderer.error(self.out, &user_error.to_string());
        }
        tracing::debug!(error = %format!("{error:#}"), "Command failed");
        self.renderer.warning(self.out, &format!("{error:#}"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Sink};

    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::core::{ExecutionResult, PlainReader};
    use crate::runbook::{compile_str, StepStatus};

    /// Runner that records what it was asked to do and returns canned codes.
    #[derive(Default)]
    struct FakeRunner {
        commands: Vec<String>,
        edited: Vec<PathBuf>,
        command_code: i32,
        editor_code: i32,
        edit: Option<fn(&str) -> String>,
    }

    impl ProcessRunner for FakeRunner {
        fn run_command(&mut self, command: &str) -> anyhow::Result<ExecutionResult> {
            self.commands.push(command.to_string());
            Ok(ExecutionResult::from_code(self.command_code))
        }

        fn open_editor(&mut self, path: &Path) -> anyhow::Result<ExecutionResult> {
            self.edited.push(path.to_path_buf());
            if let Some(edit) = self.edit {
                let content = fs::read_to_string(path).unwrap_or_default();
                fs::write(path, edit(&content))?;
            }
            Ok(ExecutionResult::from_code(self.editor_code))
        }
    }

    struct Played {
        end: SessionEnd,
        output: String,
        statuses: Vec<StepStatus>,
    }

    fn play(spec: &str, script: &str, runner: &mut FakeRunner, dir: &TempDir) -> Played {
        let runbook = compile_str(spec).unwrap();
        let mut reader: PlainReader<Cursor<String>, Sink> =
            PlainReader::new(Cursor::new(script.to_string()), io::sink());
        let mut out = Vec::new();

        let (end, statuses) = {
            let mut session = Walkthrough::new(
                runbook,
                SessionStore::in_dir(dir.path(), 100),
                &mut reader,
                runner,
                &mut out,
            )
            .with_pager(Pager::new(5));
            let end = session.run().unwrap();
            (end, session.runbook().steps.iter().map(|s| s.status).collect())
        };

        Played { end, output: String::from_utf8(out).unwrap(), statuses }
    }

    const TWO_STEPS: &str = "step: Greet\nsuggestions:\n  - cmd: echo hi\n---\nstep: Relax\n";

    const THREE_STEPS: &str = "step: A\n---\nstep: B\n---\nstep: C\n";

    #[test]
    fn test_two_step_walkthrough() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(TWO_STEPS, "\n1\nns\n\nfinish\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert_eq!(runner.commands, vec!["echo hi"]);
        assert!(outcome.output.contains("exit code 0 (ok)"));
        assert!(outcome.output.contains("== Step 2/2: Relax =="));
        assert!(outcome.output.contains("(none defined)"));
        assert!(outcome.output.contains("All steps done."));
        assert!(!outcome.output.contains("Steps not done yet"));
        assert_eq!(outcome.statuses, vec![StepStatus::Done, StepStatus::Done]);
    }

    #[test]
    fn test_executed_commands_reach_history() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner { command_code: 2, ..FakeRunner::default() };
        let outcome = play(TWO_STEPS, "\n1\nls -la\nq\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Quit);
        assert!(outcome.output.contains("exit code 2 (error)"));

        let history = HistoryManager::with_path(dir.path().join(HISTORY_FILE), 100);
        assert_eq!(history.commands(), vec!["echo hi", "ls -la"]);
        assert_eq!(history.entries().next().and_then(|e| e.step), Some(1));
    }

    #[test]
    fn test_finish_lists_pending_and_confirms() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(THREE_STEPS, "\nns\n\ng 1\n\nfinish\ny\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Completed);
        assert!(outcome.output.contains("Steps not done yet:\n  2. B\n  3. C\n"));
        assert_eq!(outcome.statuses, vec![StepStatus::Done, StepStatus::Todo, StepStatus::Todo]);
    }

    #[test]
    fn test_finish_declined_jumps_or_cancels() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(THREE_STEPS, "\nfinish\nn\n3\n\nfinish\n\n\nq\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Quit);
        assert!(outcome.output.contains("== Step 3/3: C =="));
        assert!(outcome.output.contains("Steps not done yet:\n  1. A\n  2. B\n"));
        assert_eq!(outcome.output.matches("Steps not done yet:").count(), 2);
        assert_eq!(outcome.statuses, vec![StepStatus::Todo; 3]);
    }

    #[test]
    fn test_cancelled_finish_leaves_step_todo() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(THREE_STEPS, "\nfinish\nn\n\nflow\nq\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Quit);
        assert_eq!(outcome.statuses, vec![StepStatus::Todo; 3]);
        assert_eq!(outcome.output.matches("> [ ] 1. A").count(), 2);
        assert!(!outcome.output.contains("[x]"));
    }

    #[test]
    fn test_flow_shows_progress() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(THREE_STEPS, "\nns\n\nflow\nq\n", &mut runner, &dir);

        assert_eq!(outcome.output.matches("  [x] 1. A\n> [ ] 2. B\n  [ ] 3. C\n").count(), 2);
        assert_eq!(outcome.statuses, vec![StepStatus::Done, StepStatus::Todo, StepStatus::Todo]);
    }

    #[test]
    fn test_home_resets_page() {
        let mut spec = String::from("step: Many\nsuggestions:\n");
        for i in 1..=7 {
            spec.push_str(&format!("  - cmd: echo {i}\n"));
        }
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(&spec, "\nnp\nh\nq\n", &mut runner, &dir);

        assert_eq!(outcome.output.matches("== Step 1/1: Many ==").count(), 2);
        assert_eq!(outcome.output.matches("(page 1/2)").count(), 2);
        let second_page = outcome.output.find("(page 2/2)").unwrap();
        assert!(outcome.output.rfind("(page 1/2)").unwrap() > second_page);
        assert!(outcome.output.rfind("== Step 1/1: Many ==").unwrap() > second_page);
    }

    #[test]
    fn test_snippet_edit_keeps_existing_stash() {
        let dir = tempdir().unwrap();
        let stash = dir.path().join(SNIPPET_FILE);
        SnippetStash::new(stash.clone()).replace("kept").unwrap();

        let mut runner = FakeRunner { edit: Some(|text| format!("{text}\nmore")), ..FakeRunner::default() };
        play(TWO_STEPS, "\n:snippet edit\nq\n", &mut runner, &dir);

        assert_eq!(runner.edited, vec![stash.clone()]);
        assert_eq!(fs::read_to_string(&stash).unwrap(), "kept\nmore");
    }

    #[test]
    fn test_finish_with_out_of_range_jump_cancels() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(THREE_STEPS, "\nfinish\nn\n7\nq\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Quit);
        assert!(outcome.output.contains("error: No step 7 (valid: 1-3)"));
        assert_eq!(outcome.output.matches("== Step").count(), 1);
    }

    #[test]
    fn test_paging_clamps() {
        let mut spec = String::from("step: Many\nsuggestions:\n");
        for i in 1..=7 {
            spec.push_str(&format!("  - cmd: echo {i}\n"));
        }
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(&spec, "\nnp\nnp\npage 9\npp\npp\nq\n", &mut runner, &dir);

        assert_eq!(outcome.output.matches("(page 2/2)").count(), 3);
        assert_eq!(outcome.output.matches("(page 1/2)").count(), 3);
        assert!(!outcome.output.contains("(page 3"));
    }

    #[test]
    fn test_snippet_pick_and_paste() {
        let spec = "step: Env\nsuggestions:\n  - kind: snippet\n    content: X\n";
        let dir = tempdir().unwrap();
        let target = dir.path().join("f.txt");
        fs::write(&target, "old").unwrap();

        let script = format!(
            "\n1\n:snippet paste {0} overwrite\n:snippet paste {0}\n:snippet show\nq\n",
            target.display()
        );
        let mut runner = FakeRunner::default();
        let outcome = play(spec, &script, &mut runner, &dir);

        assert_eq!(fs::read_to_string(&target).unwrap(), "XX");
        assert_eq!(fs::read_to_string(dir.path().join(SNIPPET_FILE)).unwrap(), "X");
        assert!(outcome.output.contains("Snippet stashed."));
        assert!(outcome.output.contains("\nX\n"));
        assert!(runner.commands.is_empty());
    }

    #[test]
    fn test_snippet_with_removed_markers_keeps_stash() {
        let spec = "step: Env\nsuggestions:\n  - kind: snippet\n    content: X\n";
        let dir = tempdir().unwrap();
        SnippetStash::new(dir.path().join(SNIPPET_FILE)).replace("kept").unwrap();

        let mut runner = FakeRunner { edit: Some(|_| "gone\n".to_string()), ..FakeRunner::default() };
        let outcome = play(spec, "\n1\nq\n", &mut runner, &dir);

        assert!(outcome.output.contains("error: Snippet markers were removed"));
        assert_eq!(fs::read_to_string(dir.path().join(SNIPPET_FILE)).unwrap(), "kept");
    }

    #[test]
    fn test_paste_with_empty_stash_is_reported() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("f.txt");
        let script = format!("\n:snippet paste {}\n:snippet show\nq\n", target.display());
        let mut runner = FakeRunner::default();
        let outcome = play(TWO_STEPS, &script, &mut runner, &dir);

        assert!(outcome.output.contains("error: The snippet stash is empty"));
        assert!(outcome.output.contains("The snippet stash is empty."));
        assert!(!target.exists());
    }

    #[test]
    fn test_snippet_open_skips_by_default() {
        let spec = "step: Env\nsuggestions:\n  - kind: snippet\n    content: X\n";
        let dir = tempdir().unwrap();
        let target = dir.path().join("notes.txt");
        let script = format!("\n1\n:snippet open {0}\n\n:snippet open {0}\na\nq\n", target.display());
        let mut runner = FakeRunner::default();
        play(spec, &script, &mut runner, &dir);

        assert_eq!(fs::read_to_string(&target).unwrap(), "X");
        assert_eq!(runner.edited.iter().filter(|p| **p == target).count(), 2);
    }

    #[test]
    fn test_editor_failure_runs_nothing() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner { editor_code: 1, ..FakeRunner::default() };
        let outcome = play(TWO_STEPS, "\n1\nq\n", &mut runner, &dir);

        assert!(runner.commands.is_empty());
        assert!(outcome.output.contains("Editor exited with 1 (error)"));
        assert!(outcome.output.contains("Nothing was run."));
    }

    #[test]
    fn test_commented_out_command_runs_nothing() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner { edit: Some(|text| text.replace("echo hi", "# echo hi")), ..FakeRunner::default() };
        let outcome = play(TWO_STEPS, "\n1\nq\n", &mut runner, &dir);

        assert!(runner.commands.is_empty());
        assert!(outcome.output.contains("Nothing to run."));
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(TWO_STEPS, "\n5\n0\ng 9\npage x\nq\n", &mut runner, &dir);

        assert_eq!(outcome.end, SessionEnd::Quit);
        assert!(outcome.output.contains("error: No suggestion 5 on this step (valid: 1)"));
        assert!(outcome.output.contains("error: No suggestion 0 on this step (valid: 1)"));
        assert!(outcome.output.contains("error: No step 9 (valid: 1-2)"));
        assert!(outcome.output.contains("error: 'x' is not a number"));
        assert!(runner.commands.is_empty());
    }

    #[test]
    fn test_exit_reenters_todo_step_and_advances_from_done() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();
        let outcome = play(TWO_STEPS, "\nx\n\nns\n\ng 1\n\nx\n\nq\n", &mut runner, &dir);

        assert_eq!(outcome.output.matches("== Step 1/2: Greet ==").count(), 3);
        assert_eq!(outcome.output.matches("== Step 2/2: Relax ==").count(), 2);
    }

    #[test]
    fn test_end_of_input_closes_session() {
        let dir = tempdir().unwrap();
        let mut runner = FakeRunner::default();

        assert_eq!(play(TWO_STEPS, "", &mut runner, &dir).end, SessionEnd::InputClosed);
        assert_eq!(play(TWO_STEPS, "\nhelp\n", &mut runner, &dir).end, SessionEnd::InputClosed);
    }

    #[test]
    fn test_start_step_is_clamped() {
        let dir = tempdir().unwrap();
        let runbook = compile_str(THREE_STEPS).unwrap();
        let mut reader = PlainReader::new(Cursor::new("\nq\n".to_string()), io::sink());
        let mut runner = FakeRunner::default();
        let mut out = Vec::new();

        Walkthrough::new(runbook, SessionStore::in_dir(dir.path(), 10), &mut reader, &mut runner, &mut out)
            .starting_at(9)
            .run()
            .unwrap();

        assert!(String::from_utf8(out).unwrap().contains("== Step 3/3: C =="));
    }
}
