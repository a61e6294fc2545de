//! Walkbook - executable documentation for your terminal.
//!
//! Compiles a runbook into a standalone walkthrough program. The same binary
//! runs the walkthrough when a compiled runbook is embedded in it.

#![allow(clippy::single_match_else)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use walkbook::artifact::{self, identity_for, Payload, DEFAULT_IDENTITY};
use walkbook::core::terminal::install_panic_hook;
use walkbook::core::{Config, TerminalReader};
use walkbook::runbook::{build_runbook, ensure_interactive, parse_runbook, run_wizard, Record};
use walkbook::walkthrough::{self, PlayOptions};
use walkbook::APP_NAME;

/// Compile step-by-step runbooks into interactive walkthrough programs
#[derive(Parser)]
#[command(name = "walkbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
#[command(group(ArgGroup::new("source").args(["from", "wizard"])))]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Runbook specification to compile
    #[arg(long, value_name = "PATH")]
    from: Option<PathBuf>,

    /// Author the runbook interactively
    #[arg(long)]
    wizard: bool,

    /// Where to write the generated program
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the compiled records as JSON instead of writing a program
    #[arg(long)]
    dump_ir: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through a runbook without building a program
    Play {
        /// Runbook specification
        spec: PathBuf,

        /// Suggestions per page
        #[arg(long, value_name = "N")]
        page_size: Option<usize>,

        /// Step to start at
        #[arg(long, value_name = "N")]
        step: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Command line of a generated walkthrough program.
#[derive(Parser)]
#[command(version, about = "Interactive walkthrough", long_about = None)]
struct PlayerCli {
    /// Suggestions per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Step to start at
    #[arg(long, value_name = "N")]
    step: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    if let Some(payload) = artifact::load_embedded()? {
        return run_embedded(payload);
    }

    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Some(Commands::Play { spec, page_size, step }) => {
            cmd_play(&spec, &PlayOptions { page_size, start_step: step })?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
        None => {
            cmd_generate(cli.from.as_deref(), cli.wizard, cli.output, cli.dump_ir)?;
        }
    }

    Ok(())
}

/// Setup logging on stderr so it never mixes with the walkthrough.
fn init_logging(debug: bool) {
    let filter = if debug { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Run the walkthrough embedded in this executable.
fn run_embedded(payload: Payload) -> Result<()> {
    let matches = PlayerCli::command().name(payload.identity.clone()).get_matches();
    let cli = PlayerCli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);

    tracing::debug!(identity = payload.identity, generator = payload.generator, "Loaded embedded walkthrough");

    let config = Config::load()?;
    let options = PlayOptions { page_size: cli.page_size, start_step: cli.step };
    walkthrough::play(payload.runbook, &payload.identity, &config, &options)?;
    Ok(())
}

/// Compile a runbook, or author one with the wizard, and write the program.
fn cmd_generate(from: Option<&Path>, wizard: bool, output: Option<PathBuf>, dump_ir: bool) -> Result<()> {
    let (records, default_output) = match from {
        Some(path) => (parse_runbook(path)?, default_output_for(path)),
        None if wizard => (author_runbook()?, PathBuf::from(DEFAULT_IDENTITY)),
        None => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "one of --from <PATH> or --wizard is required")
            .exit(),
    };

    if dump_ir {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &records)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let runbook = build_runbook(&records)?;
    let output = output.unwrap_or(default_output);
    let payload = Payload::new(identity_for(&output), runbook);
    artifact::write_program(&payload, &output)?;

    println!("Wrote {} ({} steps)", output.display(), payload.runbook.step_count());
    Ok(())
}

fn author_runbook() -> Result<Vec<Record>> {
    ensure_interactive()?;
    install_panic_hook();

    let mut reader = TerminalReader::new(Vec::new());
    let mut stdout = io::stdout();
    Ok(run_wizard(&mut reader, &mut stdout)?)
}

/// Program name for a spec: its file stem, in the current directory.
fn default_output_for(spec: &Path) -> PathBuf {
    PathBuf::from(identity_for(spec))
}

/// Compile a runbook and walk through it right away.
fn cmd_play(spec: &Path, options: &PlayOptions) -> Result<()> {
    let runbook = build_runbook(&parse_runbook(spec)?)?;
    let config = Config::load()?;
    walkthrough::play(runbook, &identity_for(spec), &config, options)?;
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
}
