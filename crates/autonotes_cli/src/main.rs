//! `autonotes` command-line entry point.
//!
//! # Responsibility
//! - Resolve the notebook directory and refuse uninitialized notebooks.
//! - Wire logging and the configured hook registry around core operations.
//! - Map core error kinds to colored output and exit status.

mod commands;
mod daemon;
mod git;

use autonotes_core::{
    default_log_level, init_logging, FsNotebookRepository, HookEvent, HookPayload, HookRegistry,
    NotebookService,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "autonotes",
    version,
    about = "Daily notes rebuilt from a sectioned template",
    long_about = "Keeps a working note file (today.md) shaped by a template (template.md).\n\
                  `rotate` archives the note and starts a fresh one, carrying over unchecked items."
)]
struct Cli {
    /// Notebook directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Optional trailing notebook directory accepted by every command.
#[derive(Args, Debug, Clone, Default)]
struct Target {
    /// Notebook directory; overrides --directory
    #[arg(id = "notebook_dir", value_name = "DIRECTORY")]
    directory: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the template and today files if they are missing
    Init {
        #[command(flatten)]
        target: Target,
    },
    /// Create an empty template file
    CreateTemplate {
        #[command(flatten)]
        target: Target,
    },
    /// Create an empty today file
    CreateToday {
        #[command(flatten)]
        target: Target,
    },
    /// Archive today's file and start a fresh one from the template
    Rotate {
        #[command(flatten)]
        target: Target,
    },
    /// Append one line to a section of today's file
    AddItem {
        /// Text of the new line
        text: String,

        /// Section the line is added to
        #[arg(long)]
        section: String,

        /// Prefix the line with a checkbox
        #[arg(long)]
        checkbox: bool,

        /// Check the checkbox (requires --checkbox)
        #[arg(long, requires = "checkbox")]
        checked: bool,

        #[command(flatten)]
        target: Target,
    },
    /// Install or remove the git post-commit hook
    GitHooks {
        #[arg(long, conflicts_with = "uninstall", required_unless_present = "uninstall")]
        install: bool,

        #[arg(long)]
        uninstall: bool,

        #[command(flatten)]
        target: Target,
    },
    /// Fire the handlers registered for a hook event
    TriggerHook {
        /// Event name, e.g. git:post-commit or post-rotate
        event: String,

        #[command(flatten)]
        target: Target,
    },
    /// Manage the daily rotation service
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },
}

#[derive(Subcommand)]
enum ServiceAction {
    /// Start rotating daily in the background
    Start {
        #[command(flatten)]
        target: Target,
    },
    /// Stop the background service
    Stop {
        #[command(flatten)]
        target: Target,
    },
    /// Run the scheduler in the foreground
    #[command(hide = true)]
    Run {
        #[command(flatten)]
        target: Target,
    },
}

impl ServiceAction {
    fn target(&self) -> &Target {
        match self {
            Self::Start { target } | Self::Stop { target } | Self::Run { target } => target,
        }
    }
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::CreateTemplate { .. } => "create-template",
            Self::CreateToday { .. } => "create-today",
            Self::Rotate { .. } => "rotate",
            Self::AddItem { .. } => "add-item",
            Self::GitHooks { .. } => "git-hooks",
            Self::TriggerHook { .. } => "trigger-hook",
            Self::Service { .. } => "service",
        }
    }

    fn target(&self) -> &Target {
        match self {
            Self::Init { target }
            | Self::CreateTemplate { target }
            | Self::CreateToday { target }
            | Self::Rotate { target }
            | Self::AddItem { target, .. }
            | Self::GitHooks { target, .. }
            | Self::TriggerHook { target, .. } => target,
            Self::Service { action } => action.target(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message.red());
            ExitCode::FAILURE
        }
    }
}

/// Opens the notebook and starts file logging inside it. Commands other than
/// `init` are refused before anything is written to an uninitialized
/// directory.
fn open_notebook(
    directory: &Path,
    command: &Command,
    log_level: Option<&str>,
) -> Result<NotebookService<FsNotebookRepository>, String> {
    let service = NotebookService::open(directory).map_err(|err| err.to_string())?;

    if !matches!(command, Command::Init { .. }) && !service.is_initialized() {
        return Err(format!(
            "Warning: {} is not initialized, run => autonotes init",
            directory.display()
        ));
    }

    let level = log_level.map_or_else(|| default_log_level().to_string(), str::to_string);
    if let Err(err) = init_logging(&level, &service.layout().log_dir()) {
        eprintln!("{} {err}", "warning: logging disabled:".yellow());
    }
    Ok(service)
}

fn run(cli: Cli) -> Result<(), String> {
    let requested = cli
        .command
        .target()
        .directory
        .clone()
        .or(cli.directory.clone())
        .map_or_else(std::env::current_dir, Ok)
        .map_err(|err| format!("cannot resolve current directory: {err}"))?;
    let directory = requested
        .canonicalize()
        .ok()
        .filter(|path| path.is_dir())
        .ok_or_else(|| format!("{} is not a directory!", requested.display()))?;

    let service = open_notebook(&directory, &cli.command, cli.log_level.as_deref())?;
    let is_init = matches!(cli.command, Command::Init { .. });

    let registry = HookRegistry::from_config(service.config()).map_err(|err| err.to_string())?;
    if !is_init {
        commands::fire(
            &registry,
            &service,
            HookEvent::PreCommand,
            HookPayload::Command {
                name: cli.command.name().to_string(),
            },
        );
    }
    info!(
        "event=command module=cli status=start command={} dir={}",
        cli.command.name(),
        directory.display()
    );

    match cli.command {
        Command::Init { .. } => commands::init(&service),
        Command::CreateTemplate { .. } => commands::create_template(&service),
        Command::CreateToday { .. } => commands::create_today(&service),
        Command::Rotate { .. } => commands::rotate(&service, &registry),
        Command::AddItem {
            text,
            section,
            checkbox,
            checked,
            ..
        } => commands::add_item(&service, &registry, section, text, checkbox, checked),
        Command::GitHooks { install, .. } => commands::git_hooks(&service, install),
        Command::TriggerHook { event, .. } => commands::trigger_hook(&service, &registry, &event),
        Command::Service { action } => match action {
            ServiceAction::Start { .. } => daemon::start(&service),
            ServiceAction::Stop { .. } => daemon::stop(&service),
            ServiceAction::Run { .. } => daemon::run(&service, &registry),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{open_notebook, Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_directory_overrides_global_option() {
        let cli = Cli::parse_from(["autonotes", "--directory", "/a", "rotate", "/b"]);
        let target = cli.command.target().directory.clone();
        assert_eq!(target.as_deref(), Some(std::path::Path::new("/b")));
        assert_eq!(cli.directory.as_deref(), Some(std::path::Path::new("/a")));
    }

    #[test]
    fn service_actions_take_a_directory() {
        let cli = Cli::parse_from(["autonotes", "service", "start", "/notes"]);
        let target = cli.command.target().directory.clone();
        assert_eq!(target.as_deref(), Some(std::path::Path::new("/notes")));
    }

    #[test]
    fn parses_add_item_flags() {
        let cli = Cli::parse_from([
            "autonotes",
            "add-item",
            "ship it",
            "--section=todo",
            "--checkbox",
            "--checked",
        ]);
        match cli.command {
            Command::AddItem {
                text,
                section,
                checkbox,
                checked,
                target,
            } => {
                assert_eq!(text, "ship it");
                assert_eq!(section, "todo");
                assert!(checkbox && checked);
                assert!(target.directory.is_none());
            }
            _ => panic!("expected add-item"),
        }
    }

    #[test]
    fn checked_requires_checkbox() {
        let result =
            Cli::try_parse_from(["autonotes", "add-item", "x", "--section=todo", "--checked"]);
        assert!(result.is_err());
    }

    #[test]
    fn git_hooks_requires_a_mode() {
        assert!(Cli::try_parse_from(["autonotes", "git-hooks"]).is_err());
        assert!(
            Cli::try_parse_from(["autonotes", "git-hooks", "--install", "--uninstall"]).is_err()
        );
        assert!(Cli::try_parse_from(["autonotes", "git-hooks", "--uninstall"]).is_ok());
    }

    #[test]
    fn uninitialized_directory_is_refused_without_side_effects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from(["autonotes", "rotate"]);

        let err = match open_notebook(dir.path(), &cli.command, None) {
            Ok(_) => panic!("uninitialized notebook must be refused"),
            Err(err) => err,
        };
        assert!(err.contains("not initialized"), "{err}");
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
