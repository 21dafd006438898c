//! Command handlers.
//!
//! Each handler prints user-facing output and returns `Err(message)` for
//! failures that must exit non-zero. `FileAlreadyExists` is a warning.

use crate::git;
use autonotes_core::{
    parse_hook_event, AddItemRequest, Checkbox, FsNotebookRepository, HookContext, HookEvent,
    HookPayload, HookRegistry, InitOutcome, NotebookService, RotationReport, ServiceError,
    ServiceResult,
};
use colored::Colorize;
use log::warn;
use std::path::PathBuf;

type Notebook = NotebookService<FsNotebookRepository>;

/// Fires `event`, printing handler failures without aborting the command.
pub fn fire(registry: &HookRegistry, service: &Notebook, event: HookEvent, payload: HookPayload) {
    if registry.handler_count(event) == 0 {
        return;
    }
    let ctx = HookContext {
        event,
        layout: service.layout(),
        notebook: service,
        payload,
    };
    for failure in registry.fire(&ctx).failures {
        eprintln!("{} {failure}", format!("hook {event} failed:").yellow());
    }
}

pub fn init(service: &Notebook) -> Result<(), String> {
    let directory = service.layout().directory().display().to_string();
    match service.init().map_err(|err| err.to_string())? {
        InitOutcome::AlreadyInitialized => {
            println!("{}", format!("{directory} already initialized!\n").green());
        }
        InitOutcome::Created { created, existing } => {
            println!("{}", "\nCREATING REQUIRED FILES...".blue());
            for path in existing {
                println!("{}", format!("\t- {} already exists!", path.display()).yellow());
            }
            for path in created {
                println!("\t- {}", path.display());
            }
            println!("{}", "Success!\n".green());
        }
    }
    Ok(())
}

pub fn create_template(service: &Notebook) -> Result<(), String> {
    println!("{}", "\nCREATING TEMPLATE FILE...".blue());
    report_created(service.create_template())
}

pub fn create_today(service: &Notebook) -> Result<(), String> {
    println!("{}", "\nCREATING TODAY FILE...".blue());
    report_created(service.create_document())
}

fn report_created(result: ServiceResult<PathBuf>) -> Result<(), String> {
    match result {
        Ok(path) => {
            println!("\t- {}", path.display());
            println!("{}", "Success!\n".green());
            Ok(())
        }
        Err(err) if err.is_warning() => {
            println!("{}", format!("{err}!\n").yellow());
            Ok(())
        }
        Err(err) => Err(err.to_string()),
    }
}

/// Rotation wrapped in `pre-rotate`/`post-rotate` hooks.
pub fn rotate_with_hooks(
    service: &Notebook,
    registry: &HookRegistry,
) -> ServiceResult<RotationReport> {
    fire(
        registry,
        service,
        HookEvent::PreRotate,
        HookPayload::Rotate { archive: None },
    );
    let report = service.rotate()?;
    fire(
        registry,
        service,
        HookEvent::PostRotate,
        HookPayload::Rotate {
            archive: Some(report.archive.clone()),
        },
    );
    Ok(report)
}

pub fn rotate(service: &Notebook, registry: &HookRegistry) -> Result<(), String> {
    let report = rotate_with_hooks(service, registry).map_err(describe_failure)?;
    println!(
        "{} {}",
        "Archived to".green(),
        report.archive.display().to_string().bold()
    );
    Ok(())
}

pub fn add_item(
    service: &Notebook,
    registry: &HookRegistry,
    section: String,
    text: String,
    checkbox: bool,
    checked: bool,
) -> Result<(), String> {
    let request =
        AddItemRequest::new(section, text).with_checkbox(Checkbox::from_flags(checkbox, checked));
    let payload = HookPayload::AddItem {
        section: request.section.clone(),
        item: request.text.clone(),
    };

    fire(registry, service, HookEvent::PreAddItem, payload.clone());
    service.add_item(&request).map_err(describe_failure)?;
    fire(registry, service, HookEvent::PostAddItem, payload);
    Ok(())
}

pub fn git_hooks(service: &Notebook, install: bool) -> Result<(), String> {
    let directory = service.layout().directory();
    let root = git::repo_root(directory).map_err(|err| err.to_string())?;
    let hook_path = git::post_commit_hook_path(&root);
    let line = git::hook_command(directory);

    if install {
        if git::install_hook_line(&hook_path, &line).map_err(|err| err.to_string())? {
            println!(
                "{}",
                format!("Git post-commit hook installed for {}", root.display()).green()
            );
        } else {
            println!(
                "{}",
                format!(
                    "git post-commit hook already installed at: {}",
                    hook_path.display()
                )
                .yellow()
            );
        }
    } else if git::uninstall_hook_line(&hook_path, &line).map_err(|err| err.to_string())? {
        println!(
            "{}",
            format!("Git post-commit hook removed from {}", hook_path.display()).green()
        );
    } else {
        println!(
            "{}",
            format!("no autonotes hook found in {}", hook_path.display()).yellow()
        );
    }
    Ok(())
}

pub fn trigger_hook(service: &Notebook, registry: &HookRegistry, name: &str) -> Result<(), String> {
    let event = parse_hook_event(name).map_err(|err| err.to_string())?;
    let payload = match event {
        HookEvent::GitPostCommit => {
            let message = git::latest_commit_message(service.layout().directory())
                .map_err(|err| err.to_string())?;
            HookPayload::GitCommit { message }
        }
        HookEvent::GitPostPush => HookPayload::GitPush,
        HookEvent::PreRotate | HookEvent::PostRotate => HookPayload::Rotate { archive: None },
        HookEvent::PreCommand | HookEvent::PreAddItem | HookEvent::PostAddItem => {
            HookPayload::Empty
        }
    };

    let ctx = HookContext {
        event,
        layout: service.layout(),
        notebook: service,
        payload,
    };
    let report = registry.fire(&ctx);
    if report.invoked == 0 {
        println!("{}", format!("no hooks registered for {event}").yellow());
    }
    if report.is_ok() {
        return Ok(());
    }

    let failures: Vec<String> = report.failures.iter().map(|err| err.to_string()).collect();
    Err(format!(
        "{} of {} {event} hooks failed:\n  {}",
        failures.len(),
        report.invoked,
        failures.join("\n  ")
    ))
}

fn describe_failure(err: ServiceError) -> String {
    warn!(
        "event=command module=cli status=error kind={:?} error={}",
        err.kind(),
        err
    );
    err.to_string()
}
