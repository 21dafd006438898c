//! Background rotation service.
//!
//! `start` re-executes the binary as `service run` in its own process
//! group and records the child pid under the notebook state directory.
//! `run` sleeps until the configured hour and rotates once per day.

use crate::commands;
use autonotes_core::{FsNotebookRepository, HookRegistry, NotebookService};
use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use log::{error, info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

type Notebook = NotebookService<FsNotebookRepository>;

const MAX_SLEEP: Duration = Duration::from_secs(60);

/// First `hour:00` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, hour: u32) -> Option<NaiveDateTime> {
    let today = now.date().and_hms_opt(hour, 0, 0)?;
    if today > now {
        return Some(today);
    }
    now.date().succ_opt()?.and_hms_opt(hour, 0, 0)
}

fn read_pid(path: &Path) -> Result<Option<i32>, String> {
    match fs::read_to_string(path) {
        Ok(text) => text
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|err| format!("corrupt pid file {}: {err}", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(format!("cannot read {}: {err}", path.display())),
    }
}

fn is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

pub fn start(service: &Notebook) -> Result<(), String> {
    let layout = service.layout();
    let pid_path = layout.service_pid_path();

    if let Some(pid) = read_pid(&pid_path)? {
        if is_alive(pid) {
            println!(
                "{}",
                format!("service already running (pid {pid})").yellow()
            );
            return Ok(());
        }
        warn!(
            "event=service_start module=daemon status=stale_pid pid={}",
            pid
        );
    }

    fs::create_dir_all(layout.state_dir())
        .map_err(|err| format!("cannot create {}: {err}", layout.state_dir().display()))?;

    let exe = std::env::current_exe().map_err(|err| format!("cannot locate binary: {err}"))?;
    let mut cmd = Command::new(exe);
    cmd.arg(format!("--directory={}", layout.directory().display()))
        .args(["service", "run"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let child = cmd
        .spawn()
        .map_err(|err| format!("cannot start service: {err}"))?;
    let pid = child.id();
    fs::write(&pid_path, format!("{pid}\n"))
        .map_err(|err| format!("cannot write {}: {err}", pid_path.display()))?;

    info!(
        "event=service_start module=daemon status=ok pid={} rotate_hour={}",
        pid,
        service.config().rotate_hour
    );
    println!(
        "{}",
        format!(
            "service started (pid {pid}), rotating daily at {:02}:00",
            service.config().rotate_hour
        )
        .green()
    );
    Ok(())
}

pub fn stop(service: &Notebook) -> Result<(), String> {
    let pid_path = service.layout().service_pid_path();
    let Some(pid) = read_pid(&pid_path)? else {
        println!("{}", "service is not running".yellow());
        return Ok(());
    };

    let stale = match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => false,
        Err(nix::errno::Errno::ESRCH) => true,
        Err(err) => return Err(format!("cannot stop service (pid {pid}): {err}")),
    };
    fs::remove_file(&pid_path)
        .map_err(|err| format!("cannot remove {}: {err}", pid_path.display()))?;

    if stale {
        warn!("event=service_stop module=daemon status=stale_pid pid={}", pid);
        println!(
            "{}",
            format!("service was not running (stale pid {pid})").yellow()
        );
    } else {
        info!("event=service_stop module=daemon status=ok pid={}", pid);
        println!("{}", format!("service stopped (pid {pid})").green());
    }
    Ok(())
}

/// Foreground loop behind `service start`. Rotation failures are logged
/// and the loop waits for the next day.
pub fn run(service: &Notebook, registry: &HookRegistry) -> Result<(), String> {
    let hour = service.config().rotate_hour;
    info!(
        "event=service_run module=daemon status=start pid={} rotate_hour={}",
        std::process::id(),
        hour
    );

    loop {
        let now = Local::now().naive_local();
        let next = next_run_after(now, hour)
            .ok_or_else(|| format!("cannot schedule rotation at hour {hour}"))?;
        info!(
            "event=service_run module=daemon status=scheduled next={}",
            next
        );

        loop {
            let remaining = next - Local::now().naive_local();
            let Ok(remaining) = remaining.to_std() else {
                break;
            };
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(MAX_SLEEP));
        }

        match commands::rotate_with_hooks(service, registry) {
            Ok(report) => info!(
                "event=service_run module=daemon status=rotated archive={}",
                report.archive.display()
            ),
            Err(err) => error!(
                "event=service_run module=daemon status=error kind={:?} error={}",
                err.kind(),
                err
            ),
        }
    }
}
