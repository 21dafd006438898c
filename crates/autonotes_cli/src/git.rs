//! Git integration: locating the repository and managing the
//! `post-commit` hook line that calls back into `autonotes`.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

const SHEBANG: &str = "#!/bin/sh";

#[derive(Debug)]
pub enum GitError {
    Spawn(io::Error),
    NotARepository(PathBuf),
    CommandFailed { args: String, stderr: String },
    Hook { path: PathBuf, source: io::Error },
}

impl Display for GitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to run git: {err}"),
            Self::NotARepository(dir) => {
                write!(f, "{} is not inside a git repository", dir.display())
            }
            Self::CommandFailed { args, stderr } => write!(f, "git {args} failed: {stderr}"),
            Self::Hook { path, source } => {
                write!(f, "cannot update git hook {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for GitError {}

fn git(directory: &Path, args: &[&str]) -> Result<std::process::Output, GitError> {
    Command::new("git")
        .args(args)
        .current_dir(directory)
        .output()
        .map_err(GitError::Spawn)
}

/// Top level of the work tree containing `directory`.
pub fn repo_root(directory: &Path) -> Result<PathBuf, GitError> {
    let output = git(directory, &["rev-parse", "--show-toplevel"])?;
    if !output.status.success() {
        return Err(GitError::NotARepository(directory.to_path_buf()));
    }
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        return Err(GitError::NotARepository(directory.to_path_buf()));
    }
    Ok(PathBuf::from(root))
}

/// Subject line of `HEAD`.
pub fn latest_commit_message(directory: &Path) -> Result<String, GitError> {
    let args = ["log", "-1", "--format=%s"];
    let output = git(directory, &args)?;
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub fn post_commit_hook_path(root: &Path) -> PathBuf {
    root.join(".git").join("hooks").join("post-commit")
}

/// Hook line that triggers `git:post-commit` for `notebook`.
pub fn hook_command(notebook: &Path) -> String {
    format!(
        "autonotes --directory={} trigger-hook git:post-commit",
        shell_quote(&notebook.display().to_string())
    )
}

fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@,".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Appends `line` to the hook script, creating an executable script when
/// absent. Returns `false` when the line is already present.
pub fn install_hook_line(hook: &Path, line: &str) -> Result<bool, GitError> {
    let wrap = |source: io::Error| GitError::Hook {
        path: hook.to_path_buf(),
        source,
    };

    let mut script = match fs::read_to_string(hook) {
        Ok(existing) => existing,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = hook.parent() {
                fs::create_dir_all(parent).map_err(wrap)?;
            }
            format!("{SHEBANG}\n")
        }
        Err(err) => return Err(wrap(err)),
    };

    if script.lines().any(|existing| existing.trim() == line) {
        return Ok(false);
    }
    if !script.is_empty() && !script.ends_with('\n') {
        script.push('\n');
    }
    script.push_str(line);
    script.push('\n');

    fs::write(hook, script).map_err(wrap)?;
    make_executable(hook).map_err(wrap)?;
    Ok(true)
}

/// Removes `line` from the hook script. Returns `false` when it was absent.
pub fn uninstall_hook_line(hook: &Path, line: &str) -> Result<bool, GitError> {
    let wrap = |source: io::Error| GitError::Hook {
        path: hook.to_path_buf(),
        source,
    };

    let script = match fs::read_to_string(hook) {
        Ok(existing) => existing,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(wrap(err)),
    };

    let kept: Vec<&str> = script
        .lines()
        .filter(|existing| existing.trim() != line)
        .collect();
    if kept.len() == script.lines().count() {
        return Ok(false);
    }

    let mut rewritten = kept.join("\n");
    if !rewritten.is_empty() {
        rewritten.push('\n');
    }
    fs::write(hook, rewritten).map_err(wrap)?;
    Ok(true)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
