//! Shell-command hooks declared in `autonotes.toml`.
//!
//! Each command runs through `sh -c` inside the notebook directory with
//! `AUTONOTES_EVENT`, `AUTONOTES_DIRECTORY` and `AUTONOTES_PAYLOAD` (JSON)
//! set in its environment.

use super::{parse_hook_event, HookContext, HookError, HookRegistry};
use log::info;
use std::collections::BTreeMap;
use std::process::Command;

const MAX_STDERR_CHARS: usize = 400;

/// One configured shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHook {
    command: String,
}

impl ScriptHook {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Runs the command and waits for it.
    pub fn run(&self, ctx: &HookContext<'_>) -> Result<(), HookError> {
        let payload = serde_json::to_string(&ctx.payload)
            .map_err(|err| HookError::Payload(err.to_string()))?;

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(ctx.layout.directory())
            .env("AUTONOTES_EVENT", ctx.event.as_str())
            .env("AUTONOTES_DIRECTORY", ctx.layout.directory())
            .env("AUTONOTES_PAYLOAD", payload)
            .output()
            .map_err(|source| HookError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HookError::CommandFailed {
                command: self.command.clone(),
                status: output.status.code(),
                stderr: stderr.trim().chars().take(MAX_STDERR_CHARS).collect(),
            });
        }

        info!(
            "event=script_hook module=hooks status=ok hook={} command_len={}",
            ctx.event,
            self.command.len()
        );
        Ok(())
    }
}

/// Registers every `[hooks]` entry, preserving command order per event.
pub fn register_script_hooks(
    registry: &mut HookRegistry,
    hooks: &BTreeMap<String, Vec<String>>,
) -> Result<(), HookError> {
    for (event_name, commands) in hooks {
        let event = parse_hook_event(event_name)?;
        for command in commands {
            let hook = ScriptHook::new(command.clone());
            registry.register(event, move |ctx| hook.run(ctx));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{register_script_hooks, ScriptHook};
    use crate::hooks::{HookContext, HookError, HookEvent, HookPayload, HookRegistry};
    use crate::model::notebook::NotebookLayout;
    use crate::service::notebook_service::{AddItemRequest, ItemSink};
    use crate::service::ServiceResult;
    use std::collections::BTreeMap;

    struct NullSink;

    impl ItemSink for NullSink {
        fn add_item(&self, _request: &AddItemRequest) -> ServiceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn passes_event_and_payload_through_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = NotebookLayout::new(dir.path());
        let ctx = HookContext {
            event: HookEvent::PostAddItem,
            layout: &layout,
            notebook: &NullSink,
            payload: HookPayload::AddItem {
                section: "todo".to_string(),
                item: "write tests".to_string(),
            },
        };

        ScriptHook::new("printf '%s\\n%s' \"$AUTONOTES_EVENT\" \"$AUTONOTES_PAYLOAD\" > out.txt")
            .run(&ctx)
            .expect("hook runs");

        let out = std::fs::read_to_string(dir.path().join("out.txt")).expect("hook output");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("post-add-item"));
        let payload: serde_json::Value =
            serde_json::from_str(lines.next().expect("payload line")).expect("json payload");
        assert_eq!(payload["kind"], "add_item");
        assert_eq!(payload["section"], "todo");
        assert_eq!(payload["item"], "write tests");
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let layout = NotebookLayout::new(dir.path());
        let ctx = HookContext {
            event: HookEvent::PreRotate,
            layout: &layout,
            notebook: &NullSink,
            payload: HookPayload::Empty,
        };

        let err = ScriptHook::new("echo nope >&2; exit 3")
            .run(&ctx)
            .expect_err("failing hook");
        assert!(matches!(
            err,
            HookError::CommandFailed { status: Some(3), ref stderr, .. } if stderr == "nope"
        ));
    }

    #[test]
    fn registers_commands_per_event() {
        let mut hooks = BTreeMap::new();
        hooks.insert(
            "post-rotate".to_string(),
            vec!["true".to_string(), "true".to_string()],
        );
        let mut registry = HookRegistry::new();
        register_script_hooks(&mut registry, &hooks).expect("register");

        assert_eq!(registry.handler_count(HookEvent::PostRotate), 2);
        assert_eq!(registry.handler_count(HookEvent::PreRotate), 0);
    }
}
