//! Lifecycle hook registry.
//!
//! # Responsibility
//! - Name the lifecycle events callers can hook into.
//! - Hold an explicit, process-owned registry of ordered handlers.
//! - Pass every handler the notebook handle plus an event payload.
//!
//! # Invariants
//! - Handlers for one event run in registration order.
//! - A failing handler never prevents later handlers from running.

pub mod commit_log;
pub mod script;

use crate::config::NotebookConfig;
use crate::model::notebook::NotebookLayout;
use crate::service::notebook_service::ItemSink;
use crate::service::ServiceError;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookEvent {
    PreCommand,
    PreRotate,
    PostRotate,
    PreAddItem,
    PostAddItem,
    GitPostCommit,
    GitPostPush,
}

/// Config/CLI name for pre-command.
pub const HOOK_PRE_COMMAND: &str = "pre-command";
pub const HOOK_PRE_ROTATE: &str = "pre-rotate";
pub const HOOK_POST_ROTATE: &str = "post-rotate";
pub const HOOK_PRE_ADD_ITEM: &str = "pre-add-item";
pub const HOOK_POST_ADD_ITEM: &str = "post-add-item";
pub const HOOK_GIT_POST_COMMIT: &str = "git:post-commit";
pub const HOOK_GIT_POST_PUSH: &str = "git:post-push";

const SUPPORTED_HOOK_EVENTS: &[&str] = &[
    HOOK_PRE_COMMAND,
    HOOK_PRE_ROTATE,
    HOOK_POST_ROTATE,
    HOOK_PRE_ADD_ITEM,
    HOOK_POST_ADD_ITEM,
    HOOK_GIT_POST_COMMIT,
    HOOK_GIT_POST_PUSH,
];

impl HookEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreCommand => HOOK_PRE_COMMAND,
            Self::PreRotate => HOOK_PRE_ROTATE,
            Self::PostRotate => HOOK_POST_ROTATE,
            Self::PreAddItem => HOOK_PRE_ADD_ITEM,
            Self::PostAddItem => HOOK_POST_ADD_ITEM,
            Self::GitPostCommit => HOOK_GIT_POST_COMMIT,
            Self::GitPostPush => HOOK_GIT_POST_PUSH,
        }
    }
}

impl Display for HookEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns every accepted event name.
pub fn supported_hook_events() -> &'static [&'static str] {
    SUPPORTED_HOOK_EVENTS
}

/// Parses an event name such as `post-rotate` or `git:post-commit`.
pub fn parse_hook_event(value: &str) -> Result<HookEvent, HookError> {
    match value.trim() {
        "" => Err(HookError::UnknownEvent(String::new())),
        HOOK_PRE_COMMAND => Ok(HookEvent::PreCommand),
        HOOK_PRE_ROTATE => Ok(HookEvent::PreRotate),
        HOOK_POST_ROTATE => Ok(HookEvent::PostRotate),
        HOOK_PRE_ADD_ITEM => Ok(HookEvent::PreAddItem),
        HOOK_POST_ADD_ITEM => Ok(HookEvent::PostAddItem),
        HOOK_GIT_POST_COMMIT => Ok(HookEvent::GitPostCommit),
        HOOK_GIT_POST_PUSH => Ok(HookEvent::GitPostPush),
        other => Err(HookError::UnknownEvent(other.to_string())),
    }
}

/// Event-specific data passed to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HookPayload {
    Empty,
    Command { name: String },
    Rotate { archive: Option<PathBuf> },
    AddItem { section: String, item: String },
    GitCommit { message: String },
    GitPush,
}

/// Everything a handler receives.
pub struct HookContext<'a> {
    pub event: HookEvent,
    pub layout: &'a NotebookLayout,
    pub notebook: &'a dyn ItemSink,
    pub payload: HookPayload,
}

pub type HookHandler = Box<dyn Fn(&HookContext<'_>) -> Result<(), HookError>>;

/// Outcome of firing one event.
#[derive(Debug, Default)]
pub struct HookReport {
    pub invoked: usize,
    pub failures: Vec<HookError>,
}

impl HookReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Explicit event -> handlers registry.
#[derive(Default)]
pub struct HookRegistry {
    handlers: BTreeMap<HookEvent, Vec<HookHandler>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry a notebook declares: `[hooks]` scripts first,
    /// then the commit logger when `[commit_log]` is configured.
    pub fn from_config(config: &NotebookConfig) -> Result<Self, HookError> {
        let mut registry = Self::new();
        script::register_script_hooks(&mut registry, &config.hooks)?;
        if !config.commit_log.is_empty() {
            let hook = commit_log::CommitLogHook::new(config.commit_log.clone());
            registry.register(HookEvent::GitPostCommit, move |ctx| hook.handle(ctx));
        }
        Ok(registry)
    }

    pub fn register<F>(&mut self, event: HookEvent, handler: F)
    where
        F: Fn(&HookContext<'_>) -> Result<(), HookError> + 'static,
    {
        self.handlers
            .entry(event)
            .or_default()
            .push(Box::new(handler));
    }

    pub fn handler_count(&self, event: HookEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }

    /// Runs every handler for `ctx.event`, collecting failures.
    pub fn fire(&self, ctx: &HookContext<'_>) -> HookReport {
        let mut report = HookReport::default();
        let Some(handlers) = self.handlers.get(&ctx.event) else {
            return report;
        };

        for handler in handlers {
            report.invoked += 1;
            if let Err(err) = handler(ctx) {
                warn!(
                    "event=hook_fire module=hooks status=error hook={} error={}",
                    ctx.event, err
                );
                report.failures.push(err);
            }
        }
        debug!(
            "event=hook_fire module=hooks status=ok hook={} invoked={} failed={}",
            ctx.event,
            report.invoked,
            report.failures.len()
        );
        report
    }
}

/// Hook registration and execution errors.
#[derive(Debug)]
pub enum HookError {
    UnknownEvent(String),
    Spawn {
        command: String,
        source: std::io::Error,
    },
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    Payload(String),
    Service(ServiceError),
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEvent(value) => write!(
                f,
                "unsupported hook event `{value}`; expected one of {}",
                SUPPORTED_HOOK_EVENTS.join("|")
            ),
            Self::Spawn { command, source } => {
                write!(f, "failed to start hook `{command}`: {source}")
            }
            Self::CommandFailed {
                command,
                status,
                stderr,
            } => match status {
                Some(code) => write!(f, "hook `{command}` exited with {code}: {stderr}"),
                None => write!(f, "hook `{command}` was terminated by a signal: {stderr}"),
            },
            Self::Payload(message) => write!(f, "failed to encode hook payload: {message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for HookError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_hook_event, supported_hook_events, HookContext, HookError, HookEvent, HookPayload,
        HookRegistry,
    };
    use crate::model::notebook::NotebookLayout;
    use crate::service::notebook_service::{AddItemRequest, ItemSink};
    use crate::service::ServiceResult;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullSink;

    impl ItemSink for NullSink {
        fn add_item(&self, _request: &AddItemRequest) -> ServiceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn parses_every_supported_event() {
        for name in supported_hook_events() {
            let event = parse_hook_event(name).expect("supported event");
            assert_eq!(event.as_str(), *name);
        }
        assert!(matches!(
            parse_hook_event("post-save"),
            Err(HookError::UnknownEvent(value)) if value == "post-save"
        ));
    }

    #[test]
    fn fires_handlers_in_order_and_survives_failures() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HookRegistry::new();

        let first = Rc::clone(&calls);
        registry.register(HookEvent::PostRotate, move |_| {
            first.borrow_mut().push("first");
            Err(HookError::Payload("boom".to_string()))
        });
        let second = Rc::clone(&calls);
        registry.register(HookEvent::PostRotate, move |_| {
            second.borrow_mut().push("second");
            Ok(())
        });
        registry.register(HookEvent::PreRotate, |_| Ok(()));

        let layout = NotebookLayout::new("/notes");
        let ctx = HookContext {
            event: HookEvent::PostRotate,
            layout: &layout,
            notebook: &NullSink,
            payload: HookPayload::Rotate { archive: None },
        };
        let report = registry.fire(&ctx);

        assert_eq!(report.invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn firing_unregistered_event_is_a_no_op() {
        let registry = HookRegistry::new();
        let layout = NotebookLayout::new("/notes");
        let ctx = HookContext {
            event: HookEvent::GitPostPush,
            layout: &layout,
            notebook: &NullSink,
            payload: HookPayload::GitPush,
        };
        let report = registry.fire(&ctx);
        assert_eq!(report.invoked, 0);
        assert!(report.is_ok());
    }
}
