//! Built-in git post-commit logger.
//!
//! Commit messages tagged with a configured prefix (`F:`, `C:`, ...) are
//! appended to the mapped section as checked items.

use super::{HookContext, HookError, HookPayload};
use crate::checkbox::Checkbox;
use crate::service::notebook_service::AddItemRequest;
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLogHook {
    /// Prefix without the trailing `:` -> section name.
    sections: BTreeMap<String, String>,
}

impl CommitLogHook {
    pub fn new(sections: BTreeMap<String, String>) -> Self {
        Self { sections }
    }

    /// Section a commit message belongs to, first matching prefix wins.
    pub fn section_for(&self, message: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(prefix, _)| message.contains(&format!("{prefix}:")))
            .map(|(_, section)| section.as_str())
    }

    pub fn handle(&self, ctx: &HookContext<'_>) -> Result<(), HookError> {
        let HookPayload::GitCommit { message } = &ctx.payload else {
            return Ok(());
        };
        let Some(section) = self.section_for(message) else {
            debug!("event=commit_log module=hooks status=skipped reason=no_prefix");
            return Ok(());
        };

        let request = AddItemRequest::new(section, message.trim())
            .with_checkbox(Some(Checkbox::Checked));
        ctx.notebook.add_item(&request)?;
        Ok(())
    }
}
