//! Outstanding commands
//!
//! Maps the tag of every issued command to what has to happen when its
//! tagged completion arrives.

use crate::error::{Error, Result};
use crate::response::Tag;
use crate::tree::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Registered without a completion action. Completing it is a bug.
    None,
    /// LIST of a node's direct children.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperation {
    pub kind: TaskKind,
    /// Node the completion applies to.
    pub target: NodeId,
}

impl PendingOperation {
    #[must_use]
    pub const fn list(target: NodeId) -> Self {
        Self {
            kind: TaskKind::List,
            target,
        }
    }
}

#[derive(Debug, Default)]
pub struct CommandTable {
    pending: HashMap<Tag, PendingOperation>,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`Error::DuplicateTag`] if `tag` is still outstanding.
    pub fn register(&mut self, tag: Tag, operation: PendingOperation) -> Result<()> {
        if self.pending.contains_key(&tag) {
            return Err(Error::DuplicateTag { tag });
        }
        self.pending.insert(tag, operation);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] if no command with this tag is
    /// outstanding.
    pub fn resolve(&self, tag: &Tag) -> Result<PendingOperation> {
        self.pending
            .get(tag)
            .copied()
            .ok_or_else(|| Error::UnknownTag { tag: tag.clone() })
    }

    pub fn remove(&mut self, tag: &Tag) -> Option<PendingOperation> {
        self.pending.remove(tag)
    }

    /// Whether a LIST for `node` is still waiting for its completion.
    #[must_use]
    pub fn is_pending_for(&self, node: NodeId) -> bool {
        self.pending
            .values()
            .any(|op| op.kind == TaskKind::List && op.target == node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
