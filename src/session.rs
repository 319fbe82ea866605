//! Session state and response dispatch
//!
//! [`Session`] owns everything that changes while responses arrive: the
//! connection state, the table of outstanding commands, the mailbox
//! tree, the capability cache and the buffer of LIST replies that wait
//! for their command's completion.
//!
//! Every response goes through [`Session::dispatch`], one at a time and
//! in arrival order:
//!
//! 1. `ALERT` and `CAPABILITY` response codes take effect first.
//! 2. A tagged reply is resolved against the command table and handled
//!    as that command's completion. Nothing else looks at it.
//! 3. Untagged state replies and the greeting go to the state machine.
//! 4. Untagged LIST replies are buffered until their command completes.
//!    FLAGS and EXISTS/RECENT/EXPUNGE only make sense while a mailbox is
//!    being selected or is selected.
//! 5. SEARCH, STATUS, FETCH and NAMESPACE are never requested, so
//!    receiving one is a protocol error.

use crate::command::{CommandTable, PendingOperation, TaskKind};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::flag::Flag;
use crate::response::{ListEntry, NumberKind, ResponseCode, ServerResponse, StateKind, Tag};
use crate::source::{CommandIssuer, NoopObserver, ResponseSource, SessionObserver};
use crate::state::{ConnectionState, ConnectionStateMachine};
use crate::tree::{MailboxTree, NodeId};
use futures::{Stream, StreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// What the server told us about the mailbox being selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxStatus {
    pub flags: Vec<Flag>,
    pub exists: u32,
    pub recent: u32,
}

impl MailboxStatus {
    const fn apply(&mut self, kind: NumberKind, number: u32) {
        match kind {
            NumberKind::Exists => self.exists = number,
            NumberKind::Recent => self.recent = number,
            NumberKind::Expunge => self.exists = self.exists.saturating_sub(1),
        }
    }
}

pub struct Session {
    machine: ConnectionStateMachine,
    commands: CommandTable,
    tree: MailboxTree,
    capabilities: BTreeSet<String>,
    capabilities_fresh: bool,
    pending_lists: Vec<ListEntry>,
    mailbox: MailboxStatus,
    list_reference: String,
    observer: Box<dyn SessionObserver>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(config: &SessionConfig) -> Self {
        Self {
            machine: ConnectionStateMachine::new(),
            commands: CommandTable::new(),
            tree: MailboxTree::new(config.root_separator),
            capabilities: BTreeSet::new(),
            capabilities_fresh: false,
            pending_lists: Vec::new(),
            mailbox: MailboxStatus::default(),
            list_reference: config.list_reference.clone(),
            observer: Box::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    #[must_use]
    pub const fn tree(&self) -> &MailboxTree {
        &self.tree
    }

    #[must_use]
    pub const fn commands(&self) -> &CommandTable {
        &self.commands
    }

    #[must_use]
    pub const fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// Whether the capability cache was filled by the server at least once.
    #[must_use]
    pub const fn capabilities_fresh(&self) -> bool {
        self.capabilities_fresh
    }

    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.eq_ignore_ascii_case(name))
    }

    /// LIST replies received since the last finalization.
    #[must_use]
    pub fn pending_lists(&self) -> &[ListEntry] {
        &self.pending_lists
    }

    #[must_use]
    pub const fn mailbox_status(&self) -> &MailboxStatus {
        &self.mailbox
    }

    /// See [`ConnectionStateMachine::authenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInconsistency`] outside NotAuthenticated.
    pub fn authenticated(&mut self) -> Result<()> {
        self.machine.authenticated()
    }

    /// See [`ConnectionStateMachine::begin_select`]. Forgets whatever was
    /// known about the previously selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInconsistency`] if no mailbox can be
    /// selected in the current state.
    pub fn begin_select(&mut self) -> Result<()> {
        self.machine.begin_select()?;
        self.mailbox = MailboxStatus::default();
        Ok(())
    }

    /// Track a command issued by some other layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTag`] if `tag` is still outstanding.
    pub fn register(&mut self, tag: Tag, operation: PendingOperation) -> Result<()> {
        self.commands.register(tag, operation)
    }

    /// Ask the server for the direct children of `node`.
    ///
    /// Issuing this twice for the same node before the first completes
    /// yields two independent requests; use
    /// [`CommandTable::is_pending_for`] to avoid that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `node` is gone, or whatever the
    /// issuer fails with.
    pub fn request_children<I>(&mut self, issuer: &mut I, node: NodeId) -> Result<Tag>
    where
        I: CommandIssuer + ?Sized,
    {
        let pattern = self.tree.node(node)?.children_pattern();
        debug!("Requesting children of {} with pattern {}", node, pattern);
        let tag = issuer.list(&self.list_reference, &pattern)?;
        self.commands
            .register(tag.clone(), PendingOperation::list(node))?;
        Ok(tag)
    }

    /// Dispatch every response the source currently has.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first fatal error.
    pub fn process_available<S>(&mut self, source: &mut S) -> Result<usize>
    where
        S: ResponseSource + ?Sized,
    {
        let mut handled = 0;
        while source.has_next() {
            let response = source.take_next()?;
            self.dispatch(response)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Dispatch responses as they arrive until the stream ends.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first fatal error.
    pub async fn drive<S>(&mut self, mut responses: S) -> Result<usize>
    where
        S: Stream<Item = ServerResponse> + Unpin,
    {
        let mut handled = 0;
        while let Some(response) = responses.next().await {
            self.dispatch(response)?;
            handled += 1;
        }
        debug!("Response stream ended after {} responses", handled);
        Ok(handled)
    }

    /// Handle one response.
    ///
    /// # Errors
    ///
    /// Any error returned here is fatal for the session; the owner is
    /// expected to close the transport.
    pub fn dispatch(&mut self, response: ServerResponse) -> Result<()> {
        debug!("<<< {response}");

        if let Some(code) = response.code() {
            self.apply_response_code(code);
        }

        match response {
            state @ (ServerResponse::Greeting { .. } | ServerResponse::StateReply { .. }) => {
                self.handle_state(state)
            }
            unsolicited @ (ServerResponse::Search(_)
            | ServerResponse::Status { .. }
            | ServerResponse::Fetch { .. }
            | ServerResponse::Namespace { .. }) => Err(Error::unexpected(
                format!(
                    "{} reply with no command that could produce it",
                    unsolicited.name()
                ),
                unsolicited,
            )),
            other if !self.state().accepts_data() => Err(Error::unexpected(
                format!("untagged data in state {}", self.state()),
                other,
            )),
            selection @ (ServerResponse::Flags(_) | ServerResponse::NumberResponse { .. })
                if !self.state().accepts_mailbox_data() =>
            {
                Err(Error::unexpected(
                    format!("mailbox data with no mailbox selected ({})", self.state()),
                    selection,
                ))
            }
            ServerResponse::Capability(caps) => {
                self.replace_capabilities(caps);
                Ok(())
            }
            ServerResponse::List(entry) => {
                self.pending_lists.push(entry);
                Ok(())
            }
            ServerResponse::Flags(flags) => {
                self.mailbox.flags = flags;
                Ok(())
            }
            ServerResponse::NumberResponse { kind, number } => {
                self.mailbox.apply(kind, number);
                Ok(())
            }
        }
    }

    fn apply_response_code(&mut self, code: &ResponseCode) {
        match code {
            ResponseCode::Alert(text) => self.observer.on_alert(text),
            ResponseCode::Capabilities(caps) => self.replace_capabilities(caps.iter().cloned()),
            ResponseCode::Other(_) => {}
        }
    }

    fn replace_capabilities(&mut self, caps: impl IntoIterator<Item = String>) {
        self.capabilities = caps.into_iter().collect();
        self.capabilities_fresh = true;
        debug!("Capabilities: {:?}", self.capabilities);
    }

    fn handle_state(&mut self, response: ServerResponse) -> Result<()> {
        // A tagged reply is a completion, whatever state we are in.
        if let Some(tag) = response.tag().cloned() {
            let operation = self.commands.resolve(&tag)?;
            self.commands.remove(&tag);

            return match operation.kind {
                TaskKind::List => {
                    let kind = match response {
                        ServerResponse::StateReply { kind, .. } => kind,
                        _ => StateKind::Ok,
                    };
                    self.finalize_list(&tag, operation.target, kind)
                }
                TaskKind::None => Err(Error::InternalInconsistency(format!(
                    "completion of {tag} has no registered action"
                ))),
            };
        }

        self.machine.handle(response)
    }

    fn finalize_list(&mut self, tag: &Tag, target: NodeId, kind: StateKind) -> Result<()> {
        let entries = std::mem::take(&mut self.pending_lists);

        if kind != StateKind::Ok {
            warn!(
                "LIST {} completed with {}, keeping existing children and dropping {} replies",
                tag,
                kind.as_str(),
                entries.len()
            );
            self.observer.on_warning(&Error::ListFailed {
                tag: tag.clone(),
                kind,
            });
            return Ok(());
        }

        let Some(node) = self.tree.get(target) else {
            self.observer.on_warning(&Error::StaleNode(target));
            return Ok(());
        };

        // Servers may echo the listed mailbox itself as "<name><sep>".
        let self_listing = node.self_listing();
        let label = node.name().unwrap_or("<root>").to_string();
        let entries: Vec<ListEntry> = entries
            .into_iter()
            .filter(|entry| entry.mailbox != self_listing)
            .collect();

        self.observer.on_tree_about_to_change();
        let children = self.tree.replace_children(target, entries);
        self.observer.on_tree_changed();

        let count = children?.len();
        info!("Finalized LIST of {} with {} children", label, count);
        Ok(())
    }
}
