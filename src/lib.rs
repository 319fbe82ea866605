//! IMAP client session core
//!
//! Tracks the connection state across the IMAP lifecycle, correlates
//! tagged completions with the commands that caused them, and builds an
//! in-memory mailbox hierarchy from `LIST` replies.
//!
//! Parsing the wire, sending commands and drawing the tree are left to
//! collaborators; see [`ResponseSource`], [`CommandIssuer`] and
//! [`SessionObserver`].
//!
//! ```
//! use mailbox_session::{GreetingKind, SequentialIssuer, ServerResponse, Session, StateKind};
//!
//! let mut session = Session::new();
//! let mut issuer = SequentialIssuer::default();
//! session.dispatch(ServerResponse::greeting(GreetingKind::Preauth))?;
//!
//! let root = session.tree().root();
//! let tag = session.request_children(&mut issuer, root)?;
//! session.dispatch(ServerResponse::list("INBOX", '.'))?;
//! session.dispatch(ServerResponse::tagged(tag, StateKind::Ok))?;
//!
//! assert_eq!(session.tree().children_of(root)?.len(), 1);
//! # Ok::<(), mailbox_session::Error>(())
//! ```

mod command;
mod config;
mod error;
mod flag;
mod issuer;
pub mod replay;
mod response;
mod session;
mod source;
mod state;
mod tree;

pub use command::{CommandTable, PendingOperation, TaskKind};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use flag::Flag;
pub use issuer::{IssuedCommand, SequentialIssuer};
pub use response::{
    GreetingKind, ListEntry, NamespaceEntry, NumberKind, ResponseCode, ServerResponse, StateKind,
    Tag,
};
pub use session::{MailboxStatus, Session};
pub use source::{CommandIssuer, NoopObserver, ResponseSource, SessionObserver};
pub use state::{ConnectionState, ConnectionStateMachine};
pub use tree::{DataRole, MailboxNode, MailboxSnapshot, MailboxTree, NodeData, NodeId};
