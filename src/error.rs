//! Error types for mailbox-session

use crate::response::{ServerResponse, StateKind, Tag};
use crate::tree::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The server sent something that is illegal in the current state or
    /// for the commands currently outstanding.
    #[error("Unexpected response ({context}): {response}")]
    UnexpectedResponse {
        context: String,
        response: Box<ServerResponse>,
    },

    /// A tagged completion referenced a tag we never issued (or already
    /// completed).
    #[error("Unknown tag in tagged response: {tag}")]
    UnknownTag { tag: Tag },

    #[error("Tag registered twice: {tag}")]
    DuplicateTag { tag: Tag },

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Not implemented: {feature}")]
    Unimplemented { feature: &'static str },

    /// A LIST completed with NO or BAD; the listed node keeps its children.
    #[error("LIST {tag} completed with {}", kind.as_str())]
    ListFailed { tag: Tag, kind: StateKind },

    #[error("Mailbox node {0} is no longer part of the tree")]
    StaleNode(NodeId),

    #[error("No response available")]
    SourceExhausted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unexpected(context: impl Into<String>, response: ServerResponse) -> Self {
        Self::UnexpectedResponse {
            context: context.into(),
            response: Box::new(response),
        }
    }

    /// Whether the session has to be torn down after this error.
    ///
    /// The unfinished-feature marker and a refused LIST are non-fatal;
    /// everything else aborts dispatch of the current response.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Unimplemented { .. } | Self::ListFailed { .. })
    }

    /// Whether the peer caused this error, as opposed to a local bug or
    /// local misuse.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedResponse { .. } | Self::UnknownTag { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
