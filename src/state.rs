//! Connection state machine
//!
//! Tracks where the session is in the IMAP lifecycle and decides which
//! untagged state responses are legal there:
//!
//! ```text
//! Established   --OK greeting------> NotAuthenticated --login--> Authenticated
//! Established   --PREAUTH greeting-> Authenticated
//! Established   --BYE greeting-----> Logout
//! Authenticated --select-----------> Selecting --untagged status--> Selected
//! Selected      --select-----------> Selecting
//! Authenticated, Selecting, Selected --untagged BYE--> Logout
//! ```
//!
//! Logout is terminal. Anything reaching the machine after that is a
//! protocol error.

use crate::error::{Error, Result};
use crate::response::{GreetingKind, ServerResponse, StateKind};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Transport is up, greeting not seen yet.
    #[default]
    Established,
    NotAuthenticated,
    Authenticated,
    Selecting,
    Selected,
    Logout,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Established => "established",
            Self::NotAuthenticated => "not authenticated",
            Self::Authenticated => "authenticated",
            Self::Selecting => "selecting",
            Self::Selected => "selected",
            Self::Logout => "logout",
        }
    }

    /// Whether untagged data responses (CAPABILITY, LIST, FLAGS, ...)
    /// may arrive in this state.
    #[must_use]
    pub const fn accepts_data(self) -> bool {
        !matches!(self, Self::Established | Self::Logout)
    }

    /// Whether FLAGS and EXISTS/RECENT/EXPUNGE may arrive in this state.
    #[must_use]
    pub const fn accepts_mailbox_data(self) -> bool {
        matches!(self, Self::Selecting | Self::Selected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct ConnectionStateMachine {
    state: ConnectionState,
}

impl ConnectionStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Route an untagged state response (or the greeting) to the handler
    /// of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResponse`] if the response is illegal in
    /// the current state. The state is left unchanged in that case.
    pub fn handle(&mut self, response: ServerResponse) -> Result<()> {
        match self.state {
            ConnectionState::Established => match response {
                ServerResponse::Greeting { kind, .. } => {
                    self.handle_greeting(kind);
                    Ok(())
                }
                other => Err(Error::unexpected(
                    "waiting for the server greeting",
                    other,
                )),
            },
            ConnectionState::NotAuthenticated => Err(Error::unexpected(
                "no untagged state response is legal before authentication",
                response,
            )),
            ConnectionState::Authenticated => self.handle_authenticated(response),
            ConnectionState::Selecting => self.handle_selecting(response),
            ConnectionState::Selected => self.handle_selected(response),
            ConnectionState::Logout => Err(Error::unexpected(
                "received after logout",
                response,
            )),
        }
    }

    /// The authenticator finished a successful LOGIN/AUTHENTICATE.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInconsistency`] unless the session is
    /// waiting for authentication.
    pub fn authenticated(&mut self) -> Result<()> {
        if self.state != ConnectionState::NotAuthenticated {
            return Err(Error::InternalInconsistency(format!(
                "authentication completed in state {}",
                self.state
            )));
        }
        self.transition(ConnectionState::Authenticated);
        Ok(())
    }

    /// A SELECT/EXAMINE was issued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInconsistency`] unless a mailbox may be
    /// selected in the current state.
    pub fn begin_select(&mut self) -> Result<()> {
        match self.state {
            ConnectionState::Authenticated | ConnectionState::Selected => {
                self.transition(ConnectionState::Selecting);
                Ok(())
            }
            state => Err(Error::InternalInconsistency(format!(
                "mailbox selection started in state {state}"
            ))),
        }
    }

    fn handle_greeting(&mut self, kind: GreetingKind) {
        let next = match kind {
            GreetingKind::Preauth => ConnectionState::Authenticated,
            GreetingKind::Ok => ConnectionState::NotAuthenticated,
            GreetingKind::Bye => ConnectionState::Logout,
        };
        self.transition(next);
    }

    fn handle_authenticated(&mut self, response: ServerResponse) -> Result<()> {
        match response {
            ServerResponse::StateReply {
                kind: StateKind::Ok | StateKind::No | StateKind::Bad,
                ..
            } => Ok(()),
            ServerResponse::StateReply {
                kind: StateKind::Bye,
                ..
            } => {
                self.transition(ConnectionState::Logout);
                Ok(())
            }
            other => Err(Error::unexpected("not legal in authenticated state", other)),
        }
    }

    fn handle_selecting(&mut self, response: ServerResponse) -> Result<()> {
        match response {
            ServerResponse::StateReply {
                kind: StateKind::Ok | StateKind::No | StateKind::Bad,
                ..
            } => {
                self.transition(ConnectionState::Selected);
                Ok(())
            }
            ServerResponse::StateReply {
                kind: StateKind::Bye,
                ..
            } => {
                self.transition(ConnectionState::Logout);
                Ok(())
            }
            other => Err(Error::unexpected("not legal while selecting a mailbox", other)),
        }
    }

    fn handle_selected(&mut self, response: ServerResponse) -> Result<()> {
        match response {
            ServerResponse::StateReply {
                kind: StateKind::Ok | StateKind::No | StateKind::Bad,
                ..
            } => Ok(()),
            ServerResponse::StateReply {
                kind: StateKind::Bye,
                ..
            } => {
                self.transition(ConnectionState::Logout);
                Ok(())
            }
            other => Err(Error::unexpected("not legal in selected state", other)),
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        info!("Connection state {} -> {}", self.state, next);
        self.state = next;
    }
}
