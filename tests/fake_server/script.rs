//! Builder for server response sequences
//!
//! ```ignore
//! let responses = ResponseScript::new()
//!     .greeting(GreetingKind::Preauth)
//!     .list("INBOX")
//!     .ok("A1")
//!     .build();
//! ```

use mailbox_session::{GreetingKind, ResponseCode, ServerResponse, StateKind};
use std::collections::VecDeque;

pub struct ResponseScript {
    responses: VecDeque<ServerResponse>,
}

#[allow(dead_code)]
impl ResponseScript {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
        }
    }

    pub fn response(mut self, response: ServerResponse) -> Self {
        self.responses.push_back(response);
        self
    }

    pub fn greeting(self, kind: GreetingKind) -> Self {
        self.response(ServerResponse::greeting(kind))
    }

    /// Tagged OK completion.
    pub fn ok(self, tag: &str) -> Self {
        self.response(ServerResponse::tagged(tag, StateKind::Ok))
    }

    /// Tagged NO completion.
    pub fn no(self, tag: &str) -> Self {
        self.response(ServerResponse::tagged(tag, StateKind::No))
    }

    pub fn untagged(self, kind: StateKind) -> Self {
        self.response(ServerResponse::untagged(kind))
    }

    /// Untagged LIST with `.` as separator.
    pub fn list(self, mailbox: &str) -> Self {
        self.response(ServerResponse::list(mailbox, '.'))
    }

    pub fn capability(self, caps: &[&str]) -> Self {
        self.response(ServerResponse::Capability(
            caps.iter().map(ToString::to_string).collect(),
        ))
    }

    /// Untagged OK carrying an `[ALERT]`.
    pub fn alert(self, text: &str) -> Self {
        self.response(
            ServerResponse::untagged(StateKind::Ok).with_code(ResponseCode::Alert(text.into())),
        )
    }

    pub fn build(self) -> VecDeque<ServerResponse> {
        self.responses
    }
}
