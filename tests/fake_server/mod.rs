//! Fake server side for session tests
//!
//! Stands in for the wire parser and the presentation layer:
//!
//! - `script` -- builder for the response sequence a server would send
//! - `observer` -- observer that records every notification in order

mod observer;
mod script;

pub use observer::{Event, RecordingObserver};
pub use script::ResponseScript;
