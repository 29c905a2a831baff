//! Interactive conversation loop.

pub mod input;
pub mod session;
pub mod sink;

pub use input::{ConsoleInput, ScriptedInput, UserInput};
pub use session::{Session, SessionState};
pub use sink::{CliSessionSink, NullSessionSink, RecordingSessionSink, SessionEvent, SessionSink};
