//! Worker tasks that back the runtime orchestration.
//!
//! Each session worker owns one player's session state, while the
//! announcement worker forwards committed attacks to the public broadcast.

mod announcer;
mod session;

pub use announcer::AnnouncementWorker;
pub use session::{Command, SessionDeps, SessionWorker};
