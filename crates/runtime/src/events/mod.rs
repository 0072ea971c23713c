//! Topic-based event bus for runtime events.
//!
//! Session workers and the resolver publish here after state has been
//! committed; consumers such as the announcement worker subscribe only to
//! the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AttackEvent, SessionEvent};
