//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or infrastructure.

pub mod errors;
pub mod handle;
pub mod registry;
pub mod views;

pub use errors::{ErrorKind, Result, RuntimeError};
pub use handle::SessionHandle;
pub use registry::SessionRegistry;
pub use views::{AttackReport, SessionView};
