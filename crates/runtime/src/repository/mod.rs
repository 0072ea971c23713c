//! Key-value persistence for per-player game state.
//!
//! Three namespaces are stored per player: HP, win count and a bounded
//! attack log. [`GameStore`] is the single mutation entry point for each;
//! backends decide how atomic each operation can be.

mod error;
pub mod keys;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;
mod traits;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use traits::GameStore;
