//! Runtime orchestration for the attack game.
//!
//! This crate wires the pure rules of `game-core` to persistence, the
//! external player directory, and per-session worker tasks. Consumers embed
//! [`GameRuntime`] to start sessions and drive them through
//! [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`resolver`] and [`leaderboard`] implement attack resolution and ranking
//! - [`repository`] and [`directory`] provide the data and lookup adapters
//! - workers stay internal to the crate
pub mod api;
pub mod directory;
pub mod events;
pub mod leaderboard;
pub mod repository;
pub mod resolver;
pub mod runtime;

mod workers;

pub use api::{
    AttackReport, ErrorKind, Result, RuntimeError, SessionHandle, SessionRegistry, SessionView,
};
pub use directory::{
    Broadcaster, Directory, DirectoryError, LogBroadcaster, NeynarClient, NeynarConfig, Profile,
    StaticDirectory,
};
pub use events::{AttackEvent, Event, EventBus, SessionEvent, Topic};
pub use leaderboard::Leaderboard;
#[cfg(feature = "redis")]
pub use repository::RedisStore;
pub use repository::{GameStore, InMemoryStore, StoreError};
pub use resolver::{AttackOutcome, AttackResolver, Retaliation, timestamp_now};
pub use runtime::{GameRuntime, GameRuntimeBuilder, RuntimeConfig};
