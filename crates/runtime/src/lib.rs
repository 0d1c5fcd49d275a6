//! Async combat runtime: orchestration around the pure `combat-core`.
//!
//! This crate owns everything with a side effect: persistence behind
//! repository traits, the session-resolving `engage` entry point, the
//! per-round tick scheduler, outbound event publishing, and configuration
//! loading. The deterministic mechanics (dice, attack resolution, NPC
//! policy, session state machine) live in `combat-core` and are driven
//! from here with real clocks, real randomness, and real storage.
//!
//! Typical wiring:
//! 1. Build a [`CombatEngine`] with repositories, a [`WorldOracle`], and a
//!    [`Publisher`] (the broadcast [`EventBus`] works for in-process use).
//! 2. Route player attack commands to [`CombatEngine::engage`].
//! 3. Spawn a [`TickWorker`] to advance every active session each round.

pub mod config;
pub mod dice;
pub mod engine;
pub mod error;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod scheduler;

pub use config::{ConfigError, RuntimeConfig, load_balance_tables};
pub use dice::ThreadRngDice;
pub use engine::{CombatEngine, CombatEngineBuilder, EngageOutcome, SessionLocks, TickReport};
pub use error::{EngageError, Result, RuntimeError};
pub use events::{CombatEvent, Envelope, EventBus, Publisher, Scope};
pub use oracle::{StaticWorld, WorldOracle};
pub use repository::{
    ActionLogRepository, CombatantRepository, InMemoryActionLog, InMemoryCombatantRepo,
    InMemoryParticipantRepo, InMemorySessionRepo, ParticipantRepository, RepositoryError,
    SessionRepository,
};
pub use scheduler::{TickWorker, wall_clock};
