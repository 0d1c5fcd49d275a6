//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from repositories, engagement validation, and worker
//! coordination so clients can bubble them up with consistent context.

use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engage(#[from] EngageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("combat session {0} not found")]
    SessionNotFound(combat_core::SessionId),

    #[error("session state violation")]
    Session(#[from] combat_core::SessionError),

    #[error("scheduler worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("engine builder missing component: {0}")]
    MissingComponent(&'static str),
}

/// Engagement rejections reported to the command dispatcher.
///
/// All of these leave state untouched; the caller turns them into a denial
/// message for the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngageError {
    #[error("you cannot attack yourself")]
    SelfTarget,

    #[error("the dead cannot fight")]
    AttackerDead,

    #[error("{0} is already dead")]
    TargetDead(String),

    #[error("your target is not here")]
    NotColocated,

    #[error("no such combatant: {0}")]
    CombatantNotFound(combat_core::CombatantRef),

    #[error("you are already fighting someone else")]
    AlreadyEngaged,

    #[error("the fight is too chaotic to join right now")]
    Transient,
}
