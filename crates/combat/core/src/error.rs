//! Core error types.

use crate::types::{ParticipantId, SessionId};

/// Invalid combat-session transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{session} has already ended")]
    AlreadyEnded { session: SessionId },

    #[error("{session} is not active")]
    NotActive { session: SessionId },

    #[error("{participant} already left its session")]
    AlreadyLeft { participant: ParticipantId },
}
