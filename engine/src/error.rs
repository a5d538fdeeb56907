//! Error kinds returned to clients, plus the internal fatal-abort class.

use thiserror::Error;

/// All validation errors are recoverable: the rejecting command leaves
/// table state unchanged. `Fatal` is a programming-error signal raised only
/// for violated internal invariants (empty deck mid-deal, conservation
/// check failure); callers abort the hand and restore stacks rather than
/// surfacing it as an ordinary ack error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("not-seated")]
    NotSeated,
    #[error("not-owner")]
    NotOwner,
    #[error("not-your-turn")]
    NotYourTurn,
    #[error("already-folded")]
    AlreadyFolded,
    #[error("invalid-seat")]
    InvalidSeat,
    #[error("seat-occupied")]
    SeatOccupied,
    #[error("no-username")]
    NoUsername,
    #[error("not-enough-players")]
    NotEnoughPlayers,
    #[error("not-in-betting-phase")]
    NotInBettingPhase,
    #[error("invalid-amount")]
    InvalidAmount,
    #[error("raise-below-minimum")]
    RaiseBelowMinimum,
    #[error("insufficient-chips")]
    InsufficientChips,
    #[error("cannot-check")]
    CannotCheck,
    #[error("unknown-action")]
    UnknownAction,
    #[error("internal invariant violated: {0}")]
    Fatal(String),
}

impl EngineError {
    /// The wire-level error-kind tag from spec §7, or `None` for `Fatal`
    /// (which is never forwarded to a client as an ack).
    pub fn wire_kind(&self) -> Option<&'static str> {
        Some(match self {
            EngineError::NotSeated => "not-seated",
            EngineError::NotOwner => "not-owner",
            EngineError::NotYourTurn => "not-your-turn",
            EngineError::AlreadyFolded => "already-folded",
            EngineError::InvalidSeat => "invalid-seat",
            EngineError::SeatOccupied => "seat-occupied",
            EngineError::NoUsername => "no-username",
            EngineError::NotEnoughPlayers => "not-enough-players",
            EngineError::NotInBettingPhase => "not-in-betting-phase",
            EngineError::InvalidAmount => "invalid-amount",
            EngineError::RaiseBelowMinimum => "raise-below-minimum",
            EngineError::InsufficientChips => "insufficient-chips",
            EngineError::CannotCheck => "cannot-check",
            EngineError::UnknownAction => "unknown-action",
            EngineError::Fatal(_) => return None,
        })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Fatal(_))
    }
}
