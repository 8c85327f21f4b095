//! Error taxonomy for frame admission.
//!
//! Every rejection is local and recoverable; the caller decides whether to
//! count, log, or ignore it. Each variant carries a stable numeric code so
//! drivers written against integer status returns can keep doing so.

use thiserror::Error;

use crate::pool::PoolExhausted;

/// Reasons a frame was not admitted.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum RxError {
    /// The pool had no free block for the session or its payload.
    #[error("memory pool exhausted")]
    OutOfMemory,
    /// Wrong frame format flags, empty payload, or missing version bit.
    #[error("incompatible packet")]
    IncompatiblePacket,
    /// A service transfer addressed to another node.
    #[error("service transfer addressed to another node")]
    WrongAddress,
    /// The acceptance filter declined the transfer.
    #[error("transfer not wanted")]
    NotWanted,
    /// Continuation frame without a live session to continue.
    #[error("missed start of transfer")]
    MissedStart,
    /// Continuation frame whose toggle bit breaks the alternation.
    #[error("wrong toggle bit")]
    WrongToggle,
    /// Continuation frame carrying a different transfer id.
    #[error("unexpected transfer id")]
    UnexpectedTransferId,
    /// Non-final frame shorter than a full frame.
    #[error("short non-final frame")]
    ShortFrame,
}

impl RxError {
    /// Stable negative status code for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use canrx::RxError;
    ///
    /// assert_eq!(RxError::MissedStart.code(), -13);
    /// ```
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::OutOfMemory => -3,
            Self::IncompatiblePacket => -10,
            Self::WrongAddress => -11,
            Self::NotWanted => -12,
            Self::MissedStart => -13,
            Self::WrongToggle => -14,
            Self::UnexpectedTransferId => -15,
            Self::ShortFrame => -16,
        }
    }

    /// Short label used for metrics and structured logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfMemory => "out_of_memory",
            Self::IncompatiblePacket => "incompatible_packet",
            Self::WrongAddress => "wrong_address",
            Self::NotWanted => "not_wanted",
            Self::MissedStart => "missed_start",
            Self::WrongToggle => "wrong_toggle",
            Self::UnexpectedTransferId => "unexpected_transfer_id",
            Self::ShortFrame => "short_frame",
        }
    }
}

impl From<PoolExhausted> for RxError {
    fn from(_: PoolExhausted) -> Self { Self::OutOfMemory }
}

/// Successful admission outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RxStatus {
    /// The frame was absorbed into an ongoing transfer.
    InProgress,
    /// The frame completed a transfer and the handler was invoked.
    Delivered,
}

impl RxStatus {
    /// Status code for success; always zero.
    #[must_use]
    pub const fn code(self) -> i16 { 0 }
}
