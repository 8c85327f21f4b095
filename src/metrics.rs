//! Metric helpers for `canrx`.
//!
//! This module defines metric names and small helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

use crate::{error::RxError, transfer::TransferKind};

/// Name of the counter tracking admitted frames by outcome.
pub const FRAMES_TOTAL: &str = "canrx_frames_total";
/// Name of the counter tracking delivered transfers by kind.
pub const TRANSFERS_DELIVERED: &str = "canrx_transfers_delivered_total";
/// Name of the gauge tracking occupied pool blocks.
pub const POOL_BLOCKS_USED: &str = "canrx_pool_blocks_used";

/// Outcome label recorded for accepted frames.
pub const OUTCOME_OK: &str = "ok";

/// Record one frame passing through admission.
pub fn inc_frames(result: Result<(), RxError>) {
    let outcome = match result {
        Ok(()) => OUTCOME_OK,
        Err(error) => error.label(),
    };
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "outcome" => outcome).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a delivered transfer.
pub fn inc_delivered(kind: TransferKind) {
    #[cfg(feature = "metrics")]
    counter!(TRANSFERS_DELIVERED, "kind" => kind.label()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Publish current pool occupancy.
#[cfg_attr(
    feature = "metrics",
    expect(
        clippy::cast_precision_loss,
        reason = "pool sizes are bounded by u16::MAX and fit exactly in f64"
    )
)]
pub fn set_pool_used(used: usize) {
    #[cfg(feature = "metrics")]
    gauge!(POOL_BLOCKS_USED).set(used as f64);
    #[cfg(not(feature = "metrics"))]
    let _ = used;
}
