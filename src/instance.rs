//! The frame admission pipeline.
//!
//! [`RxInstance`] owns a session table built over caller storage together
//! with the two collaborator hooks. Each call to
//! [`handle_rx_frame`](RxInstance::handle_rx_frame) runs the frame through a
//! fixed sequence of gates and stops at the first one that fails:
//!
//! 1. structural validity (extended data frame, non-empty, version bit),
//! 2. destination check for service transfers,
//! 3. the acceptance filter,
//! 4. the session state machine.
//!
//! Only the last gate touches session state. A completed transfer is handed
//! to the [`TransferHandler`] before the call returns and its blocks go back
//! to the pool right after.

use crate::{
    config::RxConfig,
    error::{RxError, RxStatus},
    frame::CanFrame,
    hooks::{AcceptanceFilter, TransferHandler},
    metrics,
    pool::PoolStats,
    session::{Admission, FrameInput, RxSlot, SessionKey, SessionTable},
    transfer::{CanId, NodeId, Payload, RxTransfer, TailByte},
};

/// One independent receive engine.
///
/// There is no global state: several instances may run side by side, each
/// with its own storage. An instance is not internally synchronised; share
/// it between execution contexts behind a single lock around every call.
///
/// # Examples
///
/// ```
/// use canrx::{
///     RxConfig, RxInstance, RxStatus,
///     frame::{CAN_FRAME_EFF, CanFrame},
///     hooks::AcceptAll,
///     session::RxSlot,
///     transfer::RxTransfer,
/// };
///
/// let mut storage: [RxSlot; 16] = [const { RxSlot::VACANT }; 16];
/// let mut received = Vec::new();
/// let mut rx = RxInstance::new(
///     &mut storage,
///     RxConfig::default(),
///     AcceptAll,
///     |transfer: &RxTransfer<'_>| received.push(transfer.payload.to_vec()),
/// );
///
/// // Message on subject 100 from node 3, single frame, transfer id 0.
/// let id = CAN_FRAME_EFF | (100 << 8) | (3 << 1) | 1;
/// let frame = CanFrame::new(id, &[0xAA, 0xBB, 0xE0]).expect("fits in one frame");
/// assert_eq!(rx.handle_rx_frame(&frame, 0), Ok(RxStatus::Delivered));
/// drop(rx);
/// assert_eq!(received, vec![vec![0xAA, 0xBB]]);
/// ```
pub struct RxInstance<'a, F, H> {
    table: SessionTable<'a>,
    config: RxConfig,
    filter: F,
    handler: H,
}

impl<'a, F, H> RxInstance<'a, F, H>
where
    F: AcceptanceFilter,
    H: TransferHandler,
{
    /// Build an instance whose pool is carved out of `storage`.
    ///
    /// `storage` is the instance's entire memory budget: every session
    /// record and every payload chunk occupies one slot.
    pub fn new(storage: &'a mut [RxSlot], config: RxConfig, filter: F, handler: H) -> Self {
        let table = SessionTable::new(storage);
        log::debug!(
            "rx instance created: blocks={}, timeout={}, local_node_id={:?}",
            table.pool_stats().capacity,
            config.transfer_timeout,
            config.local_node_id
        );
        Self {
            table,
            config,
            filter,
            handler,
        }
    }

    /// Admit one frame received at `timestamp`.
    ///
    /// Returns [`RxStatus::Delivered`] when the frame completed a transfer
    /// (the handler has already run) and [`RxStatus::InProgress`] when it
    /// was absorbed into an unfinished one.
    ///
    /// # Errors
    ///
    /// Returns the [`RxError`] of the first gate the frame failed. Only an
    /// expiry detected on this frame changes session state on failure.
    pub fn handle_rx_frame(
        &mut self,
        frame: &CanFrame,
        timestamp: u64,
    ) -> Result<RxStatus, RxError> {
        let result = self.admit(frame, timestamp);
        if let Err(error) = result {
            log::debug!(
                "frame rejected: error={error}, code={}, id={:#010x}, len={}, timestamp={timestamp}",
                error.code(),
                frame.id,
                frame.data_len
            );
        }
        metrics::inc_frames(result.map(|_| ()));
        metrics::set_pool_used(self.table.pool_stats().used);
        result
    }

    fn admit(&mut self, frame: &CanFrame, timestamp: u64) -> Result<RxStatus, RxError> {
        if !frame.is_well_formed() {
            return Err(RxError::IncompatiblePacket);
        }
        let Some((&tail, data)) = frame.payload().split_last() else {
            return Err(RxError::IncompatiblePacket);
        };
        let id = CanId::decode(frame.extended_id());
        if self.config.require_version_bit && !id.version_bit {
            return Err(RxError::IncompatiblePacket);
        }
        if let (Some(local), Some(destination)) = (self.config.local_node_id, id.destination)
            && local != destination
        {
            return Err(RxError::WrongAddress);
        }
        if !self.filter.accept(id.port, id.kind, id.source) {
            return Err(RxError::NotWanted);
        }

        let tail = TailByte::decode(tail);
        let input = FrameInput {
            key: SessionKey::from(&id),
            tail,
            data,
            full_length: frame.is_full_length(),
            timestamp,
        };
        match self.table.accept(input, self.config.transfer_timeout)? {
            Admission::InProgress => Ok(RxStatus::InProgress),
            Admission::Single(bytes) => {
                let transfer = assemble(&id, tail, timestamp, Payload::inline(bytes));
                deliver(&mut self.handler, &transfer);
                Ok(RxStatus::Delivered)
            }
            Admission::Complete(index) => {
                let delivered = if let Some(done) = self.table.completed(index) {
                    let transfer = assemble(&id, tail, done.started_at, done.payload);
                    deliver(&mut self.handler, &transfer);
                    true
                } else {
                    log::warn!("completed session {index:?} has no record; transfer dropped");
                    false
                };
                self.table.remove(index);
                debug_assert!(delivered, "completed session {index:?} has no record");
                Ok(RxStatus::Delivered)
            }
        }
    }

    /// Drop every session idle for longer than the transfer timeout as of
    /// `now`, returning how many were removed.
    ///
    /// Expiry is otherwise only noticed when a continuation frame arrives
    /// for the stale session; call this periodically to reclaim blocks held
    /// by abandoned transfers.
    pub fn purge_expired(&mut self, now: u64) -> usize {
        let purged = self.table.purge_expired(now, self.config.transfer_timeout);
        if purged > 0 {
            tracing::debug!(purged, now, "stale sessions purged");
        }
        metrics::set_pool_used(self.table.pool_stats().used);
        purged
    }
}

impl<F, H> RxInstance<'_, F, H> {
    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &RxConfig { &self.config }

    /// Local node address, if one is set.
    #[must_use]
    pub const fn local_node_id(&self) -> Option<NodeId> { self.config.local_node_id }

    /// Assign the local node address; service transfers addressed elsewhere
    /// are rejected from now on.
    pub fn set_local_node_id(&mut self, node_id: NodeId) {
        log::debug!("local node id set: {node_id}");
        self.config.local_node_id = Some(node_id);
    }

    /// Return to anonymous operation.
    pub fn clear_local_node_id(&mut self) {
        log::debug!("local node id cleared");
        self.config.local_node_id = None;
    }

    /// Pool occupancy including the high-water mark.
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats { self.table.pool_stats() }

    /// Blocks currently available for new sessions and payload.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        let stats = self.table.pool_stats();
        stats.capacity - stats.used
    }

    /// Number of transfers currently being reassembled.
    #[must_use]
    pub const fn active_sessions(&self) -> usize { self.table.len() }

    /// The acceptance filter.
    #[must_use]
    pub const fn filter(&self) -> &F { &self.filter }

    /// The delivery handler.
    #[must_use]
    pub const fn handler(&self) -> &H { &self.handler }

    /// Mutable access to the delivery handler.
    pub fn handler_mut(&mut self) -> &mut H { &mut self.handler }

    /// Tear the instance down, releasing the storage borrow and returning
    /// the handler.
    #[must_use]
    pub fn into_handler(self) -> H { self.handler }
}

fn assemble<'p>(
    id: &CanId,
    tail: TailByte,
    timestamp: u64,
    payload: Payload<'p>,
) -> RxTransfer<'p> {
    RxTransfer {
        kind: id.kind,
        port: id.port,
        priority: id.priority,
        source: id.committed_source(),
        destination: id.destination,
        transfer_id: tail.transfer_id,
        timestamp,
        payload,
    }
}

fn deliver<H: TransferHandler>(handler: &mut H, transfer: &RxTransfer<'_>) {
    log::trace!(
        "delivering {} on port {}: source={:?}, transfer_id={}, len={}",
        transfer.kind,
        transfer.port,
        transfer.source.map(NodeId::get),
        transfer.transfer_id,
        transfer.payload.len()
    );
    metrics::inc_delivered(transfer.kind);
    handler.on_transfer(transfer);
}
