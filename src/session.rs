//! Per-peer reassembly sessions.
//!
//! A session exists for a [`SessionKey`] only while a multi-frame transfer is
//! being accumulated. Session records and their payload chunks both live in
//! the instance's [`MemoryPool`](crate::pool::MemoryPool), so the pool size is
//! the single memory budget of the receive path.

mod payload;
mod table;

pub use payload::CHUNK_CAPACITY;
pub(crate) use payload::ChainChunks;
pub(crate) use table::{Admission, FrameInput, SessionTable};

use self::payload::{PayloadChain, PayloadChunk};
use crate::{
    pool::{BlockIndex, Slot},
    transfer::{CanId, NodeId, PortId, TransferId, TransferKind},
};

/// Identity of a reassembly session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Message, request, or response.
    pub kind: TransferKind,
    /// Subject or service id.
    pub port: PortId,
    /// Source address field of the sending node.
    pub source: NodeId,
}

impl From<&CanId> for SessionKey {
    fn from(id: &CanId) -> Self {
        Self {
            kind: id.kind,
            port: id.port,
            source: id.source,
        }
    }
}

/// Content of one pool block on the receive path.
///
/// Opaque to callers; they only ever create vacant [`RxSlot`]s.
#[derive(Debug)]
pub struct RxBlock(BlockContent);

#[derive(Debug)]
enum BlockContent {
    Session(RxSession),
    Chunk(PayloadChunk),
}

/// Storage slot type handed to [`RxInstance::new`](crate::RxInstance::new).
///
/// ```
/// use canrx::session::RxSlot;
///
/// let storage: [RxSlot; 32] = [const { RxSlot::VACANT }; 32];
/// assert_eq!(storage.len(), 32);
/// ```
pub type RxSlot = Slot<RxBlock>;

/// An active reassembly session.
#[derive(Debug)]
struct RxSession {
    key: SessionKey,
    /// Next session in the table's list.
    next: Option<BlockIndex>,
    transfer_id: TransferId,
    next_toggle: bool,
    started_at: u64,
    last_frame_at: u64,
    payload: PayloadChain,
}

impl RxSession {
    fn is_expired(&self, now: u64, timeout: u64) -> bool {
        // Wrapping subtraction: a timestamp behind `last_frame_at` reads as
        // a huge forward jump and expires the session.
        now.wrapping_sub(self.last_frame_at) > timeout
    }
}

#[cfg(test)]
mod tests;
