//! Completed transfers as handed to the delivery handler.

use std::fmt;

use super::{NodeId, PortId, Priority, TransferId, TransferKind};
use crate::{
    pool::{BlockIndex, MemoryPool},
    session::{ChainChunks, RxBlock},
};

/// A fully reassembled transfer.
///
/// The payload borrows instance memory; it is only valid for the duration of
/// the [`TransferHandler`](crate::hooks::TransferHandler) call. Copy the
/// bytes out with [`Payload::to_vec`] or [`Payload::copy_to_slice`] to keep
/// them.
#[derive(Clone, Debug)]
pub struct RxTransfer<'a> {
    /// Message, request, or response.
    pub kind: TransferKind,
    /// Subject or service id.
    pub port: PortId,
    /// Priority of the completing frame.
    pub priority: Priority,
    /// Sending node; `None` for anonymous messages.
    pub source: Option<NodeId>,
    /// Addressed node; only present for service transfers.
    pub destination: Option<NodeId>,
    /// Transfer sequence number.
    pub transfer_id: TransferId,
    /// Arrival timestamp of the first frame.
    pub timestamp: u64,
    /// Reassembled payload, tail bytes excluded.
    pub payload: Payload<'a>,
}

/// Borrowed view over a transfer's payload bytes.
///
/// Single-frame payloads point straight into the received frame;
/// multi-frame payloads walk the session's chunk chain in the pool.
#[derive(Clone)]
pub struct Payload<'a>(Repr<'a>);

#[derive(Clone)]
enum Repr<'a> {
    Inline(&'a [u8]),
    Chained {
        pool: &'a MemoryPool<'a, RxBlock>,
        head: Option<BlockIndex>,
        len: usize,
    },
}

impl<'a> Payload<'a> {
    pub(crate) const fn inline(bytes: &'a [u8]) -> Self { Self(Repr::Inline(bytes)) }

    pub(crate) const fn chained(
        pool: &'a MemoryPool<'a, RxBlock>,
        head: Option<BlockIndex>,
        len: usize,
    ) -> Self {
        Self(Repr::Chained { pool, head, len })
    }

    /// Total payload length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self.0 {
            Repr::Inline(bytes) => bytes.len(),
            Repr::Chained { len, .. } => len,
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len() == 0 }

    /// Iterate over the contiguous pieces of the payload in order.
    #[must_use]
    pub fn chunks(&self) -> Chunks<'a> {
        match self.0 {
            Repr::Inline(bytes) => Chunks(ChunksRepr::Inline(Some(bytes))),
            Repr::Chained { pool, head, .. } => {
                Chunks(ChunksRepr::Chained(ChainChunks::new(pool, head)))
            }
        }
    }

    /// Iterate over individual payload bytes.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + use<'a> {
        self.chunks().flat_map(|chunk| chunk.iter().copied())
    }

    /// Copy the payload into `out`, truncating if `out` is shorter.
    /// Returns the number of bytes written.
    pub fn copy_to_slice(&self, out: &mut [u8]) -> usize {
        let mut written = 0;
        for chunk in self.chunks() {
            let count = chunk.len().min(out.len() - written);
            out[written..written + count].copy_from_slice(&chunk[..count]);
            written += count;
            if written == out.len() {
                break;
            }
        }
        written
    }

    /// Copy the payload into an owned buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("len", &self.len()).finish()
    }
}

impl PartialEq<[u8]> for Payload<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.len() == other.len() && self.bytes().eq(other.iter().copied())
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Payload<'_> {
    fn eq(&self, other: &[u8; N]) -> bool { *self == other[..] }
}

/// Iterator returned by [`Payload::chunks`].
#[derive(Clone, Debug)]
pub struct Chunks<'a>(ChunksRepr<'a>);

#[derive(Clone, Debug)]
enum ChunksRepr<'a> {
    Inline(Option<&'a [u8]>),
    Chained(ChainChunks<'a>),
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            ChunksRepr::Inline(bytes) => bytes.take().filter(|bytes| !bytes.is_empty()),
            ChunksRepr::Chained(chain) => chain.next(),
        }
    }
}
