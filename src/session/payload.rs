//! Payload chains: transfer bytes accumulated in linked pool blocks.

use super::{BlockContent, RxBlock};
use crate::{
    frame::FRAME_DATA_CAPACITY,
    pool::{BlockIndex, MemoryPool, PoolExhausted},
};

/// Payload bytes held by one pool block.
pub const CHUNK_CAPACITY: usize = 40;

// One frame's worth of data never spans more than one fresh chunk, which is
// what lets `PayloadChain::append` reserve before it writes.
const _: () = assert!(FRAME_DATA_CAPACITY <= CHUNK_CAPACITY);

#[derive(Debug)]
pub(crate) struct PayloadChunk {
    next: Option<BlockIndex>,
    len: u8,
    data: [u8; CHUNK_CAPACITY],
}

impl PayloadChunk {
    const fn empty() -> Self {
        Self {
            next: None,
            len: 0,
            data: [0; CHUNK_CAPACITY],
        }
    }

    fn bytes(&self) -> &[u8] { &self.data[..usize::from(self.len)] }

    fn room(&self) -> usize { CHUNK_CAPACITY - usize::from(self.len) }

    /// Copy as much of `bytes` as fits, returning the count written.
    fn fill(&mut self, bytes: &[u8]) -> usize {
        let start = usize::from(self.len);
        let count = bytes.len().min(self.room());
        self.data[start..start + count].copy_from_slice(&bytes[..count]);
        // CHUNK_CAPACITY fits in u8, so the sum does too.
        self.len = u8::try_from(start + count).unwrap_or(u8::MAX);
        count
    }
}

/// Ownership record for a session's chunk list.
#[derive(Debug, Default)]
pub(crate) struct PayloadChain {
    head: Option<BlockIndex>,
    tail: Option<BlockIndex>,
    len: usize,
}

fn chunk<'p>(
    pool: &'p MemoryPool<'_, RxBlock>,
    index: BlockIndex,
) -> Option<&'p PayloadChunk> {
    match pool.get(index) {
        Some(RxBlock(BlockContent::Chunk(chunk))) => Some(chunk),
        _ => None,
    }
}

fn chunk_mut<'p>(
    pool: &'p mut MemoryPool<'_, RxBlock>,
    index: BlockIndex,
) -> Option<&'p mut PayloadChunk> {
    match pool.get_mut(index) {
        Some(RxBlock(BlockContent::Chunk(chunk))) => Some(chunk),
        _ => None,
    }
}

impl PayloadChain {
    pub(crate) const fn len(&self) -> usize { self.len }

    pub(crate) const fn head(&self) -> Option<BlockIndex> { self.head }

    /// Append `bytes` (at most one frame's data) to the chain.
    ///
    /// Any block the append needs is reserved before a single byte is
    /// written, so on [`PoolExhausted`] the chain is exactly as it was.
    pub(crate) fn append(
        &mut self,
        pool: &mut MemoryPool<'_, RxBlock>,
        bytes: &[u8],
    ) -> Result<(), PoolExhausted> {
        debug_assert!(bytes.len() <= FRAME_DATA_CAPACITY);
        if bytes.is_empty() {
            return Ok(());
        }
        let room = self
            .tail
            .and_then(|tail| chunk(pool, tail))
            .map_or(0, PayloadChunk::room);
        let fresh = if bytes.len() > room {
            Some(pool.allocate(RxBlock(BlockContent::Chunk(PayloadChunk::empty())))?)
        } else {
            None
        };

        let mut written = 0;
        if let Some(tail) = self.tail
            && let Some(last) = chunk_mut(pool, tail)
        {
            written = last.fill(bytes);
            if let Some(fresh) = fresh {
                last.next = Some(fresh);
            }
        }
        if let Some(fresh) = fresh {
            if let Some(new_chunk) = chunk_mut(pool, fresh) {
                written += new_chunk.fill(&bytes[written..]);
            }
            if self.head.is_none() {
                self.head = Some(fresh);
            }
            self.tail = Some(fresh);
        }
        self.len += written;
        Ok(())
    }

    /// Return every chunk to the pool and reset the chain.
    pub(crate) fn release(&mut self, pool: &mut MemoryPool<'_, RxBlock>) {
        let mut cursor = self.head.take();
        while let Some(index) = cursor {
            cursor = match pool.release(index) {
                Some(RxBlock(BlockContent::Chunk(chunk))) => chunk.next,
                _ => None,
            };
        }
        self.tail = None;
        self.len = 0;
    }
}

/// Iterator over the byte slices of a chain, in order.
#[derive(Clone, Debug)]
pub(crate) struct ChainChunks<'a> {
    pool: &'a MemoryPool<'a, RxBlock>,
    cursor: Option<BlockIndex>,
}

impl<'a> ChainChunks<'a> {
    pub(crate) const fn new(pool: &'a MemoryPool<'a, RxBlock>, head: Option<BlockIndex>) -> Self {
        Self { pool, cursor: head }
    }
}

impl<'a> Iterator for ChainChunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let current = chunk(self.pool, self.cursor?)?;
        self.cursor = current.next;
        Some(current.bytes())
    }
}
