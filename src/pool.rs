//! Fixed-block memory pool carved out of caller-provided storage.
//!
//! [`MemoryPool`] treats a mutable slice of [`Slot`]s as its only memory.
//! Vacant slots form a singly linked free list threaded through the slots
//! themselves, so the pool needs no bookkeeping beyond the list head and two
//! counters. Blocks are addressed by [`BlockIndex`]; every access checks the
//! slot state, so a stale index can never reach a vacant or reused block as
//! the wrong type.

use thiserror::Error;

/// Error returned when no vacant slot is left.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("memory pool exhausted")]
pub struct PoolExhausted;

/// Handle to an occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockIndex(u16);

impl BlockIndex {
    fn as_usize(self) -> usize { usize::from(self.0) }
}

/// One block of pool storage.
///
/// Callers allocate an array of vacant slots and hand it to
/// [`MemoryPool::new`]:
///
/// ```
/// use canrx::pool::{MemoryPool, Slot};
///
/// let mut storage: [Slot<u32>; 4] = [const { Slot::VACANT }; 4];
/// let pool = MemoryPool::new(&mut storage);
/// assert_eq!(pool.capacity(), 4);
/// ```
#[derive(Debug)]
pub struct Slot<T>(SlotState<T>);

#[derive(Debug)]
enum SlotState<T> {
    Vacant { next: Option<BlockIndex> },
    Occupied(T),
}

impl<T> Slot<T> {
    /// An unused slot, suitable for array initialisers.
    pub const VACANT: Self = Self(SlotState::Vacant { next: None });
}

/// Occupancy snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of blocks.
    pub capacity: usize,
    /// Blocks currently allocated.
    pub used: usize,
    /// Highest value `used` has reached.
    pub peak: usize,
}

/// Fixed-capacity block allocator.
#[derive(Debug)]
pub struct MemoryPool<'a, T> {
    slots: &'a mut [Slot<T>],
    free_head: Option<BlockIndex>,
    used: usize,
    peak: usize,
}

impl<'a, T> MemoryPool<'a, T> {
    /// Largest number of slots a pool will manage; extra storage is ignored.
    pub const MAX_BLOCKS: usize = u16::MAX as usize;

    /// Take ownership of `storage` and thread every slot onto the free list.
    ///
    /// Any previous content of the slots is dropped. A zero-length slice
    /// yields a pool on which every allocation fails.
    pub fn new(storage: &'a mut [Slot<T>]) -> Self {
        let limit = storage.len().min(Self::MAX_BLOCKS);
        if storage.len() > limit {
            log::warn!(
                "memory pool storage truncated: slots={}, usable={limit}",
                storage.len()
            );
        }
        let slots = &mut storage[..limit];
        for (position, slot) in slots.iter_mut().enumerate() {
            let next = u16::try_from(position + 1)
                .ok()
                .filter(|next| usize::from(*next) < limit)
                .map(BlockIndex);
            *slot = Slot(SlotState::Vacant { next });
        }
        Self {
            free_head: if limit == 0 { None } else { Some(BlockIndex(0)) },
            slots,
            used: 0,
            peak: 0,
        }
    }

    /// Pop the free-list head and store `value` in it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolExhausted`] when every slot is occupied; the pool is
    /// left unchanged and `value` is dropped.
    pub fn allocate(&mut self, value: T) -> Result<BlockIndex, PoolExhausted> {
        let index = self.free_head.ok_or(PoolExhausted)?;
        let slot = &mut self.slots[index.as_usize()];
        let SlotState::Vacant { next } = slot.0 else {
            // A corrupt free list is treated as exhaustion.
            return Err(PoolExhausted);
        };
        slot.0 = SlotState::Occupied(value);
        self.free_head = next;
        self.used += 1;
        self.peak = self.peak.max(self.used);
        Ok(index)
    }

    /// Return a block to the free list, handing back its content.
    ///
    /// Releasing an index that is not currently allocated is a no-op and
    /// returns `None`.
    pub fn release(&mut self, index: BlockIndex) -> Option<T> {
        let slot = self.slots.get_mut(index.as_usize())?;
        if matches!(slot.0, SlotState::Vacant { .. }) {
            return None;
        }
        let previous = std::mem::replace(
            &mut slot.0,
            SlotState::Vacant {
                next: self.free_head,
            },
        );
        self.free_head = Some(index);
        self.used -= 1;
        match previous {
            SlotState::Occupied(value) => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Borrow an allocated block.
    #[must_use]
    pub fn get(&self, index: BlockIndex) -> Option<&T> {
        match &self.slots.get(index.as_usize())?.0 {
            SlotState::Occupied(value) => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Mutably borrow an allocated block.
    pub fn get_mut(&mut self, index: BlockIndex) -> Option<&mut T> {
        match &mut self.slots.get_mut(index.as_usize())?.0 {
            SlotState::Occupied(value) => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Total number of blocks managed.
    #[must_use]
    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Blocks currently allocated.
    #[must_use]
    pub const fn used(&self) -> usize { self.used }

    /// Blocks currently free.
    #[must_use]
    pub fn free_blocks(&self) -> usize { self.capacity() - self.used }

    /// Occupancy snapshot including the high-water mark.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            used: self.used,
            peak: self.peak,
        }
    }
}

#[cfg(test)]
mod tests;
