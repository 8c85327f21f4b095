//! Session table and the reassembly state machine.
//!
//! The table maps [`SessionKey`]s to session records stored in pool blocks.
//! Lookup is a linear scan over the active sessions, which stays cheap for
//! the handful of concurrent peers a bus carries.
//!
//! Every frame is routed through one exhaustive match over the session
//! state for its key (absent or active) and the frame's position in its
//! transfer. Validation always happens before mutation, so a rejected frame
//! leaves the table exactly as it found it unless the rejection is an expiry.

use super::{BlockContent, PayloadChain, RxBlock, RxSession, RxSlot, SessionKey};
use crate::{
    error::RxError,
    pool::{BlockIndex, MemoryPool, PoolExhausted, PoolStats},
    transfer::{FramePosition, Payload, TailByte},
};

/// A frame reduced to what the state machine needs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameInput<'f> {
    pub(crate) key: SessionKey,
    pub(crate) tail: TailByte,
    /// Payload bytes with the tail byte removed.
    pub(crate) data: &'f [u8],
    pub(crate) full_length: bool,
    pub(crate) timestamp: u64,
}

/// Successful outcome of feeding one frame to the table.
#[derive(Debug)]
pub(crate) enum Admission<'f> {
    /// The frame was absorbed; more frames are expected.
    InProgress,
    /// A single-frame transfer; its bytes never entered the pool.
    Single(&'f [u8]),
    /// The session at this index holds a complete transfer. The caller
    /// delivers it and then calls [`SessionTable::remove`].
    Complete(BlockIndex),
}

/// View of a completed session handed to the delivery path.
pub(crate) struct CompletedSession<'s> {
    pub(crate) started_at: u64,
    pub(crate) payload: Payload<'s>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Absent,
    Active(BlockIndex),
}

/// All reassembly sessions of one instance plus the pool backing them.
#[derive(Debug)]
pub(crate) struct SessionTable<'a> {
    pool: MemoryPool<'a, RxBlock>,
    head: Option<BlockIndex>,
    len: usize,
}

impl<'a> SessionTable<'a> {
    pub(crate) fn new(storage: &'a mut [RxSlot]) -> Self {
        Self {
            pool: MemoryPool::new(storage),
            head: None,
            len: 0,
        }
    }

    /// Number of active sessions.
    pub(crate) const fn len(&self) -> usize { self.len }

    pub(crate) fn pool_stats(&self) -> PoolStats { self.pool.stats() }

    /// Route one frame through the state machine.
    pub(crate) fn accept<'f>(
        &mut self,
        input: FrameInput<'f>,
        timeout: u64,
    ) -> Result<Admission<'f>, RxError> {
        let position = input.tail.position();
        match (self.lookup(&input.key), position) {
            (state, FramePosition::Single) => {
                if let SessionState::Active(index) = state {
                    self.remove(index);
                }
                Ok(Admission::Single(input.data))
            }
            (_, FramePosition::First) if !input.full_length => Err(RxError::ShortFrame),
            (SessionState::Absent, FramePosition::First) => {
                self.open(&input).map(|()| Admission::InProgress)
            }
            (SessionState::Active(index), FramePosition::First) => {
                self.restart(index, &input).map(|()| Admission::InProgress)
            }
            (SessionState::Absent, FramePosition::Middle | FramePosition::Last) => {
                Err(RxError::MissedStart)
            }
            (SessionState::Active(index), FramePosition::Middle | FramePosition::Last) => {
                self.advance(index, &input, position, timeout)
            }
        }
    }

    /// Borrow the payload of a session that [`accept`](Self::accept)
    /// reported complete.
    pub(crate) fn completed(&self, index: BlockIndex) -> Option<CompletedSession<'_>> {
        let session = self.session(index)?;
        Some(CompletedSession {
            started_at: session.started_at,
            payload: Payload::chained(
                &self.pool,
                session.payload.head(),
                session.payload.len(),
            ),
        })
    }

    /// Drop a session and return all of its blocks to the pool.
    pub(crate) fn remove(&mut self, index: BlockIndex) {
        if let Some(mut session) = self.unlink(index) {
            session.payload.release(&mut self.pool);
        }
    }

    /// Drop every session whose last frame is older than `timeout`.
    pub(crate) fn purge_expired(&mut self, now: u64, timeout: u64) -> usize {
        let mut purged = 0;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let Some(session) = self.session(index) else {
                break;
            };
            cursor = session.next;
            if session.is_expired(now, timeout) {
                tracing::debug!(
                    kind = %session.key.kind,
                    port = %session.key.port,
                    source = %session.key.source,
                    "purging stale session"
                );
                self.remove(index);
                purged += 1;
            }
        }
        purged
    }

    fn lookup(&self, key: &SessionKey) -> SessionState {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let Some(session) = self.session(index) else {
                break;
            };
            if session.key == *key {
                return SessionState::Active(index);
            }
            cursor = session.next;
        }
        SessionState::Absent
    }

    fn open(&mut self, input: &FrameInput<'_>) -> Result<(), RxError> {
        let record = RxSession {
            key: input.key,
            next: self.head,
            transfer_id: input.tail.transfer_id,
            next_toggle: !input.tail.toggle,
            started_at: input.timestamp,
            last_frame_at: input.timestamp,
            payload: PayloadChain::default(),
        };
        let index = self.pool.allocate(RxBlock(BlockContent::Session(record)))?;
        if self.append(index, input.data).is_err() {
            // Not linked yet; the record is the only block to give back.
            self.pool.release(index);
            return Err(RxError::OutOfMemory);
        }
        self.head = Some(index);
        self.len += 1;
        tracing::trace!(
            kind = %input.key.kind,
            port = %input.key.port,
            source = %input.key.source,
            transfer_id = %input.tail.transfer_id,
            "session opened"
        );
        Ok(())
    }

    fn restart(&mut self, index: BlockIndex, input: &FrameInput<'_>) -> Result<(), RxError> {
        let mut chain = match self.session_mut(index) {
            Some(session) => {
                session.transfer_id = input.tail.transfer_id;
                session.next_toggle = !input.tail.toggle;
                session.started_at = input.timestamp;
                session.last_frame_at = input.timestamp;
                std::mem::take(&mut session.payload)
            }
            None => return self.open(input),
        };
        chain.release(&mut self.pool);
        if let Some(session) = self.session_mut(index) {
            session.payload = chain;
        }
        if self.append(index, input.data).is_err() {
            self.remove(index);
            return Err(RxError::OutOfMemory);
        }
        Ok(())
    }

    fn advance<'f>(
        &mut self,
        index: BlockIndex,
        input: &FrameInput<'f>,
        position: FramePosition,
        timeout: u64,
    ) -> Result<Admission<'f>, RxError> {
        let Some(session) = self.session(index) else {
            return Err(RxError::MissedStart);
        };
        if session.is_expired(input.timestamp, timeout) {
            tracing::debug!(
                kind = %session.key.kind,
                port = %session.key.port,
                source = %session.key.source,
                last_frame_at = session.last_frame_at,
                now = input.timestamp,
                "session expired"
            );
            self.remove(index);
            return Err(RxError::MissedStart);
        }
        if input.tail.transfer_id != session.transfer_id {
            return Err(RxError::UnexpectedTransferId);
        }
        if input.tail.toggle != session.next_toggle {
            return Err(RxError::WrongToggle);
        }
        if position == FramePosition::Middle && !input.full_length {
            return Err(RxError::ShortFrame);
        }

        self.append(index, input.data)?;
        if let Some(session) = self.session_mut(index) {
            session.next_toggle = !session.next_toggle;
            session.last_frame_at = input.timestamp;
        }
        if position.is_end() {
            Ok(Admission::Complete(index))
        } else {
            Ok(Admission::InProgress)
        }
    }

    /// Append to the payload chain of the session at `index`.
    ///
    /// The chain is lifted out of its pool block for the duration of the
    /// append, since growing it needs the pool mutably.
    fn append(&mut self, index: BlockIndex, bytes: &[u8]) -> Result<(), PoolExhausted> {
        let Some(session) = self.session_mut(index) else {
            return Err(PoolExhausted);
        };
        let mut chain = std::mem::take(&mut session.payload);
        let result = chain.append(&mut self.pool, bytes);
        if let Some(session) = self.session_mut(index) {
            session.payload = chain;
        }
        result
    }

    fn unlink(&mut self, index: BlockIndex) -> Option<RxSession> {
        let next = self.session(index)?.next;
        if self.head == Some(index) {
            self.head = next;
        } else {
            let mut cursor = self.head;
            while let Some(current) = cursor {
                let session = self.session_mut(current)?;
                if session.next == Some(index) {
                    session.next = next;
                    break;
                }
                cursor = session.next;
            }
        }
        self.len -= 1;
        match self.pool.release(index) {
            Some(RxBlock(BlockContent::Session(session))) => Some(session),
            _ => None,
        }
    }

    fn session(&self, index: BlockIndex) -> Option<&RxSession> {
        match self.pool.get(index) {
            Some(RxBlock(BlockContent::Session(session))) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self, index: BlockIndex) -> Option<&mut RxSession> {
        match self.pool.get_mut(index) {
            Some(RxBlock(BlockContent::Session(session))) => Some(session),
            _ => None,
        }
    }
}
