//! Test doubles for the collaborator hooks.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use canrx::{
    hooks::{AcceptanceFilter, TransferHandler},
    transfer::{NodeId, PortId, Priority, RxTransfer, TransferId, TransferKind},
};

/// Owned copy of a delivered transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedTransfer {
    pub kind: TransferKind,
    pub port: PortId,
    pub priority: Priority,
    pub source: Option<NodeId>,
    pub destination: Option<NodeId>,
    pub transfer_id: TransferId,
    pub timestamp: u64,
    pub payload: Vec<u8>,
}

impl From<&RxTransfer<'_>> for ReceivedTransfer {
    fn from(transfer: &RxTransfer<'_>) -> Self {
        Self {
            kind: transfer.kind,
            port: transfer.port,
            priority: transfer.priority,
            source: transfer.source,
            destination: transfer.destination,
            transfer_id: transfer.transfer_id,
            timestamp: transfer.timestamp,
            payload: transfer.payload.to_vec(),
        }
    }
}

/// Handler that copies every delivered transfer into a shared list.
///
/// Clones share the same list, so a test keeps one clone for assertions and
/// hands the other to the instance.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    received: Rc<RefCell<Vec<ReceivedTransfer>>>,
}

impl Recorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Snapshot of everything received so far.
    #[must_use]
    pub fn received(&self) -> Vec<ReceivedTransfer> { self.received.borrow().clone() }

    /// Number of transfers received so far.
    #[must_use]
    pub fn count(&self) -> usize { self.received.borrow().len() }
}

impl TransferHandler for Recorder {
    fn on_transfer(&mut self, transfer: &RxTransfer<'_>) {
        self.received.borrow_mut().push(ReceivedTransfer::from(transfer));
    }
}

/// Acceptance filter whose verdict a test can flip between frames.
#[derive(Clone, Debug)]
pub struct Switch {
    accept: Rc<Cell<bool>>,
    calls: Rc<Cell<usize>>,
}

impl Switch {
    /// A filter that starts out accepting everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accept: Rc::new(Cell::new(true)),
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Set the verdict for subsequent frames.
    pub fn set(&self, accept: bool) { self.accept.set(accept); }

    /// How many times the filter has been consulted.
    #[must_use]
    pub fn calls(&self) -> usize { self.calls.get() }
}

impl Default for Switch {
    fn default() -> Self { Self::new() }
}

impl AcceptanceFilter for Switch {
    fn accept(&self, _port: PortId, _kind: TransferKind, _source: NodeId) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.accept.get()
    }
}
