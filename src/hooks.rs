//! Collaborator hooks invoked by the admission pipeline.
//!
//! [`AcceptanceFilter`] decides which transfers the application wants before
//! any session state is touched, while [`TransferHandler`] receives each
//! completed transfer. Both are implemented for plain closures so simple
//! applications never need to name a type.

use crate::transfer::{NodeId, PortId, RxTransfer, TransferKind};

/// Early, side-effect-free rejection of unwanted traffic.
///
/// Called once per structurally valid, address-matched frame, before session
/// lookup. Implementations should be cheap: on a busy bus most frames are
/// expected to be declined here.
///
/// ```
/// use canrx::{
///     hooks::AcceptanceFilter,
///     transfer::{NodeId, PortId, TransferKind},
/// };
///
/// let only_heartbeat =
///     |port: PortId, kind: TransferKind, _source: NodeId| {
///         kind == TransferKind::Message && port.get() == 7509
///     };
/// let source = NodeId::new(1).expect("valid node id");
/// assert!(only_heartbeat.accept(PortId::new(7509), TransferKind::Message, source));
/// ```
pub trait AcceptanceFilter {
    /// Return `true` to let the frame through to the session table.
    ///
    /// `source` is the raw source field; for anonymous messages it holds the
    /// sender's pseudo-id.
    fn accept(&self, port: PortId, kind: TransferKind, source: NodeId) -> bool;
}

impl<F> AcceptanceFilter for F
where
    F: Fn(PortId, TransferKind, NodeId) -> bool,
{
    fn accept(&self, port: PortId, kind: TransferKind, source: NodeId) -> bool {
        self(port, kind, source)
    }
}

/// Filter that admits everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl AcceptanceFilter for AcceptAll {
    fn accept(&self, _port: PortId, _kind: TransferKind, _source: NodeId) -> bool { true }
}

/// Filter admitting a fixed set of `(kind, port)` subscriptions from any
/// source.
#[derive(Clone, Copy, Debug)]
pub struct SubscriptionFilter<'s> {
    subscriptions: &'s [(TransferKind, PortId)],
}

impl<'s> SubscriptionFilter<'s> {
    /// Build a filter over `subscriptions`.
    #[must_use]
    pub const fn new(subscriptions: &'s [(TransferKind, PortId)]) -> Self {
        Self { subscriptions }
    }

    /// The subscriptions this filter admits.
    #[must_use]
    pub const fn subscriptions(&self) -> &'s [(TransferKind, PortId)] { self.subscriptions }
}

impl AcceptanceFilter for SubscriptionFilter<'_> {
    fn accept(&self, port: PortId, kind: TransferKind, _source: NodeId) -> bool {
        self.subscriptions.contains(&(kind, port))
    }
}

/// Receiver of completed transfers.
///
/// Invoked synchronously from inside
/// [`RxInstance::handle_rx_frame`](crate::RxInstance::handle_rx_frame). The
/// payload borrows pool blocks that are released as soon as this call
/// returns.
pub trait TransferHandler {
    /// Consume one completed transfer.
    fn on_transfer(&mut self, transfer: &RxTransfer<'_>);
}

impl<F> TransferHandler for F
where
    F: FnMut(&RxTransfer<'_>),
{
    fn on_transfer(&mut self, transfer: &RxTransfer<'_>) { self(transfer) }
}
