//! Decoding of the 29-bit extended identifier.
//!
//! ```text
//! bit  28..26   25   24          23 ........ 8   7 ... 1   0
//! msg: priority 0    anonymous   subject id      source    version
//! svc: priority 1    request     service | dest  source    version
//!                                (23..15)  (14..8)
//! ```
//!
//! Decoding is total: every bit pattern maps to some [`CanId`]. Structural
//! policy (version bit, frame flags) is enforced by the admission pipeline.

use super::{NodeId, PortId, Priority, TransferKind};
use crate::frame::CAN_EXT_ID_MASK;

const VERSION_BIT: u32 = 1;
const SOURCE_SHIFT: u32 = 1;
const SUBJECT_SHIFT: u32 = 8;
const SUBJECT_MASK: u32 = 0xFFFF;
const DESTINATION_SHIFT: u32 = 8;
const SERVICE_SHIFT: u32 = 15;
const SERVICE_MASK: u32 = 0x1FF;
const ANONYMOUS_OR_REQUEST_BIT: u32 = 1 << 24;
const SERVICE_NOT_MESSAGE_BIT: u32 = 1 << 25;
const PRIORITY_SHIFT: u32 = 26;

/// Structured view of an extended identifier.
///
/// # Examples
///
/// ```
/// use canrx::transfer::{CanId, TransferKind};
///
/// // Request to service 0 on node 20 from node 0, priority 0.
/// let raw = (1 << 25) | (1 << 24) | (20 << 8) | 1;
/// let id = CanId::decode(raw);
/// assert_eq!(id.kind, TransferKind::Request);
/// assert_eq!(id.destination.map(|d| d.get()), Some(20));
/// assert_eq!(id.encode(), raw);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanId {
    /// Transfer priority.
    pub priority: Priority,
    /// Message, request, or response.
    pub kind: TransferKind,
    /// Subject id for messages, service id for service transfers.
    pub port: PortId,
    /// Source address field. Holds a pseudo-id for anonymous messages.
    pub source: NodeId,
    /// Destination address; present only for service transfers.
    pub destination: Option<NodeId>,
    /// Anonymous-source flag; only ever set on messages.
    pub anonymous: bool,
    /// Protocol version marker (bit 0).
    pub version_bit: bool,
}

impl CanId {
    /// Decode the low 29 bits of `raw`; flag bits above are ignored.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "port fields are masked to their wire width before the cast"
    )]
    pub const fn decode(raw: u32) -> Self {
        let raw = raw & CAN_EXT_ID_MASK;
        let priority = Priority::from_bits(raw >> PRIORITY_SHIFT);
        let source = NodeId::from_masked(raw >> SOURCE_SHIFT);
        let version_bit = raw & VERSION_BIT != 0;
        let flag_24 = raw & ANONYMOUS_OR_REQUEST_BIT != 0;

        if raw & SERVICE_NOT_MESSAGE_BIT == 0 {
            Self {
                priority,
                kind: TransferKind::Message,
                port: PortId::new(((raw >> SUBJECT_SHIFT) & SUBJECT_MASK) as u16),
                source,
                destination: None,
                anonymous: flag_24,
                version_bit,
            }
        } else {
            Self {
                priority,
                kind: if flag_24 {
                    TransferKind::Request
                } else {
                    TransferKind::Response
                },
                port: PortId::new(((raw >> SERVICE_SHIFT) & SERVICE_MASK) as u16),
                source,
                destination: Some(NodeId::from_masked(raw >> DESTINATION_SHIFT)),
                anonymous: false,
                version_bit,
            }
        }
    }

    /// Encode back into a 29-bit identifier; the exact inverse of
    /// [`CanId::decode`]. Fields wider than their wire slot are truncated.
    #[must_use]
    pub const fn encode(&self) -> u32 {
        let mut raw = (self.priority.bits() << PRIORITY_SHIFT)
            | ((self.source.get() as u32) << SOURCE_SHIFT);
        if self.version_bit {
            raw |= VERSION_BIT;
        }
        let port = self.port.get() as u32;
        match self.kind {
            TransferKind::Message => {
                raw |= (port & SUBJECT_MASK) << SUBJECT_SHIFT;
                if self.anonymous {
                    raw |= ANONYMOUS_OR_REQUEST_BIT;
                }
            }
            TransferKind::Request | TransferKind::Response => {
                raw |= SERVICE_NOT_MESSAGE_BIT | ((port & SERVICE_MASK) << SERVICE_SHIFT);
                if let Some(destination) = self.destination {
                    raw |= (destination.get() as u32) << DESTINATION_SHIFT;
                }
                if matches!(self.kind, TransferKind::Request) {
                    raw |= ANONYMOUS_OR_REQUEST_BIT;
                }
            }
        }
        raw
    }

    /// Source address as seen by the application: `None` for anonymous
    /// messages.
    #[must_use]
    pub const fn committed_source(&self) -> Option<NodeId> {
        if self.anonymous {
            None
        } else {
            Some(self.source)
        }
    }
}
