//! Strongly typed identifier fields extracted from the bus identifier and
//! tail byte.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a node address does not fit in seven bits.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("node id {0} exceeds the 7-bit range")]
pub struct InvalidNodeId(pub u8);

/// 7-bit node address.
///
/// # Examples
///
/// ```
/// use canrx::transfer::NodeId;
///
/// let id = NodeId::new(20).expect("within range");
/// assert_eq!(id.get(), 20);
/// assert!(NodeId::new(128).is_none());
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("{_0}")]
#[serde(try_from = "u8", into = "u8")]
pub struct NodeId(u8);

impl NodeId {
    /// Largest valid node address.
    pub const MAX: u8 = 0x7F;

    /// Construct a node id, returning `None` above [`NodeId::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value > Self::MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Keep the low seven bits of `value`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is masked to seven bits before the cast"
    )]
    pub const fn from_masked(value: u32) -> Self { Self((value & Self::MAX as u32) as u8) }

    /// Return the numeric address.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for NodeId {
    type Error = InvalidNodeId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidNodeId(value))
    }
}

impl From<NodeId> for u8 {
    fn from(value: NodeId) -> Self { value.0 }
}

/// Subject or service identifier a transfer is addressed to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct PortId(u16);

impl PortId {
    /// Construct a port id.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the numeric port.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }
}

/// 5-bit transfer sequence number carried in every tail byte.
///
/// Transfer ids are compared by plain equality; there is no modular
/// distance logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct TransferId(u8);

impl TransferId {
    /// Largest representable transfer id.
    pub const MAX: u8 = 0x1F;

    /// Construct a transfer id, returning `None` above [`TransferId::MAX`].
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value > Self::MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Keep the low five bits of `value`.
    #[must_use]
    pub const fn from_masked(value: u8) -> Self { Self(value & Self::MAX) }

    /// Return the numeric id.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }
}

/// Transfer priority, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Exceptional = 0,
    Immediate = 1,
    Fast = 2,
    High = 3,
    Nominal = 4,
    Low = 5,
    Slow = 6,
    Optional = 7,
}

impl Priority {
    /// Decode the low three bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            0 => Self::Exceptional,
            1 => Self::Immediate,
            2 => Self::Fast,
            3 => Self::High,
            4 => Self::Nominal,
            5 => Self::Low,
            6 => Self::Slow,
            _ => Self::Optional,
        }
    }

    /// Three-bit wire value.
    #[must_use]
    pub const fn bits(self) -> u32 { self as u32 }
}

/// What a transfer is: a broadcast message or one half of a service call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TransferKind {
    #[display("message")]
    Message,
    #[display("request")]
    Request,
    #[display("response")]
    Response,
}

impl TransferKind {
    /// Whether this kind belongs to a service call.
    #[must_use]
    pub const fn is_service(self) -> bool { matches!(self, Self::Request | Self::Response) }

    /// Short label used in metrics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}
