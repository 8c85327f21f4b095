//! Receive-path configuration.
//!
//! [`RxConfig`] collects the knobs of an [`RxInstance`](crate::RxInstance).
//! It is plain data and can be deserialised from any `serde` format; missing
//! fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::transfer::NodeId;

/// Default session timeout: two seconds in microseconds.
pub const DEFAULT_TRANSFER_TIMEOUT: u64 = 2_000_000;

/// Configuration for one receive instance.
///
/// # Examples
///
/// ```
/// use canrx::{RxConfig, transfer::NodeId};
///
/// let config = RxConfig::default()
///     .with_local_node_id(NodeId::new(20))
///     .with_transfer_timeout(500_000);
/// assert_eq!(config.transfer_timeout, 500_000);
/// assert!(config.require_version_bit);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RxConfig {
    /// Largest gap between two frames of one transfer, in timestamp units.
    pub transfer_timeout: u64,
    /// Reject frames whose identifier lacks the protocol-version bit.
    pub require_version_bit: bool,
    /// Address of this node; `None` runs the instance anonymously and skips
    /// the destination check on service transfers.
    pub local_node_id: Option<NodeId>,
}

impl RxConfig {
    /// Set the session timeout.
    #[must_use]
    pub const fn with_transfer_timeout(mut self, timeout: u64) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    /// Choose whether the version bit is mandatory.
    #[must_use]
    pub const fn with_version_bit_required(mut self, required: bool) -> Self {
        self.require_version_bit = required;
        self
    }

    /// Set or clear the local node address.
    #[must_use]
    pub const fn with_local_node_id(mut self, node_id: Option<NodeId>) -> Self {
        self.local_node_id = node_id;
        self
    }
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
            require_version_bit: true,
            local_node_id: None,
        }
    }
}
