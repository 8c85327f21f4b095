#![doc(html_root_url = "https://docs.rs/canrx/latest")]
//! Public API for the `canrx` library.
//!
//! This crate implements the receive side of a small-frame broadcast bus
//! transport: it decodes identifiers and tail bytes, filters unwanted
//! traffic, and reassembles multi-frame transfers per sending peer, all
//! within a fixed block pool carved out of caller-provided storage.
//!
//! Drive an [`RxInstance`] with every received [`CanFrame`]; completed
//! transfers reach the [`TransferHandler`](hooks::TransferHandler) before
//! [`RxInstance::handle_rx_frame`] returns.

pub mod config;
pub mod error;
pub mod frame;
pub mod hooks;
pub mod instance;
pub mod metrics;
pub mod pool;
pub mod session;
pub mod transfer;

pub use config::{DEFAULT_TRANSFER_TIMEOUT, RxConfig};
pub use error::{RxError, RxStatus};
pub use frame::CanFrame;
pub use hooks::{AcceptAll, AcceptanceFilter, SubscriptionFilter, TransferHandler};
pub use instance::RxInstance;
pub use metrics::{FRAMES_TOTAL, POOL_BLOCKS_USED, TRANSFERS_DELIVERED};
pub use pool::{PoolExhausted, PoolStats};
pub use session::{RxSlot, SessionKey};
pub use transfer::{NodeId, PortId, Priority, RxTransfer, TransferId, TransferKind};
