//! Wire-level transfer metadata: identifier fields, the 29-bit identifier
//! layout, the tail byte, and the completed-transfer record.

mod can_id;
mod id;
mod received;
mod tail;

pub use can_id::CanId;
pub use id::{InvalidNodeId, NodeId, PortId, Priority, TransferId, TransferKind};
pub use received::{Chunks, Payload, RxTransfer};
pub use tail::{FramePosition, TailByte};
