//! The per-frame trailer byte.
//!
//! ```text
//! bit 7      6      5       4 .. 0
//!     start  end    toggle  transfer id
//! ```

use super::TransferId;

const START_BIT: u8 = 1 << 7;
const END_BIT: u8 = 1 << 6;
const TOGGLE_BIT: u8 = 1 << 5;

/// Where a frame sits within its transfer, derived from the start/end flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePosition {
    /// Start and end flags both set.
    Single,
    /// Start flag only.
    First,
    /// Neither flag.
    Middle,
    /// End flag only.
    Last,
}

impl FramePosition {
    /// Whether the frame opens a transfer.
    #[must_use]
    pub const fn is_start(self) -> bool { matches!(self, Self::Single | Self::First) }

    /// Whether the frame closes a transfer.
    #[must_use]
    pub const fn is_end(self) -> bool { matches!(self, Self::Single | Self::Last) }
}

/// Decoded tail byte.
///
/// # Examples
///
/// ```
/// use canrx::transfer::{FramePosition, TailByte};
///
/// let tail = TailByte::decode(0b1010_0001);
/// assert!(tail.start && !tail.end && tail.toggle);
/// assert_eq!(tail.transfer_id.get(), 1);
/// assert_eq!(tail.position(), FramePosition::First);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TailByte {
    /// Start-of-transfer flag.
    pub start: bool,
    /// End-of-transfer flag.
    pub end: bool,
    /// Alternating toggle bit.
    pub toggle: bool,
    /// Transfer sequence number.
    pub transfer_id: TransferId,
}

impl TailByte {
    /// Decode a raw trailer byte. Every value is valid.
    #[must_use]
    pub const fn decode(byte: u8) -> Self {
        Self {
            start: byte & START_BIT != 0,
            end: byte & END_BIT != 0,
            toggle: byte & TOGGLE_BIT != 0,
            transfer_id: TransferId::from_masked(byte),
        }
    }

    /// Encode back into a trailer byte.
    #[must_use]
    pub const fn encode(self) -> u8 {
        let mut byte = self.transfer_id.get();
        if self.start {
            byte |= START_BIT;
        }
        if self.end {
            byte |= END_BIT;
        }
        if self.toggle {
            byte |= TOGGLE_BIT;
        }
        byte
    }

    /// Position of the frame within its transfer.
    #[must_use]
    pub const fn position(self) -> FramePosition {
        match (self.start, self.end) {
            (true, true) => FramePosition::Single,
            (true, false) => FramePosition::First,
            (false, false) => FramePosition::Middle,
            (false, true) => FramePosition::Last,
        }
    }
}
