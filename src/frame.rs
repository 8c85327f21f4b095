//! Raw bus frames as delivered by the driver.
//!
//! A [`CanFrame`] mirrors the SocketCAN layout: the upper three bits of the
//! identifier word carry the frame format flags, the lower 29 bits carry the
//! extended identifier, and up to eight data bytes follow. The last data byte
//! of every frame is the tail byte.

/// Extended frame format flag (29-bit identifier).
pub const CAN_FRAME_EFF: u32 = 1 << 31;
/// Remote transmission request flag.
pub const CAN_FRAME_RTR: u32 = 1 << 30;
/// Error frame flag.
pub const CAN_FRAME_ERR: u32 = 1 << 29;
/// Mask selecting the 29 identifier bits of the id word.
pub const CAN_EXT_ID_MASK: u32 = 0x1FFF_FFFF;

/// Largest payload carried by a single frame, tail byte included.
pub const MAX_FRAME_PAYLOAD: usize = 8;
/// Transfer bytes carried by a full-length frame once the tail byte is removed.
pub const FRAME_DATA_CAPACITY: usize = MAX_FRAME_PAYLOAD - 1;

/// A single frame received from the bus.
///
/// The fields are public so drivers can fill them in place and tests can
/// construct deliberately malformed frames. Use [`CanFrame::new`] for the
/// checked path.
///
/// # Examples
///
/// ```
/// use canrx::frame::{CAN_FRAME_EFF, CanFrame};
///
/// let frame = CanFrame::new(CAN_FRAME_EFF | 0x01, &[0xC0]).expect("fits in one frame");
/// assert_eq!(frame.payload(), &[0xC0]);
/// assert_eq!(frame.tail(), Some(0xC0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanFrame {
    /// Identifier word: 29-bit extended id plus the EFF/RTR/ERR flags.
    pub id: u32,
    /// Data bytes; only the first `data_len` are meaningful.
    pub data: [u8; MAX_FRAME_PAYLOAD],
    /// Number of valid bytes in `data`.
    pub data_len: u8,
}

impl CanFrame {
    /// Build a frame from an id word and payload, rejecting payloads longer
    /// than [`MAX_FRAME_PAYLOAD`].
    #[must_use]
    pub fn new(id: u32, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_FRAME_PAYLOAD {
            return None;
        }
        let mut data = [0u8; MAX_FRAME_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);
        Some(Self {
            id,
            data,
            data_len: u8::try_from(payload.len()).ok()?,
        })
    }

    /// The 29-bit extended identifier with the format flags stripped.
    #[must_use]
    pub const fn extended_id(&self) -> u32 { self.id & CAN_EXT_ID_MASK }

    /// Whether the format flags describe a plain extended data frame.
    #[must_use]
    pub const fn is_extended_data_frame(&self) -> bool {
        self.id & (CAN_FRAME_EFF | CAN_FRAME_RTR | CAN_FRAME_ERR) == CAN_FRAME_EFF
    }

    /// Valid payload bytes, clamped to the frame capacity.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.data_len).min(MAX_FRAME_PAYLOAD);
        &self.data[..len]
    }

    /// The tail byte, if the frame carries any payload.
    #[must_use]
    pub fn tail(&self) -> Option<u8> { self.payload().last().copied() }

    /// Whether the payload fills the whole frame.
    #[must_use]
    pub const fn is_full_length(&self) -> bool { self.data_len as usize == MAX_FRAME_PAYLOAD }

    /// Structural admission check: extended data frame carrying between one
    /// and [`MAX_FRAME_PAYLOAD`] bytes.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.is_extended_data_frame()
            && self.data_len >= 1
            && self.data_len as usize <= MAX_FRAME_PAYLOAD
    }
}
