//! Frame builders written straight from the wire layout.
//!
//! These deliberately avoid the library's own encoders so that tests check
//! the decoder against an independent rendition of the bit layout.

use canrx::frame::{CAN_FRAME_EFF, CanFrame, MAX_FRAME_PAYLOAD};

const ANONYMOUS_BIT: u32 = 1 << 24;
const SERVICE_NOT_MESSAGE_BIT: u32 = 1 << 25;
const VERSION_BIT: u32 = 1;

fn priority(prio: u8) -> u32 { (u32::from(prio) & 0x7) << 26 }

fn source(source_id: u8) -> u32 { (u32::from(source_id) & 0x7F) << 1 }

/// Identifier word of a message frame, EFF flag included.
#[must_use]
pub fn message_id(prio: u8, subject_id: u16, source_id: u8) -> u32 {
    priority(prio) | (u32::from(subject_id) << 8) | source(source_id) | VERSION_BIT | CAN_FRAME_EFF
}

/// Identifier word of an anonymous message frame.
#[must_use]
pub fn anonymous_message_id(prio: u8, subject_id: u16, pseudo_id: u8) -> u32 {
    ANONYMOUS_BIT | message_id(prio, subject_id, pseudo_id)
}

/// Identifier word of a service frame.
#[must_use]
pub fn service_id(prio: u8, service: u16, request: bool, destination: u8, source_id: u8) -> u32 {
    priority(prio)
        | SERVICE_NOT_MESSAGE_BIT
        | (u32::from(request) << 24)
        | ((u32::from(service) & 0x1FF) << 15)
        | ((u32::from(destination) & 0x7F) << 8)
        | source(source_id)
        | VERSION_BIT
        | CAN_FRAME_EFF
}

/// Trailer byte from its four fields.
#[must_use]
pub fn tail_byte(start: bool, end: bool, toggle: bool, transfer_id: u8) -> u8 {
    (u8::from(start) << 7) | (u8::from(end) << 6) | (u8::from(toggle) << 5) | (transfer_id & 0x1F)
}

/// Frame of `data_len` bytes whose last byte is `tail`; the bytes before it
/// are taken from `fill`, repeating as needed.
///
/// # Panics
///
/// Panics if `data_len` is zero or above eight, or `fill` is empty while
/// `data_len` is above one.
#[must_use]
pub fn frame(id: u32, fill: &[u8], data_len: usize, tail: u8) -> CanFrame {
    assert!((1..=MAX_FRAME_PAYLOAD).contains(&data_len), "frame length out of range");
    assert!(data_len == 1 || !fill.is_empty(), "no fill bytes for a multi-byte frame");
    let mut bytes = [0u8; MAX_FRAME_PAYLOAD];
    for (slot, value) in bytes[..data_len - 1].iter_mut().zip(fill.iter().cycle()) {
        *slot = *value;
    }
    bytes[data_len - 1] = tail;
    CanFrame::new(id, &bytes[..data_len]).expect("length checked above")
}

/// Frame carrying `data` followed by `tail`.
///
/// # Panics
///
/// Panics if `data` is longer than seven bytes.
#[must_use]
pub fn data_frame(id: u32, data: &[u8], tail: u8) -> CanFrame {
    let mut bytes = data.to_vec();
    bytes.push(tail);
    CanFrame::new(id, &bytes).expect("at most seven data bytes")
}

/// Split `payload` into the frames of one transfer.
///
/// Payloads of up to seven bytes become a single frame. Longer payloads are
/// cut into full seven-byte pieces with the remainder in the final frame;
/// the toggle starts set and alternates.
#[must_use]
pub fn transfer_frames(id: u32, payload: &[u8], transfer_id: u8) -> Vec<CanFrame> {
    if payload.len() <= 7 {
        return vec![data_frame(id, payload, tail_byte(true, true, true, transfer_id))];
    }
    let pieces: Vec<&[u8]> = payload.chunks(7).collect();
    let last = pieces.len() - 1;
    pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| {
            let tail = tail_byte(index == 0, index == last, index % 2 == 0, transfer_id);
            data_frame(id, piece, tail)
        })
        .collect()
}
