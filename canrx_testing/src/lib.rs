//! Shared fixtures for `canrx` integration tests.
//!
//! Frame builders follow the wire layout independently of the library's
//! codec, while [`Recorder`] and [`Switch`] stand in for the application's
//! delivery handler and acceptance filter.
//!
//! ```rust
//! use canrx::{RxConfig, RxInstance, RxStatus, session::RxSlot};
//! use canrx_testing::{Recorder, Switch, frame, service_id, tail_byte};
//!
//! let mut storage: [RxSlot; 8] = [const { RxSlot::VACANT }; 8];
//! let recorder = Recorder::new();
//! let mut rx = RxInstance::new(&mut storage, RxConfig::default(), Switch::new(), recorder.clone());
//! let single = frame(service_id(0, 0, true, 20, 0), &[], 1, tail_byte(true, true, true, 0));
//! assert_eq!(rx.handle_rx_frame(&single, 1), Ok(RxStatus::Delivered));
//! assert_eq!(recorder.count(), 1);
//! ```

pub mod frames;
pub mod logging;
pub mod recorder;

pub use frames::{
    anonymous_message_id,
    data_frame,
    frame,
    message_id,
    service_id,
    tail_byte,
    transfer_frames,
};
pub use logging::{LoggerHandle, logger};
pub use recorder::{ReceivedTransfer, Recorder, Switch};
