//! Log output of the admission pipeline, captured through `logtest`.

use canrx::{RxConfig, RxInstance, hooks::AcceptAll, session::RxSlot};
use canrx_testing::{LoggerHandle, Recorder, frame, logger, message_id, tail_byte};
use rstest::rstest;

#[rstest]
fn rejections_are_logged_at_debug(mut logger: LoggerHandle) {
    let mut storage: [RxSlot; 4] = [const { RxSlot::VACANT }; 4];
    let mut rx = RxInstance::new(&mut storage, RxConfig::default(), AcceptAll, Recorder::new());
    let orphan = frame(message_id(0, 1, 1), &[], 1, tail_byte(false, false, false, 0));
    assert!(rx.handle_rx_frame(&orphan, 0).is_err());

    let found = logger.drain().into_iter().any(|(level, msg)| {
        level == log::Level::Debug && msg.contains("frame rejected") && msg.contains("code=-13")
    });
    assert!(found, "rejection not logged");
}

#[rstest]
fn deliveries_are_logged_at_trace(mut logger: LoggerHandle) {
    let mut storage: [RxSlot; 4] = [const { RxSlot::VACANT }; 4];
    let mut rx = RxInstance::new(&mut storage, RxConfig::default(), AcceptAll, Recorder::new());
    let single = frame(message_id(0, 42, 1), &[9], 3, tail_byte(true, true, false, 0));
    assert!(rx.handle_rx_frame(&single, 0).is_ok());

    let found = logger.drain().into_iter().any(|(level, msg)| {
        level == log::Level::Trace && msg.contains("delivering message on port 42")
    });
    assert!(found, "delivery not logged");
}

#[rstest]
fn oversized_storage_is_truncated_with_warning(mut logger: LoggerHandle) {
    let mut storage: Vec<RxSlot> = std::iter::repeat_with(|| RxSlot::VACANT)
        .take(usize::from(u16::MAX) + 1)
        .collect();
    let rx = RxInstance::new(&mut storage, RxConfig::default(), AcceptAll, Recorder::new());
    assert_eq!(rx.pool_stats().capacity, usize::from(u16::MAX));

    let found = logger
        .drain()
        .into_iter()
        .any(|(level, msg)| level == log::Level::Warn && msg.contains("truncated"));
    assert!(found, "truncation warning not logged");
}
