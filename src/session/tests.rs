//! State-machine tests driving the session table directly.

use rstest::{fixture, rstest};

use super::{Admission, FrameInput, RxSlot, SessionKey, SessionTable};
use crate::{
    error::RxError,
    pool::BlockIndex,
    transfer::{NodeId, PortId, TailByte, TransferId, TransferKind},
};

const TIMEOUT: u64 = 2_000_000;

fn key(source: u8) -> SessionKey {
    SessionKey {
        kind: TransferKind::Message,
        port: PortId::new(1234),
        source: NodeId::new(source).expect("7-bit source"),
    }
}

fn tail(start: bool, end: bool, toggle: bool, transfer_id: u8) -> TailByte {
    TailByte {
        start,
        end,
        toggle,
        transfer_id: TransferId::new(transfer_id).expect("5-bit transfer id"),
    }
}

fn frame(key: SessionKey, tail: TailByte, data: &[u8], timestamp: u64) -> FrameInput<'_> {
    FrameInput {
        key,
        tail,
        data,
        full_length: data.len() == 7,
        timestamp,
    }
}

fn first(key: SessionKey, transfer_id: u8, data: &[u8], timestamp: u64) -> FrameInput<'_> {
    frame(key, tail(true, false, true, transfer_id), data, timestamp)
}

fn expect_complete(admission: Result<Admission<'_>, RxError>) -> BlockIndex {
    match admission {
        Ok(Admission::Complete(index)) => index,
        other => panic!("expected completed transfer, got {other:?}"),
    }
}

fn collect(table: &SessionTable<'_>, index: BlockIndex) -> (u64, Vec<u8>) {
    let done = table.completed(index).expect("completed session");
    (done.started_at, done.payload.to_vec())
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
fn storage() -> [RxSlot; 8] { [const { RxSlot::VACANT }; 8] }

#[rstest]
#[case::middle(tail(false, false, false, 0))]
#[case::last(tail(false, true, false, 0))]
fn continuation_without_session_is_missed_start(
    mut storage: [RxSlot; 8],
    #[case] tail_byte: TailByte,
) {
    let mut table = SessionTable::new(&mut storage);
    let data = [0u8; 7];
    assert_eq!(
        table.accept(frame(key(1), tail_byte, &data, 10), TIMEOUT).err(),
        Some(RxError::MissedStart)
    );
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}

#[rstest]
fn two_frame_transfer_completes_with_start_timestamp(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    let head = [1, 2, 3, 4, 5, 6, 7];
    let rest = [8, 9, 10, 11, 12, 13];

    assert!(matches!(
        table.accept(first(key(5), 1, &head, 100), TIMEOUT),
        Ok(Admission::InProgress)
    ));
    assert_eq!(table.len(), 1);
    let index = expect_complete(
        table.accept(frame(key(5), tail(false, true, false, 1), &rest, 250), TIMEOUT),
    );

    let (started_at, payload) = collect(&table, index);
    assert_eq!(started_at, 100);
    assert_eq!(payload, (1..=13).collect::<Vec<u8>>());

    table.remove(index);
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}

#[rstest]
fn rejected_continuations_leave_session_intact(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    let head = [1; 7];
    table.accept(first(key(5), 3, &head, 0), TIMEOUT).expect("start");
    let used = table.pool_stats().used;

    let noise = [9; 7];
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, false, false, 4), &noise, 1), TIMEOUT)
            .err(),
        Some(RxError::UnexpectedTransferId)
    );
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, false, true, 3), &noise, 2), TIMEOUT)
            .err(),
        Some(RxError::WrongToggle)
    );
    assert_eq!(table.pool_stats().used, used);

    let index = expect_complete(
        table.accept(frame(key(5), tail(false, true, false, 3), &[2, 2], 3), TIMEOUT),
    );
    let (_, payload) = collect(&table, index);
    assert_eq!(payload, [1, 1, 1, 1, 1, 1, 1, 2, 2]);
}

#[rstest]
fn toggle_is_checked_before_frame_length(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(5), 0, &[0; 7], 0), TIMEOUT).expect("start");
    let short = [0u8; 0];
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, false, true, 0), &short, 1), TIMEOUT)
            .err(),
        Some(RxError::WrongToggle)
    );
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, false, false, 0), &short, 1), TIMEOUT)
            .err(),
        Some(RxError::ShortFrame)
    );
    assert_eq!(table.len(), 1);
}

#[rstest]
fn short_first_frame_is_rejected_before_allocation(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    assert_eq!(
        table.accept(first(key(5), 0, &[1, 2, 3], 0), TIMEOUT).err(),
        Some(RxError::ShortFrame)
    );
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().peak, 0);
}

#[test]
fn empty_pool_rejects_sessions_but_not_single_frames() {
    let mut storage: [RxSlot; 0] = [];
    let mut table = SessionTable::new(&mut storage);
    assert_eq!(
        table.accept(first(key(5), 0, &[0; 7], 0), TIMEOUT).err(),
        Some(RxError::OutOfMemory)
    );
    let single = [4, 2];
    assert!(matches!(
        table.accept(frame(key(5), tail(true, true, true, 0), &single, 0), TIMEOUT),
        Ok(Admission::Single(bytes)) if bytes == [4, 2]
    ));
}

#[test]
fn session_record_without_room_for_payload_is_rolled_back() {
    let mut storage: [RxSlot; 1] = [const { RxSlot::VACANT }; 1];
    let mut table = SessionTable::new(&mut storage);
    assert_eq!(
        table.accept(first(key(5), 0, &[0; 7], 0), TIMEOUT).err(),
        Some(RxError::OutOfMemory)
    );
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}

#[test]
fn append_failure_keeps_collected_payload() {
    // One session record plus one 40-byte chunk.
    let mut storage: [RxSlot; 2] = [const { RxSlot::VACANT }; 2];
    let mut table = SessionTable::new(&mut storage);
    let data = [7; 7];
    table.accept(first(key(5), 0, &data, 0), TIMEOUT).expect("start");
    let mut toggle = false;
    for ts in 1..=4 {
        table
            .accept(frame(key(5), tail(false, false, toggle, 0), &data, ts), TIMEOUT)
            .expect("fits in first chunk");
        toggle = !toggle;
    }
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, false, toggle, 0), &data, 5), TIMEOUT)
            .err(),
        Some(RxError::OutOfMemory)
    );
    assert_eq!(table.len(), 1);

    // The same toggle is still expected, and a short end fits the chunk.
    let index = expect_complete(
        table.accept(frame(key(5), tail(false, true, toggle, 0), &[1], 6), TIMEOUT),
    );
    let (_, payload) = collect(&table, index);
    assert_eq!(payload.len(), 36);
}

#[rstest]
#[case::stale(1_000, 1_000 + TIMEOUT + 1)]
#[case::clock_went_backwards(1, 0)]
fn expired_session_is_dropped_on_continuation(
    mut storage: [RxSlot; 8],
    #[case] start: u64,
    #[case] next: u64,
) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(5), 0, &[0; 7], start), TIMEOUT).expect("start");
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, true, false, 0), &[1], next), TIMEOUT)
            .err(),
        Some(RxError::MissedStart)
    );
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}

#[rstest]
fn gap_equal_to_timeout_is_still_live(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(5), 0, &[0; 7], 0), TIMEOUT).expect("start");
    expect_complete(
        table.accept(frame(key(5), tail(false, true, false, 0), &[1], TIMEOUT), TIMEOUT),
    );
}

#[rstest]
fn purge_drops_only_stale_sessions(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(1), 0, &[0; 7], 0), TIMEOUT).expect("old");
    table.accept(first(key(2), 0, &[0; 7], 2_500_000), TIMEOUT).expect("fresh");
    table.accept(first(key(3), 0, &[0; 7], 10), TIMEOUT).expect("old");

    assert_eq!(table.purge_expired(3_000_000, TIMEOUT), 2);
    assert_eq!(table.len(), 1);
    assert_eq!(table.pool_stats().used, 2);
    assert_eq!(table.purge_expired(3_000_000, TIMEOUT), 0);
}

#[rstest]
fn new_start_restarts_active_session(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(5), 1, &[1; 7], 0), TIMEOUT).expect("start");
    table
        .accept(frame(key(5), tail(false, false, false, 1), &[1; 7], 1), TIMEOUT)
        .expect("middle");

    table.accept(first(key(5), 2, &[2; 7], 2), TIMEOUT).expect("restart");
    assert_eq!(table.len(), 1);
    // The old transfer id no longer matches.
    assert_eq!(
        table
            .accept(frame(key(5), tail(false, true, false, 1), &[1], 3), TIMEOUT)
            .err(),
        Some(RxError::UnexpectedTransferId)
    );
    let index = expect_complete(
        table.accept(frame(key(5), tail(false, true, false, 2), &[3], 4), TIMEOUT),
    );
    let (started_at, payload) = collect(&table, index);
    assert_eq!(started_at, 2);
    assert_eq!(payload, [2, 2, 2, 2, 2, 2, 2, 3]);
}

#[rstest]
fn interleaved_sources_reassemble_independently(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(1), 0, &[1; 7], 0), TIMEOUT).expect("start 1");
    table.accept(first(key(2), 0, &[2; 7], 1), TIMEOUT).expect("start 2");
    assert_eq!(table.len(), 2);

    let second = expect_complete(
        table.accept(frame(key(2), tail(false, true, false, 0), &[22], 2), TIMEOUT),
    );
    assert_eq!(collect(&table, second).1, [2, 2, 2, 2, 2, 2, 2, 22]);
    table.remove(second);

    let first_done = expect_complete(
        table.accept(frame(key(1), tail(false, true, false, 0), &[11], 3), TIMEOUT),
    );
    assert_eq!(collect(&table, first_done).1, [1, 1, 1, 1, 1, 1, 1, 11]);
    table.remove(first_done);
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}

#[rstest]
fn single_frame_on_active_key_discards_session(mut storage: [RxSlot; 8]) {
    let mut table = SessionTable::new(&mut storage);
    table.accept(first(key(5), 0, &[0; 7], 0), TIMEOUT).expect("start");
    assert!(matches!(
        table.accept(frame(key(5), tail(true, true, true, 1), &[9], 1), TIMEOUT),
        Ok(Admission::Single(_))
    ));
    assert_eq!(table.len(), 0);
    assert_eq!(table.pool_stats().used, 0);
}
