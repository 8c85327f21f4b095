//! Unit tests for the fixed-block pool.

use proptest::prelude::*;
use rstest::rstest;

use super::{BlockIndex, MemoryPool, PoolExhausted, PoolStats, Slot};

fn storage<const N: usize>() -> [Slot<u32>; N] { [const { Slot::VACANT }; N] }

#[test]
fn zero_capacity_pool_always_fails() {
    let mut slots = storage::<0>();
    let mut pool = MemoryPool::new(&mut slots);
    assert_eq!(pool.allocate(1), Err(PoolExhausted));
    assert_eq!(pool.allocate(2), Err(PoolExhausted));
    assert_eq!(pool.stats(), PoolStats::default());
}

#[test]
fn allocation_exhausts_then_recovers_after_release() {
    let mut slots = storage::<2>();
    let mut pool = MemoryPool::new(&mut slots);
    let a = pool.allocate(10).expect("first block");
    let b = pool.allocate(20).expect("second block");
    assert_eq!(pool.allocate(30), Err(PoolExhausted));
    assert_eq!(pool.free_blocks(), 0);

    assert_eq!(pool.release(a), Some(10));
    let c = pool.allocate(30).expect("reused block");
    assert_eq!(c, a, "free list is LIFO");
    assert_eq!(pool.get(b), Some(&20));
    assert_eq!(pool.get(c), Some(&30));
}

#[test]
fn double_release_is_rejected() {
    let mut slots = storage::<1>();
    let mut pool = MemoryPool::new(&mut slots);
    let a = pool.allocate(5).expect("block");
    assert_eq!(pool.release(a), Some(5));
    assert_eq!(pool.release(a), None);
    assert_eq!(pool.used(), 0);
    assert!(pool.allocate(6).is_ok());
    assert!(pool.allocate(7).is_err(), "the block must not be listed twice");
}

#[test]
fn stale_index_cannot_reach_vacant_block() {
    let mut slots = storage::<3>();
    let mut pool = MemoryPool::new(&mut slots);
    let a = pool.allocate(1).expect("block");
    pool.release(a);
    assert!(pool.get(a).is_none());
    assert!(pool.get_mut(a).is_none());
    assert!(pool.get(BlockIndex(99)).is_none());
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(16)]
fn peak_tracks_high_water_mark(#[case] count: usize) {
    let mut slots = storage::<16>();
    let mut pool = MemoryPool::new(&mut slots);
    let handles: Vec<_> = (0..count)
        .map(|value| pool.allocate(u32::try_from(value).expect("small")).expect("capacity"))
        .collect();
    for handle in handles {
        pool.release(handle);
    }
    assert_eq!(
        pool.stats(),
        PoolStats {
            capacity: 16,
            used: 0,
            peak: count,
        }
    );
}

#[derive(Clone, Debug)]
enum Op {
    Allocate,
    Release(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Allocate), (0usize..16).prop_map(Op::Release)]
}

proptest! {
    #[test]
    fn occupancy_never_exceeds_capacity(ops in proptest::collection::vec(op(), 0..200)) {
        let mut slots = storage::<8>();
        let mut pool = MemoryPool::new(&mut slots);
        let mut live: Vec<(BlockIndex, u32)> = Vec::new();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                Op::Allocate => match pool.allocate(next_value) {
                    Ok(index) => {
                        prop_assert!(live.iter().all(|(held, _)| *held != index));
                        live.push((index, next_value));
                    }
                    Err(PoolExhausted) => {
                        prop_assert_eq!(live.len(), 8);
                    }
                },
                Op::Release(pick) if !live.is_empty() => {
                    let (index, value) = live.swap_remove(pick % live.len());
                    prop_assert_eq!(pool.release(index), Some(value));
                }
                Op::Release(_) => {}
            }
            next_value += 1;
            prop_assert_eq!(pool.used(), live.len());
            prop_assert!(pool.used() <= pool.capacity());
            for (index, value) in &live {
                prop_assert_eq!(pool.get(*index), Some(value));
            }
        }
    }
}
