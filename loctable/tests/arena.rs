//! Arena reservation, alignment and exhaustion

use loctable::{Arena, ArenaError, ARENA_ALIGNMENT};

#[test]
fn regions_are_aligned_and_disjoint() {
    let arena = Arena::new(1 << 20).unwrap();
    let a = arena.allocate(3).unwrap();
    let b = arena.allocate(17).unwrap();
    let c = arena.allocate(0).unwrap();
    let d = arena.allocate(1).unwrap();
    for region in [&a[..], &b[..], &c[..], &d[..]] {
        assert_eq!(region.as_ptr() as usize % ARENA_ALIGNMENT, 0);
    }
    a.fill(1);
    b.fill(2);
    d.fill(4);
    assert!(a.iter().all(|&x| x == 1));
    assert!(b.iter().all(|&x| x == 2));
    assert_eq!(b.as_ptr() as usize - a.as_ptr() as usize, 16);
    assert_eq!(d.as_ptr() as usize - b.as_ptr() as usize, 32);
    assert_eq!(arena.used(), 16 + 32 + 1);
}

#[test]
fn zeroed_regions() {
    let arena = Arena::new(1 << 16).unwrap();
    let dirty = arena.allocate(64).unwrap();
    dirty.fill(0xff);
    let clean = arena.allocate_zeroed(100).unwrap();
    assert_eq!(clean.len(), 100);
    assert!(clean.iter().all(|&x| x == 0));

    let words = arena.allocate_slice_zeroed::<usize>(10).unwrap();
    assert_eq!(words, &[0; 10]);
    let more = arena.allocate_slice::<u32>(5).unwrap();
    assert_eq!(more.len(), 5);
    assert_eq!(more.as_ptr() as usize % ARENA_ALIGNMENT, 0);
}

#[test]
fn reservation_is_whole_pages() {
    let arena = Arena::new(1).unwrap();
    assert!(arena.page_size().is_power_of_two());
    assert_eq!(arena.reserved(), arena.page_size());
    assert_eq!(arena.committed(), arena.page_size());
    assert_eq!(arena.used(), 0);

    let page = arena.page_size();
    let arena = Arena::new(page * 3 + 1).unwrap();
    assert_eq!(arena.reserved(), page * 4);
    let arena = Arena::new(0).unwrap();
    assert_eq!(arena.reserved(), page);
}

#[test]
fn commit_grows_page_by_page() {
    let arena = Arena::new(1 << 20).unwrap();
    let page = arena.page_size();
    let first = arena.allocate(page / 2).unwrap();
    assert_eq!(arena.committed(), page);
    let big = arena.allocate(page * 2).unwrap();
    assert_eq!(arena.committed() % page, 0);
    assert!(arena.committed() >= arena.used());
    assert_eq!(arena.committed(), page * 3);

    // Committed pages are writable end to end.
    first.fill(7);
    big.fill(9);
    assert_eq!(big[page * 2 - 1], 9);
    assert_eq!(first[0], 7);
}

#[test]
fn exhaustion_keeps_earlier_regions() {
    let arena = Arena::new(1).unwrap();
    let reserved = arena.reserved();
    let early = arena.allocate(100).unwrap();
    early.copy_from_slice(&[42; 100]);

    match arena.allocate(reserved) {
        Err(ArenaError::Exhausted {
            requested,
            used,
            reserved: total,
        }) => {
            assert_eq!(requested, reserved);
            assert_eq!(used, 100);
            assert_eq!(total, reserved);
        }
        other => panic!("unexpected result {other:?}"),
    }

    // The failed request didn't move the cursor.
    assert_eq!(arena.used(), 100);
    assert!(early.iter().all(|&x| x == 42));
    let rest = arena.allocate(reserved - 112).unwrap();
    assert_eq!(rest.len(), reserved - 112);
    assert_eq!(arena.used(), reserved);
    assert!(matches!(arena.allocate(1), Err(ArenaError::Exhausted { .. })));
    assert!(matches!(
        arena.allocate_slice::<usize>(usize::MAX),
        Err(ArenaError::Exhausted { .. })
    ));
}

#[test]
fn arena_moves_between_threads() {
    let arena = Arena::new(1 << 16).unwrap();
    let used = std::thread::spawn(move || {
        arena.allocate(10).unwrap().fill(1);
        arena.used()
    })
    .join()
    .unwrap();
    assert_eq!(used, 10);
}
