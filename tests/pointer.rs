use ringpipe::SPSC::Buffer::layout::Pointer;

#[test]
fn starts_at_zero() {
    let pt = Pointer::zero();
    let snap = pt.load_acquire();
    assert_eq!(snap.val(), 0);
    assert_eq!(snap.wrap_indicator(), 0);
}

#[test]
fn inc_stays_below_capacity() {
    let capacity = 7;
    let pt = Pointer::zero();
    for expected in 1..capacity {
        pt.inc(capacity);
        let snap = pt.load_acquire();
        assert_eq!(snap.val(), expected);
        assert_eq!(snap.wrap_indicator(), 0);
    }
}

#[test]
fn capacity_incs_return_to_start_with_one_more_wrap() {
    // From any starting offset, exactly `capacity` single steps must land on
    // the same index with the wrap generation bumped exactly once.
    let capacity = 7;
    for start in 0..capacity {
        let pt = Pointer::zero();
        pt.inc_by(start, capacity);
        let before = pt.load_acquire();
        for _ in 0..capacity {
            pt.inc(capacity);
        }
        let after = pt.load_acquire();
        assert_eq!(after.val(), before.val(), "start offset {start}");
        assert_eq!(
            after.wrap_indicator(),
            before.wrap_indicator() + 1,
            "start offset {start}"
        );
    }
}

#[test]
fn inc_by_counts_rolls() {
    let capacity = 4;
    let pt = Pointer::zero();

    pt.inc_by(3, capacity);
    let snap = pt.load_acquire();
    assert_eq!(snap.val(), 3);
    assert_eq!(snap.wrap_indicator(), 0);

    // 3 + 4 = 7: one roll through zero, index 3
    pt.inc_by(capacity, capacity);
    let snap = pt.load_acquire();
    assert_eq!(snap.val(), 3);
    assert_eq!(snap.wrap_indicator(), 1);

    // 3 + 1 = 4: rolls to 0, second wrap
    pt.inc_by(1, capacity);
    let snap = pt.load_acquire();
    assert_eq!(snap.val(), 0);
    assert_eq!(snap.wrap_indicator(), 2);
}

#[test]
fn snapshots_compare_by_packed_word() {
    let capacity = 5;
    let a = Pointer::zero();
    let b = Pointer::zero();
    assert_eq!(a.load_acquire(), b.load_acquire());

    // Same index, different generation: not equal
    for _ in 0..capacity {
        a.inc(capacity);
    }
    let sa = a.load_acquire();
    let sb = b.load_acquire();
    assert_eq!(sa.val(), sb.val());
    assert_ne!(sa, sb);
}
