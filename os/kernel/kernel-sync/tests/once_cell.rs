use kernel_sync::SyncOnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn empty_until_set() {
    let cell = SyncOnceCell::<u32>::new();
    assert!(cell.get().is_none());
    assert_eq!(cell.set(7), Ok(&7));
    assert_eq!(cell.get(), Some(&7));
}

#[test]
fn second_set_hands_value_back() {
    let cell = SyncOnceCell::new();
    assert!(cell.set(String::from("first")).is_ok());
    assert_eq!(cell.set(String::from("second")), Err(String::from("second")));
    assert_eq!(cell.get().map(String::as_str), Some("first"));
}

#[test]
fn get_or_init_runs_once() {
    let cell = SyncOnceCell::new();
    let calls = AtomicUsize::new(0);
    let a = *cell.get_or_init(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        5
    });
    let b = *cell.get_or_init(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        6
    });
    assert_eq!((a, b), (5, 5));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_set_has_single_winner() {
    let threads = 8;
    let cell = Arc::new(SyncOnceCell::new());
    let start = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let cell = Arc::clone(&cell);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                cell.set(i).is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    assert!(cell.get().is_some());
}

#[test]
fn drops_stored_value() {
    let witness = Arc::new(());
    {
        let cell = SyncOnceCell::new();
        assert!(cell.set(Arc::clone(&witness)).is_ok());
        assert_eq!(Arc::strong_count(&witness), 2);
    }
    assert_eq!(Arc::strong_count(&witness), 1);
}
