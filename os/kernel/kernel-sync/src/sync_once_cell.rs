use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU8, Ordering};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const FULL: u8 = 2;

/// A cell written at most once and readable from any context afterwards.
///
/// Holders of kernel-lifetime singletons (the frame allocator, for one)
/// install through [`set`](Self::set), which never waits: a loser gets its
/// value back instead of blocking behind the winner.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    slot: UnsafeCell<MaybeUninit<T>>,
}

// Shared after FULL; only the claimant of WRITING ever writes the slot.
unsafe impl<T: Sync + Send> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            slot: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.is_full().then(|| unsafe { self.read() })
    }

    /// Store `value` if the cell is still empty.
    ///
    /// # Errors
    /// Hands `value` back if the cell was already set or is being set by
    /// another context.
    pub fn set(&self, value: T) -> Result<&T, T> {
        if self.claim() {
            Ok(unsafe { self.fill(value) })
        } else {
            Err(value)
        }
    }

    /// Initialize at most once and return `&T`.
    ///
    /// Contenders that lose the race spin until the winner has published.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        if let Some(v) = self.get() {
            return v;
        }
        if self.claim() {
            return unsafe { self.fill(init()) };
        }
        while !self.is_full() {
            spin_loop();
        }
        unsafe { self.read() }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.state.load(Ordering::Acquire) == FULL
    }

    /// Move EMPTY to WRITING; `true` if this caller now owns the slot.
    #[inline]
    fn claim(&self) -> bool {
        self.state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// # Safety
    /// The caller must own the slot through [`claim`](Self::claim).
    unsafe fn fill(&self, value: T) -> &T {
        unsafe { (*self.slot.get()).write(value) };
        self.state.store(FULL, Ordering::Release);
        unsafe { self.read() }
    }

    /// # Safety
    /// The state must be FULL.
    #[inline]
    unsafe fn read(&self) -> &T {
        unsafe { (*self.slot.get()).assume_init_ref() }
    }
}

impl<T> Drop for SyncOnceCell<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == FULL {
            unsafe { self.slot.get_mut().assume_init_drop() }
        }
    }
}
