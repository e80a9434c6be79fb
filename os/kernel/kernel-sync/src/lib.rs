//! # Kernel synchronization primitives
//!
//! A [`Mutex`] is a value guarded by a raw lock `R`. The raw lock decides how
//! contenders wait:
//!
//! - [`RawSpin`]: test-and-test-and-set spinning, no fairness.
//! - [`RawTicket`]: FIFO ticket lock, every waiter eventually gets its turn.
//!
//! Neither lock is reentrant. Guards release on drop, including during unwind.
//!
//! [`SyncOnceCell`] publishes a value exactly once and is used for objects
//! that live for the whole lifetime of the kernel.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod mutex;
mod raw_spin;
mod raw_ticket;
mod sync_once_cell;

pub use mutex::{Mutex, MutexGuard};
pub use raw_spin::RawSpin;
pub use raw_ticket::RawTicket;
pub use sync_once_cell::SyncOnceCell;

pub type SpinMutex<T> = Mutex<T, RawSpin>;
pub type TicketMutex<T> = Mutex<T, RawTicket>;

impl<T> SpinMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::from_raw(RawSpin::new(), value)
    }
}

impl<T> TicketMutex<T> {
    pub const fn new(value: T) -> Self {
        Self::from_raw(RawTicket::new(), value)
    }
}

/// Acquire side of a raw lock.
pub trait RawLock {
    /// Block (spin) until the lock is held by the caller.
    fn raw_lock(&self);
    /// Take the lock if it is free; never waits.
    fn raw_try_lock(&self) -> bool;
    /// Snapshot of whether someone holds the lock. Racy by nature.
    fn raw_is_locked(&self) -> bool;
}

/// Release side of a raw lock.
pub trait RawUnlock {
    /// # Safety
    /// The caller must hold the lock.
    unsafe fn raw_unlock(&self);
}
