//! # Frame Pool
//!
//! A [`FreeList`] behind one lock. The lock is held for a single push or pop;
//! the sentinel fill touches only the frame being transferred, which the
//! calling context owns exclusively at that point, so it runs unlocked.

use crate::free_list::FreeList;
use crate::{ALLOC_JUNK, FREE_JUNK, PhysMapper};
use kernel_memory_addresses::{PageSize, PhysicalPage};
use kernel_sync::{Mutex, RawLock, RawSpin, RawUnlock};
use log::debug;

/// Free frames of one granularity.
pub struct FramePool<S: PageSize, R = RawSpin> {
    list: Mutex<FreeList<S>, R>,
}

impl<S: PageSize> FramePool<S, RawSpin> {
    #[must_use]
    pub const fn new() -> Self {
        Self::from_raw(RawSpin::new())
    }
}

impl<S: PageSize> Default for FramePool<S, RawSpin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PageSize, R> FramePool<S, R> {
    /// An empty pool guarded by `raw`.
    pub const fn from_raw(raw: R) -> Self {
        Self {
            list: Mutex::from_raw(raw, FreeList::new()),
        }
    }
}

impl<S: PageSize, R: RawLock + RawUnlock> FramePool<S, R> {
    /// Pop a frame and fill it with [`ALLOC_JUNK`].
    ///
    /// Returns `None` when the pool is empty; nothing else happens in that case.
    pub fn allocate<M: PhysMapper>(&self, mapper: &M) -> Option<PhysicalPage<S>> {
        let frame = self.list.with_lock(|list| unsafe { list.pop(mapper) });
        let Some(frame) = frame else {
            debug!("{} frame pool exhausted", S::as_str());
            return None;
        };
        unsafe { fill(mapper, frame, ALLOC_JUNK) };
        Some(frame)
    }

    /// Fill `frame` with [`FREE_JUNK`] and push it.
    ///
    /// No validation happens here; see
    /// [`FrameAllocator::free`](crate::FrameAllocator::free).
    ///
    /// # Safety
    /// - `frame` must be RAM reachable through `mapper`.
    /// - The caller must own `frame` exclusively and stop using it.
    pub unsafe fn release<M: PhysMapper>(&self, mapper: &M, frame: PhysicalPage<S>) {
        unsafe { fill(mapper, frame, FREE_JUNK) };
        self.list.with_lock(|list| unsafe { list.push(mapper, frame) });
    }

    /// Number of frames currently available.
    pub fn free_frames(&self) -> usize {
        self.list.with_lock(|list| list.len())
    }

    pub fn is_empty(&self) -> bool {
        self.list.with_lock(|list| list.is_empty())
    }

    /// Whether the pool lock is currently held by anyone.
    pub fn is_locked(&self) -> bool {
        self.list.is_locked()
    }
}

/// Overwrite all of `frame` with `byte`.
///
/// # Safety
/// The caller must own `frame` exclusively.
#[allow(clippy::cast_possible_truncation)]
unsafe fn fill<S: PageSize, M: PhysMapper>(mapper: &M, frame: PhysicalPage<S>, byte: u8) {
    unsafe {
        mapper
            .phys_to_ptr(frame.base())
            .write_bytes(byte, S::SIZE as usize);
    }
}
