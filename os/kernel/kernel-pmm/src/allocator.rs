//! # Two-Pool Frame Allocator
//!
//! [`FrameAllocator`] owns a standard pool and a superpage pool and routes
//! every free to one of them by comparing the address with the partition
//! boundary. It is seeded exactly once by [`FrameAllocator::initialize`].
//!
//! ## Range initialization
//!
//! ```text
//! start      round up (4K)                     boundary    round up (2M)      end
//!   │ skipped │ 4K │ 4K │ 4K │ ... │ 4K │ 4K │    │ skipped │  2M  │  2M  │ tail │
//! ```
//!
//! Fragments that cannot form a whole frame (before the first standard frame,
//! at the switch to superpages, and after the last frame) are left unused.

use crate::layout::{Granularity, PhysLayout};
use crate::{FramePool, FreeError, PhysMapper};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use kernel_memory_addresses::{PageSize, PhysicalAddress, PhysicalPage, Size2M, Size4K, align_up};
use kernel_sync::{RawLock, RawSpin, RawUnlock};
use log::{debug, error, info};

/// What [`FrameAllocator::initialize`] put into the pools.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// 4 KiB frames pushed onto the standard pool.
    pub standard_frames: u64,
    /// 2 MiB frames pushed onto the superpage pool.
    pub superpages: u64,
    /// Bytes of the range that did not form a whole frame.
    pub discarded_bytes: u64,
}

impl InitReport {
    /// Bytes handed to the pools.
    #[must_use]
    pub const fn managed_bytes(&self) -> u64 {
        self.standard_frames * Size4K::SIZE + self.superpages * Size2M::SIZE
    }
}

impl fmt::Display for InitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} KiB in {} standard frames, {} MiB in {} superpages, {} bytes unused",
            self.standard_frames * Size4K::SIZE / 1024,
            self.standard_frames,
            self.superpages * Size2M::SIZE / (1024 * 1024),
            self.superpages,
            self.discarded_bytes
        )
    }
}

/// Snapshot of both pools' free counts.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub standard_free: usize,
    pub superpages_free: usize,
}

/// Physical frame allocator with a standard and a superpage pool.
///
/// `M` is how the allocator reaches frame memory, `R` the raw lock guarding
/// each pool.
pub struct FrameAllocator<M, R = RawSpin> {
    layout: PhysLayout,
    mapper: M,
    standard: FramePool<Size4K, R>,
    superpages: FramePool<Size2M, R>,
    initialized: AtomicBool,
}

impl<M: PhysMapper> FrameAllocator<M, RawSpin> {
    /// An allocator with empty pools. Seed it with [`initialize`](Self::initialize).
    #[must_use]
    pub const fn new(layout: PhysLayout, mapper: M) -> Self {
        Self::with_locks(layout, mapper, RawSpin::new(), RawSpin::new())
    }
}

impl<M, R> FrameAllocator<M, R> {
    /// Like [`new`](FrameAllocator::new), with caller-supplied pool locks.
    pub const fn with_locks(layout: PhysLayout, mapper: M, standard_lock: R, superpage_lock: R) -> Self {
        Self {
            layout,
            mapper,
            standard: FramePool::from_raw(standard_lock),
            superpages: FramePool::from_raw(superpage_lock),
            initialized: AtomicBool::new(false),
        }
    }

    pub const fn layout(&self) -> &PhysLayout {
        &self.layout
    }

    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    pub const fn standard_pool(&self) -> &FramePool<Size4K, R> {
        &self.standard
    }

    pub const fn superpage_pool(&self) -> &FramePool<Size2M, R> {
        &self.superpages
    }

    /// Whether [`initialize`](FrameAllocator::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

impl<M, R> FrameAllocator<M, R>
where
    M: PhysMapper,
    R: RawLock + RawUnlock,
{
    /// Seed the pools from the raw physical range `[start, end)`.
    ///
    /// Walks the range in standard frames up to the partition boundary, then
    /// in superpages. Every frame goes through [`free`](Self::free), so the
    /// range is validated exactly like a runtime free.
    ///
    /// # Safety
    /// `[start, end)` must be RAM reachable through the mapper and unused by
    /// anything else, now and for the lifetime of the allocator.
    ///
    /// # Panics
    /// Halts if called twice, or if the range yields a frame that fails
    /// validation (see [`FreeError`]).
    pub unsafe fn initialize(&self, start: PhysicalAddress, end: PhysicalAddress) -> InitReport {
        if self.initialized.swap(true, Ordering::AcqRel) {
            error!("pmm: initialize called twice");
            panic!("pmm: initialize called twice");
        }
        debug!("pmm: layout {}; seeding [{start}, {end})", self.layout);

        let boundary = self.layout.boundary().as_u64();
        let (start, end) = (start.as_u64(), end.as_u64());

        let mut report = InitReport::default();
        let mut p = align_up(start, Size4K::SIZE);
        report.discarded_bytes += p.min(end).saturating_sub(start);

        let mut step = Size4K::SIZE;
        loop {
            if step == Size4K::SIZE && p >= boundary {
                let aligned = align_up(p, Size2M::SIZE);
                report.discarded_bytes += aligned.min(end).saturating_sub(p);
                p = aligned;
                step = Size2M::SIZE;
            }

            let Some(next) = p.checked_add(step) else {
                break;
            };
            if next > end {
                break;
            }

            unsafe { self.free(PhysicalAddress::new(p)) };
            if step == Size4K::SIZE {
                report.standard_frames += 1;
            } else {
                report.superpages += 1;
            }
            p = next;
        }
        report.discarded_bytes += end.saturating_sub(p);

        info!("pmm: {report}");
        report
    }

    /// Seed the pools with everything from the kernel image end to the top of RAM.
    ///
    /// # Safety
    /// See [`initialize`](Self::initialize).
    pub unsafe fn initialize_from_layout(&self) -> InitReport {
        unsafe { self.initialize(self.layout.kernel_end(), self.layout.phys_top()) }
    }

    /// Take a 4 KiB frame, filled with [`ALLOC_JUNK`](crate::ALLOC_JUNK).
    ///
    /// `None` if the standard pool is empty. Never falls back to superpages.
    pub fn allocate_standard(&self) -> Option<PhysicalPage<Size4K>> {
        self.standard.allocate(&self.mapper)
    }

    /// Take a 2 MiB frame, filled with [`ALLOC_JUNK`](crate::ALLOC_JUNK).
    ///
    /// `None` if the superpage pool is empty.
    pub fn allocate_superpage(&self) -> Option<PhysicalPage<Size2M>> {
        self.superpages.allocate(&self.mapper)
    }

    /// Return a frame, or report why it cannot be returned.
    ///
    /// The pool is chosen by the address; on error nothing is written and no
    /// pool is touched.
    ///
    /// # Safety
    /// On success the caller gives up the frame: it must own the whole frame
    /// and must not use it afterwards.
    ///
    /// # Errors
    /// The first invariant `pa` violates, see [`PhysLayout::validate_free`].
    pub unsafe fn try_free(&self, pa: PhysicalAddress) -> Result<(), FreeError> {
        match self.layout.validate_free(pa)? {
            Granularity::Standard => unsafe {
                self.standard.release(&self.mapper, PhysicalPage::new_aligned(pa));
            },
            Granularity::Superpage => unsafe {
                self.superpages.release(&self.mapper, PhysicalPage::new_aligned(pa));
            },
        }
        Ok(())
    }

    /// Return a frame of either size.
    ///
    /// # Safety
    /// See [`try_free`](Self::try_free).
    ///
    /// # Panics
    /// Halts on any [`FreeError`]; an invalid free means memory is already
    /// corrupted, and no pool lock is held at that point.
    pub unsafe fn free(&self, pa: PhysicalAddress) {
        if let Err(e) = unsafe { self.try_free(pa) } {
            fatal_free(e);
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            standard_free: self.standard.free_frames(),
            superpages_free: self.superpages.free_frames(),
        }
    }
}

#[cold]
#[inline(never)]
fn fatal_free(e: FreeError) -> ! {
    error!("pmm: free pa={}: {e}", e.addr());
    panic!("pmm: free pa={}: {e}", e.addr());
}
