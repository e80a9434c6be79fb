//! # Intrusive Frame Stack
//!
//! A free frame stores the link to the next free frame in its own first word:
//!
//! ```text
//! head ──► +-----------+----------------------+
//!          | next (u64)|  FREE_JUNK ...       |  frame A
//!          +-----|-----+----------------------+
//!                ▼
//!          +-----------+----------------------+
//!          | 0         |  FREE_JUNK ...       |  frame B (tail)
//!          +-----------+----------------------+
//! ```
//!
//! Link value `0` terminates the list. Physical address zero is never a
//! managed frame because every managed frame lies at or above the (non-zero)
//! kernel image end.

use crate::PhysMapper;
use kernel_memory_addresses::{PageSize, PhysicalAddress, PhysicalPage};

/// Link value that marks the end of the list.
const END_OF_LIST: u64 = 0;

/// LIFO stack of free frames of size `S`.
///
/// # Invariants
/// - Every linked frame is exclusively owned by the list.
/// - `len` equals the number of linked frames.
pub struct FreeList<S: PageSize> {
    head: Option<PhysicalPage<S>>,
    len: usize,
}

impl<S: PageSize> Default for FreeList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PageSize> FreeList<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The frame the next [`pop`](Self::pop) returns.
    #[must_use]
    pub const fn peek(&self) -> Option<PhysicalPage<S>> {
        self.head
    }

    /// Link `frame` in as the new head.
    ///
    /// # Safety
    /// - `frame` must be writable through `mapper` and owned by the caller.
    /// - `frame` must not already be on any list.
    pub unsafe fn push<M: PhysMapper>(&mut self, mapper: &M, frame: PhysicalPage<S>) {
        let next = self.head.map_or(END_OF_LIST, |head| head.base().as_u64());
        unsafe { link_ptr(mapper, frame).write(next) };
        self.head = Some(frame);
        self.len += 1;
    }

    /// Unlink the head and hand ownership to the caller.
    ///
    /// # Safety
    /// Every frame on the list must still be reachable through `mapper`.
    pub unsafe fn pop<M: PhysMapper>(&mut self, mapper: &M) -> Option<PhysicalPage<S>> {
        let frame = self.head?;
        let next = unsafe { link_ptr(mapper, frame).read() };
        self.head = match next {
            END_OF_LIST => None,
            base => Some(PhysicalPage::new_aligned(PhysicalAddress::new(base))),
        };
        self.len -= 1;
        Some(frame)
    }
}

/// Pointer to the link word at the start of `frame`.
///
/// Frames are at least 4 KiB aligned and mappers preserve alignment.
#[allow(clippy::cast_ptr_alignment)]
#[inline]
unsafe fn link_ptr<S: PageSize, M: PhysMapper>(mapper: &M, frame: PhysicalPage<S>) -> *mut u64 {
    unsafe { mapper.phys_to_ptr(frame.base()) }.cast::<u64>()
}
