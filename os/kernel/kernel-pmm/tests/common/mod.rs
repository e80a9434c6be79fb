//! Host-side "physical memory" for allocator tests.
//!
//! The arena is a superpage-aligned heap allocation. Its real addresses are
//! used as physical addresses through `IdentityMapper`.

#![allow(dead_code)]

use kernel_memory_addresses::{PageSize, PhysicalAddress, Size2M, Size4K};
use kernel_pmm::{FrameAllocator, IdentityMapper, PhysLayout};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;

pub const MIB: u64 = 1024 * 1024;

/// Kernel image end used by most tests: deliberately not frame aligned.
pub const KERNEL_END_OFFSET: u64 = 0x5123;
/// Partition boundary offset into the arena.
pub const BOUNDARY_OFFSET: u64 = 4 * MIB;
/// Arena size, i.e. top of RAM offset.
pub const ARENA_SIZE: u64 = 12 * MIB;

pub struct Arena {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Arena {
    pub fn new(size: u64) -> Self {
        let layout = Layout::from_size_align(size as usize, Size2M::SIZE as usize).unwrap();
        let ptr = NonNull::new(unsafe { alloc_zeroed(layout) }).expect("arena allocation");
        Self { ptr, layout }
    }

    pub fn base(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.ptr.as_ptr().expose_provenance() as u64)
    }

    pub fn at(&self, offset: u64) -> PhysicalAddress {
        assert!(offset <= self.layout.size() as u64);
        self.base() + offset
    }

    pub fn end(&self) -> PhysicalAddress {
        self.at(self.layout.size() as u64)
    }

    /// Contents of `[pa, pa + len)`.
    pub fn bytes(&self, pa: PhysicalAddress, len: u64) -> &[u8] {
        let offset = pa.as_u64() - self.base().as_u64();
        assert!(offset + len <= self.layout.size() as u64);
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(offset as usize), len as usize) }
    }

    pub fn frame<S: PageSize>(&self, pa: PhysicalAddress) -> &[u8] {
        self.bytes(pa, S::SIZE)
    }

    /// Layout over this arena with the default test offsets.
    pub fn layout(&self) -> PhysLayout {
        PhysLayout::new(self.at(KERNEL_END_OFFSET), self.at(BOUNDARY_OFFSET), self.end()).unwrap()
    }

    pub fn allocator(&self) -> FrameAllocator<IdentityMapper> {
        FrameAllocator::new(self.layout(), IdentityMapper)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

/// Expected counts for `initialize_from_layout` over the default arena.
pub fn expected_standard_frames() -> u64 {
    let first = KERNEL_END_OFFSET.div_ceil(Size4K::SIZE) * Size4K::SIZE;
    (BOUNDARY_OFFSET - first) / Size4K::SIZE
}

pub fn expected_superpages() -> u64 {
    (ARENA_SIZE - BOUNDARY_OFFSET) / Size2M::SIZE
}
