//! # Memory Layout

use kernel_memory_addresses::{PageSize, Size2M, Size4K};

/// Physical address at which RAM begins and the kernel image is loaded.
pub const KERNBASE: u64 = 0x8000_0000;

/// Amount of installed RAM the allocator manages.
pub const RAM_SIZE: u64 = 128 * 1024 * 1024;

/// Top of installed RAM; the first physical address the allocator never touches.
pub const PHYSTOP: u64 = KERNBASE + RAM_SIZE;

/// Partition boundary between standard frames (below) and superpages (at or above).
pub const PAGE_BOUNDARY: u64 = KERNBASE + 64 * 1024 * 1024;

/// A simple Higher Half Direct Map (HHDM) base.
/// Anything you map at [`HHDM_BASE`] + `pa` lets the kernel
/// access physical memory via a fixed offset.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

const _: () = {
    assert!(KERNBASE.is_multiple_of(Size2M::SIZE));
    assert!(PAGE_BOUNDARY.is_multiple_of(Size2M::SIZE));
    assert!(PHYSTOP.is_multiple_of(Size4K::SIZE));
    assert!(KERNBASE < PAGE_BOUNDARY);
    assert!(PAGE_BOUNDARY <= PHYSTOP);
    assert!(HHDM_BASE.checked_add(PHYSTOP).is_some());
};
