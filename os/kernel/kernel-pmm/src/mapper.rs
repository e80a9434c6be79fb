//! # Physical Memory Access
//!
//! The allocator has to write to the frames it manages (the free-list link and
//! the sentinel fills), but it only knows their physical addresses. A
//! [`PhysMapper`] turns a physical address into a pointer that is valid in the
//! current address space.
//!
//! - [`IdentityMapper`]: physical addresses are usable as-is (direct-mapped
//!   kernels, and hosted tests that treat real allocations as "RAM").
//! - [`OffsetMapper`]: physical memory is mapped at a fixed virtual offset,
//!   e.g. the higher-half direct map at [`HHDM_BASE`].

use kernel_info::memory::HHDM_BASE;
use kernel_memory_addresses::PhysicalAddress;

/// Converts physical addresses to pointers in the current address space.
///
/// # Safety
/// Implementations must map every physical address the allocator manages to
/// writable memory, preserving alignment.
pub unsafe trait PhysMapper {
    /// Pointer to the first byte of `pa`.
    ///
    /// # Safety
    /// `pa` must be covered by the mapping. The caller must own the memory
    /// behind it for as long as the pointer is used.
    unsafe fn phys_to_ptr(&self, pa: PhysicalAddress) -> *mut u8;
}

/// Physical address == virtual address.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityMapper;

unsafe impl PhysMapper for IdentityMapper {
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    unsafe fn phys_to_ptr(&self, pa: PhysicalAddress) -> *mut u8 {
        core::ptr::with_exposed_provenance_mut(pa.as_u64() as usize)
    }
}

/// Physical memory mapped at a constant virtual offset.
#[derive(Debug, Copy, Clone)]
pub struct OffsetMapper {
    offset: u64,
}

impl OffsetMapper {
    #[must_use]
    pub const fn new(offset: u64) -> Self {
        Self { offset }
    }

    /// Mapper for the kernel's higher-half direct map.
    #[must_use]
    pub const fn hhdm() -> Self {
        Self::new(HHDM_BASE)
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }
}

unsafe impl PhysMapper for OffsetMapper {
    #[allow(clippy::cast_possible_truncation)]
    #[inline]
    unsafe fn phys_to_ptr(&self, pa: PhysicalAddress) -> *mut u8 {
        let va = self.offset.wrapping_add(pa.as_u64());
        core::ptr::with_exposed_provenance_mut(va as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_address() {
        let ptr = unsafe { IdentityMapper.phys_to_ptr(PhysicalAddress::new(0x8000_1000)) };
        assert_eq!(ptr.addr(), 0x8000_1000);
    }

    #[test]
    fn offset_adds_base() {
        let mapper = OffsetMapper::new(0x4000_0000);
        let ptr = unsafe { mapper.phys_to_ptr(PhysicalAddress::new(0x8000_1000)) };
        assert_eq!(ptr.addr(), 0xC000_1000);
    }

    #[test]
    fn hhdm_uses_layout_constant() {
        assert_eq!(OffsetMapper::hhdm().offset(), HHDM_BASE);
    }
}
