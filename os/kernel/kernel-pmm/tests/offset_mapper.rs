//! The allocator driven through a non-identity mapping.

mod common;

use common::{ARENA_SIZE, Arena, BOUNDARY_OFFSET, KERNEL_END_OFFSET, expected_standard_frames, expected_superpages};
use kernel_info::memory::KERNBASE;
use kernel_memory_addresses::{PhysicalAddress, Size2M, Size4K};
use kernel_pmm::{ALLOC_JUNK, FREE_JUNK, FrameAllocator, OffsetMapper, PhysLayout};

/// "Physical" RAM starts at `KERNBASE`; the arena is its virtual alias.
fn offset_allocator(arena: &Arena) -> FrameAllocator<OffsetMapper> {
    let layout = PhysLayout::new(
        PhysicalAddress::new(KERNBASE + KERNEL_END_OFFSET),
        PhysicalAddress::new(KERNBASE + BOUNDARY_OFFSET),
        PhysicalAddress::new(KERNBASE + ARENA_SIZE),
    )
    .unwrap();
    let mapper = OffsetMapper::new(arena.base().as_u64().wrapping_sub(KERNBASE));
    FrameAllocator::new(layout, mapper)
}

/// The arena address that aliases physical address `pa`.
fn alias(arena: &Arena, pa: PhysicalAddress) -> PhysicalAddress {
    arena.at(pa.as_u64() - KERNBASE)
}

#[test]
fn round_trip_through_offset_mapping() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = offset_allocator(&arena);
    let report = unsafe { pmm.initialize_from_layout() };
    assert_eq!(report.standard_frames, expected_standard_frames());
    assert_eq!(report.superpages, expected_superpages());

    let frame = pmm.allocate_standard().unwrap();
    let superpage = pmm.allocate_superpage().unwrap();
    assert!(frame.base().as_u64() >= KERNBASE + KERNEL_END_OFFSET);
    assert!(superpage.base().as_u64() >= KERNBASE + BOUNDARY_OFFSET);
    assert!(arena.frame::<Size4K>(alias(&arena, frame.base())).iter().all(|&b| b == ALLOC_JUNK));
    assert!(arena.frame::<Size2M>(alias(&arena, superpage.base())).iter().all(|&b| b == ALLOC_JUNK));

    unsafe {
        pmm.free(frame.base());
        pmm.free(superpage.base());
    }
    let link = size_of::<u64>();
    assert!(arena.frame::<Size4K>(alias(&arena, frame.base()))[link..].iter().all(|&b| b == FREE_JUNK));

    assert_eq!(pmm.allocate_standard(), Some(frame));
    assert_eq!(pmm.allocate_superpage(), Some(superpage));
}

#[test]
fn links_hold_physical_addresses() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = offset_allocator(&arena);
    let a = PhysicalAddress::new(KERNBASE + 0x10_000);
    let b = PhysicalAddress::new(KERNBASE + 0x20_000);
    unsafe {
        pmm.free(a);
        pmm.free(b);
    }

    let word = arena.bytes(alias(&arena, b), 8);
    assert_eq!(u64::from_ne_bytes(word.try_into().unwrap()), a.as_u64());
    assert_eq!(pmm.allocate_standard().map(|f| f.base()), Some(b));
    assert_eq!(pmm.allocate_standard().map(|f| f.base()), Some(a));
}
