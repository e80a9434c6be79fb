mod common;

use common::{ARENA_SIZE, Arena, BOUNDARY_OFFSET, KERNEL_END_OFFSET};
use kernel_memory_addresses::{PageSize, PhysicalAddress, Size4K};
use kernel_pmm::{FREE_JUNK, FreeError, PoolStats};

#[test]
fn try_free_reports_each_violation_without_touching_pools() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    let layout = *pmm.layout();

    let misaligned = arena.at(64 * 1024 + 0x10);
    let below = arena.at(0x1000);
    let at_top = arena.end();
    let odd_superpage = arena.at(BOUNDARY_OFFSET + Size4K::SIZE);

    let cases = [
        (misaligned, FreeError::Misaligned(misaligned)),
        (
            below,
            FreeError::BelowKernelEnd {
                addr: below,
                kernel_end: layout.kernel_end(),
            },
        ),
        (
            at_top,
            FreeError::BeyondPhysTop {
                addr: at_top,
                phys_top: layout.phys_top(),
            },
        ),
        (odd_superpage, FreeError::SuperpageMisaligned(odd_superpage)),
    ];

    for (pa, expected) in cases {
        assert_eq!(unsafe { pmm.try_free(pa) }, Err(expected));
        assert_eq!(expected.addr(), pa);
    }
    assert_eq!(pmm.stats(), PoolStats::default());
}

#[test]
fn rejected_frame_is_not_filled() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    let odd_superpage = arena.at(BOUNDARY_OFFSET + Size4K::SIZE);

    assert!(unsafe { pmm.try_free(odd_superpage) }.is_err());
    assert!(arena.frame::<Size4K>(odd_superpage).iter().all(|&b| b != FREE_JUNK));
}

#[test]
fn diagnostic_names_the_address() {
    let pa = PhysicalAddress::new(0x8040_1000);
    let msg = FreeError::SuperpageMisaligned(pa).to_string();
    assert!(msg.contains("0x0000000080401000"), "{msg}");
}

#[test]
#[should_panic(expected = "not aligned to the standard frame size")]
fn misaligned_free_halts() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    unsafe { pmm.free(arena.at(64 * 1024 + 8)) };
}

#[test]
#[should_panic(expected = "below the end of the kernel image")]
fn free_inside_kernel_image_halts() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    let last_kernel_frame = KERNEL_END_OFFSET / Size4K::SIZE * Size4K::SIZE;
    unsafe { pmm.free(arena.at(last_kernel_frame)) };
}

#[test]
#[should_panic(expected = "past the top of RAM")]
fn free_at_top_of_ram_halts() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    unsafe { pmm.free(arena.end()) };
}

#[test]
#[should_panic(expected = "not superpage aligned")]
fn standard_sized_free_in_superpage_territory_halts() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    unsafe { pmm.free(arena.at(BOUNDARY_OFFSET + 16 * Size4K::SIZE)) };
}

#[test]
fn pool_lock_is_free_after_a_rejected_free() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();

    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
        pmm.free(arena.at(BOUNDARY_OFFSET + Size4K::SIZE));
    }));
    assert!(res.is_err());
    assert!(!pmm.standard_pool().is_locked());
    assert!(!pmm.superpage_pool().is_locked());
    assert_eq!(pmm.stats(), PoolStats::default());
}

#[test]
fn halt_message_names_the_operation_address_and_check() {
    let arena = Arena::new(ARENA_SIZE);
    let pmm = arena.allocator();
    let pa = arena.at(BOUNDARY_OFFSET + Size4K::SIZE);

    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe { pmm.free(pa) }))
        .expect_err("free must halt");
    let msg = payload
        .downcast_ref::<String>()
        .expect("formatted panic message");
    assert!(msg.starts_with(&format!("pmm: free pa={pa}: ")), "{msg}");
    assert!(msg.ends_with("not superpage aligned"), "{msg}");
}
