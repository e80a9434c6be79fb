//! # Kernel-wide Frame Allocator
//!
//! Direct-mapped kernels install one [`FrameAllocator`] for their whole
//! lifetime. Installation happens once, during boot; everything else goes
//! through the free functions here.
//!
//! ```rust,no_run
//! use kernel_memory_addresses::PhysicalAddress;
//! use kernel_pmm::global;
//!
//! # let kernel_end = PhysicalAddress::new(0x8002_1000);
//! let report = unsafe { global::init_with_defaults(kernel_end) }.expect("pmm init");
//! let frame = global::allocate_standard().expect("out of memory");
//! unsafe { global::free(frame.base()) };
//! ```

use crate::{FrameAllocator, IdentityMapper, InitReport, LayoutError, PhysLayout};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, Size2M, Size4K};
use kernel_sync::SyncOnceCell;
use log::error;

static PMM: SyncOnceCell<FrameAllocator<IdentityMapper>> = SyncOnceCell::new();

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallError {
    #[error("the frame allocator is already installed")]
    AlreadyInstalled,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Install the kernel-wide allocator and seed it from `layout`.
///
/// # Safety
/// Everything from `layout.kernel_end()` to `layout.phys_top()` must be
/// identity-mapped RAM that nothing else uses.
///
/// # Errors
/// [`InstallError::AlreadyInstalled`] on every call after the first.
pub unsafe fn init(layout: PhysLayout) -> Result<InitReport, InstallError> {
    let pmm = PMM
        .set(FrameAllocator::new(layout, IdentityMapper))
        .map_err(|_| InstallError::AlreadyInstalled)?;
    Ok(unsafe { pmm.initialize_from_layout() })
}

/// [`init`] with the default boundary and top of RAM.
///
/// # Safety
/// See [`init`].
///
/// # Errors
/// [`InstallError::Layout`] if `kernel_end` does not fit the default layout,
/// otherwise as [`init`].
pub unsafe fn init_with_defaults(kernel_end: PhysicalAddress) -> Result<InitReport, InstallError> {
    let layout = PhysLayout::with_defaults(kernel_end)?;
    unsafe { init(layout) }
}

/// The installed allocator, if any.
pub fn get() -> Option<&'static FrameAllocator<IdentityMapper>> {
    PMM.get()
}

/// A 4 KiB frame, or `None` if exhausted or not installed yet.
#[must_use]
pub fn allocate_standard() -> Option<PhysicalPage<Size4K>> {
    get()?.allocate_standard()
}

/// A 2 MiB frame, or `None` if exhausted or not installed yet.
#[must_use]
pub fn allocate_superpage() -> Option<PhysicalPage<Size2M>> {
    get()?.allocate_superpage()
}

/// Return a frame to the kernel-wide allocator.
///
/// # Safety
/// See [`FrameAllocator::free`].
///
/// # Panics
/// Halts on an invalid address, or if no allocator is installed.
pub unsafe fn free(pa: PhysicalAddress) {
    let Some(pmm) = get() else {
        error!("pmm: free pa={pa}: frame allocator not installed");
        panic!("pmm: free pa={pa}: frame allocator not installed");
    };
    unsafe { pmm.free(pa) }
}
