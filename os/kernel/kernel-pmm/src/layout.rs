//! # Physical Partition
//!
//! ```text
//! kernel_end ──► standard 4 KiB frames ──► boundary ──► 2 MiB superpages ──► phys_top
//! ```
//!
//! The layout is fixed for the lifetime of an allocator. It decides which pool
//! a freed address belongs to and which addresses may be freed at all.

use crate::FreeError;
use core::fmt;
use kernel_info::memory::{PAGE_BOUNDARY, PHYSTOP};
use kernel_memory_addresses::{PageSize, PhysicalAddress, Size2M, Size4K};

/// Frame granularity, derived from an address's position relative to the boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// [`Size4K`] frames below the boundary.
    Standard,
    /// [`Size2M`] frames at or above the boundary.
    Superpage,
}

impl Granularity {
    /// Frame size in bytes.
    #[must_use]
    pub const fn size(self) -> u64 {
        match self {
            Self::Standard => Size4K::SIZE,
            Self::Superpage => Size2M::SIZE,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str(Size4K::as_str()),
            Self::Superpage => f.write_str(Size2M::as_str()),
        }
    }
}

/// Invalid physical layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("kernel end must lie above physical address zero")]
    ZeroKernelEnd,
    #[error("partition boundary {0} is not aligned to the superpage size")]
    UnalignedBoundary(PhysicalAddress),
    #[error("no usable memory between kernel end {kernel_end} and top of RAM {phys_top}")]
    EmptyRange {
        kernel_end: PhysicalAddress,
        phys_top: PhysicalAddress,
    },
}

/// The physical address ranges the allocator manages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhysLayout {
    kernel_end: PhysicalAddress,
    boundary: PhysicalAddress,
    phys_top: PhysicalAddress,
}

impl PhysLayout {
    /// Build a layout.
    ///
    /// - `kernel_end`: first address past the kernel image.
    /// - `boundary`: first superpage address; must be superpage aligned.
    /// - `phys_top`: first address past installed RAM.
    ///
    /// # Errors
    /// Returns a [`LayoutError`] if `kernel_end` is zero (address zero
    /// terminates the free lists), if `boundary` is not superpage aligned, or
    /// if there is no memory between `kernel_end` and `phys_top`.
    pub const fn new(
        kernel_end: PhysicalAddress,
        boundary: PhysicalAddress,
        phys_top: PhysicalAddress,
    ) -> Result<Self, LayoutError> {
        if kernel_end.as_u64() == 0 {
            return Err(LayoutError::ZeroKernelEnd);
        }
        if !boundary.is_aligned::<Size2M>() {
            return Err(LayoutError::UnalignedBoundary(boundary));
        }
        if kernel_end.as_u64() >= phys_top.as_u64() {
            return Err(LayoutError::EmptyRange {
                kernel_end,
                phys_top,
            });
        }
        Ok(Self {
            kernel_end,
            boundary,
            phys_top,
        })
    }

    /// Layout with the boundary and top of RAM from [`kernel_info::memory`].
    ///
    /// # Errors
    /// See [`PhysLayout::new`].
    pub const fn with_defaults(kernel_end: PhysicalAddress) -> Result<Self, LayoutError> {
        Self::new(
            kernel_end,
            PhysicalAddress::new(PAGE_BOUNDARY),
            PhysicalAddress::new(PHYSTOP),
        )
    }

    #[must_use]
    pub const fn kernel_end(&self) -> PhysicalAddress {
        self.kernel_end
    }

    #[must_use]
    pub const fn boundary(&self) -> PhysicalAddress {
        self.boundary
    }

    #[must_use]
    pub const fn phys_top(&self) -> PhysicalAddress {
        self.phys_top
    }

    /// Which pool `pa` belongs to.
    #[must_use]
    pub const fn granularity_of(&self, pa: PhysicalAddress) -> Granularity {
        if pa.as_u64() >= self.boundary.as_u64() {
            Granularity::Superpage
        } else {
            Granularity::Standard
        }
    }

    /// Check that `pa` may be handed to the free operation.
    ///
    /// # Errors
    /// The first violated invariant, in this order: standard alignment, lower
    /// bound, upper bound, superpage alignment, frame fits below top of RAM.
    pub const fn validate_free(&self, pa: PhysicalAddress) -> Result<Granularity, FreeError> {
        let addr = pa.as_u64();
        if !pa.is_aligned::<Size4K>() {
            return Err(FreeError::Misaligned(pa));
        }
        if addr < self.kernel_end.as_u64() {
            return Err(FreeError::BelowKernelEnd {
                addr: pa,
                kernel_end: self.kernel_end,
            });
        }
        if addr >= self.phys_top.as_u64() {
            return Err(FreeError::BeyondPhysTop {
                addr: pa,
                phys_top: self.phys_top,
            });
        }

        let granularity = self.granularity_of(pa);
        if matches!(granularity, Granularity::Superpage) && !pa.is_aligned::<Size2M>() {
            return Err(FreeError::SuperpageMisaligned(pa));
        }

        match addr.checked_add(granularity.size()) {
            Some(end) if end <= self.phys_top.as_u64() => Ok(granularity),
            _ => Err(FreeError::BeyondPhysTop {
                addr: pa,
                phys_top: self.phys_top,
            }),
        }
    }
}

impl fmt::Display for PhysLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kernel end {}, boundary {}, top {}",
            self.kernel_end, self.boundary, self.phys_top
        )
    }
}
