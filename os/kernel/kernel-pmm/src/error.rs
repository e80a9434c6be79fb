use kernel_memory_addresses::PhysicalAddress;

/// An address that must never be freed.
///
/// Seeing one of these means bookkeeping elsewhere in the kernel is already
/// broken. [`FrameAllocator::free`](crate::FrameAllocator::free) halts on it;
/// only [`FrameAllocator::try_free`](crate::FrameAllocator::try_free) hands it
/// back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FreeError {
    #[error("{0} is not aligned to the standard frame size")]
    Misaligned(PhysicalAddress),
    #[error("{addr} lies below the end of the kernel image at {kernel_end}")]
    BelowKernelEnd {
        addr: PhysicalAddress,
        kernel_end: PhysicalAddress,
    },
    #[error("frame at {addr} reaches past the top of RAM at {phys_top}")]
    BeyondPhysTop {
        addr: PhysicalAddress,
        phys_top: PhysicalAddress,
    },
    #[error("{0} lies in superpage territory but is not superpage aligned")]
    SuperpageMisaligned(PhysicalAddress),
}

impl FreeError {
    /// The offending address.
    #[must_use]
    pub const fn addr(&self) -> PhysicalAddress {
        match *self {
            Self::Misaligned(addr)
            | Self::SuperpageMisaligned(addr)
            | Self::BelowKernelEnd { addr, .. }
            | Self::BeyondPhysTop { addr, .. } => addr,
        }
    }
}
