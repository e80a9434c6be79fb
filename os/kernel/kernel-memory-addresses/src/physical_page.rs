use crate::{PageSize, PhysicalAddress};
use core::fmt;
use core::marker::PhantomData;

/// Physical frame base for size `S`.
///
/// A `PhysicalPage<S>` represents the **aligned base** of a physical frame of
/// size `S` (`S::SIZE` bytes).
///
/// ### Invariants
/// - The low `S::SHIFT` bits of the base are always zero.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(0x0000_0008_1234_5678);
/// let pp = pa.page::<Size2M>();
/// assert_eq!(pp.base().as_u64() & (Size2M::SIZE - 1), 0);
/// assert_eq!(pp.end().as_u64() - pp.base().as_u64(), Size2M::SIZE);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage<S: PageSize> {
    base: u64,
    _phantom: PhantomData<S>,
}

impl<S: PageSize> PhysicalPage<S> {
    /// The frame containing `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn containing(addr: PhysicalAddress) -> Self {
        Self {
            base: addr.as_u64() & !(S::SIZE - 1),
            _phantom: PhantomData,
        }
    }

    /// Create from an address that must already be aligned.
    /// Panics in debug if unaligned (no runtime cost in release).
    #[inline]
    #[must_use]
    pub fn new_aligned(addr: PhysicalAddress) -> Self {
        debug_assert!(addr.is_aligned::<S>(), "unaligned frame address");
        Self {
            base: addr.as_u64(),
            _phantom: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        PhysicalAddress::new(self.base)
    }

    /// First address past the frame.
    ///
    /// # Panics
    /// If the frame is the last one below `u64::MAX` and its end is not
    /// representable; use [`next`](Self::next) to handle that case.
    #[inline]
    #[must_use]
    pub const fn end(self) -> PhysicalAddress {
        match self.base.checked_add(S::SIZE) {
            Some(end) => PhysicalAddress::new(end),
            None => panic!("physical frame end overflows"),
        }
    }

    /// The frame directly following this one, `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.base.checked_add(S::SIZE) {
            Some(base) => Some(Self {
                base,
                _phantom: PhantomData,
            }),
            None => None,
        }
    }

    /// Frame size in bytes.
    #[inline(always)]
    #[must_use]
    pub const fn size(self) -> u64 {
        S::SIZE
    }
}

/// Returned when converting an address that is not aligned to the frame size.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UnalignedFrame {
    pub addr: PhysicalAddress,
    pub align: u64,
}

impl fmt::Display for UnalignedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not aligned to {:#x}", self.addr, self.align)
    }
}

impl<S: PageSize> TryFrom<PhysicalAddress> for PhysicalPage<S> {
    type Error = UnalignedFrame;

    #[inline]
    fn try_from(pa: PhysicalAddress) -> Result<Self, UnalignedFrame> {
        if pa.is_aligned::<S>() {
            Ok(pa.page())
        } else {
            Err(UnalignedFrame {
                addr: pa,
                align: S::SIZE,
            })
        }
    }
}

impl<S> fmt::Display for PhysicalPage<S>
where
    S: PageSize,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/{}", self.base, S::as_str())
    }
}

impl<S: PageSize> fmt::Debug for PhysicalPage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage<{}>({:#018X})", S::as_str(), self.base)
    }
}
