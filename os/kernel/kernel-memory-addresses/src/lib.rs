//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for physical addresses and frame bases used by the
//! physical memory manager.
//!
//! ## Overview
//!
//! | Type | Generic | Description |
//! |----------|----------|-------------|
//! | [`PhysicalAddress`] | – | A raw 64-bit physical address. |
//! | [`PhysicalPage<S>`] | [`S: PageSize`](PageSize) | The aligned base of a physical frame of size `S`. |
//!
//! ## Frame Sizes
//!
//! Two granularities are supported via marker types that implement
//! [`PageSize`]:
//!
//! - [`Size4K`]: 4 KiB standard frames
//! - [`Size2M`]: 2 MiB superpages
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x8020_1234);
//! assert_eq!(pa.align_up::<Size4K>().as_u64(), 0x8020_2000);
//! assert_eq!(pa.align_up::<Size2M>().as_u64(), 0x8040_0000);
//! assert!(!pa.is_aligned::<Size4K>());
//!
//! let frame = PhysicalPage::<Size4K>::try_from(PhysicalAddress::new(0x8020_2000)).unwrap();
//! assert_eq!(frame.base().as_u64(), 0x8020_2000);
//! ```
//!
//! ## Design Notes
//!
//! - The types are `#[repr(transparent)]` and `Copy`, so they are free to pass
//!   by value.
//! - Alignment arithmetic is `const fn`; sizes are powers of two, so masking
//!   replaces division.
//! - The phantom marker `S` carries the frame size at the type level, which
//!   keeps a standard frame from being handed to code expecting a superpage.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod page_size;
mod physical_address;
mod physical_page;

pub use page_size::{PageSize, Size2M, Size4K};
pub use physical_address::PhysicalAddress;
pub use physical_page::{PhysicalPage, UnalignedFrame};

/// Align `x` up to the next multiple of `a` (a power of two).
///
/// Saturates at the highest aligned value instead of wrapping.
#[inline]
#[must_use]
pub const fn align_up(x: u64, a: u64) -> u64 {
    debug_assert!(a.is_power_of_two());
    match x.checked_add(a - 1) {
        Some(v) => v & !(a - 1),
        None => !(a - 1),
    }
}

/// Align `x` down to the previous multiple of `a` (a power of two).
#[inline]
#[must_use]
pub const fn align_down(x: u64, a: u64) -> u64 {
    debug_assert!(a.is_power_of_two());
    x & !(a - 1)
}
