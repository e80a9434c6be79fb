//! # Physical Memory Manager
//!
//! This crate owns every byte of physical RAM between the end of the kernel
//! image and the top of installed memory and hands it out one frame at a time
//! to page-table code, kernel stacks, process memory and buffer pools.
//!
//! ## Architecture Overview
//!
//! Two structurally identical pools split physical memory at a fixed boundary:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  FrameAllocator                     │
//! │    • allocate_standard / allocate_superpage         │
//! │    • unified free with validation                   │
//! │    • one-shot range initialization                  │
//! └──────────────┬───────────────────────┬──────────────┘
//!                │                       │
//! ┌──────────────▼─────────┐  ┌──────────▼──────────────┐
//! │ FramePool<Size4K>      │  │ FramePool<Size2M>       │
//! │  below PAGE_BOUNDARY   │  │  at/above PAGE_BOUNDARY │
//! │  Mutex<FreeList>       │  │  Mutex<FreeList>        │
//! └──────────────┬─────────┘  └──────────┬──────────────┘
//!                │                       │
//! ┌──────────────▼───────────────────────▼──────────────┐
//! │                    PhysMapper                       │
//! │    • identity map or higher-half direct map         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Layout ([`layout`])
//! The physical partition: first usable address past the kernel image, the
//! standard/superpage boundary and the top of RAM. Validated once.
//!
//! ### Free list ([`free_list`])
//! An intrusive LIFO stack. The first word of every free frame holds the
//! physical address of the next free frame, so the list needs no storage of
//! its own.
//!
//! ### Pools ([`pool`])
//! A free list behind a [`kernel_sync::Mutex`]. The critical section is one
//! push or one pop; sentinel fills happen outside of it.
//!
//! ### Allocator ([`allocator`])
//! The two pools, the unified free with its invariant checks, and the range
//! initializer that seeds the pools at boot.
//!
//! ### Global instance ([`global`])
//! A process-wide allocator for direct-mapped kernels, installed exactly once.
//!
//! ## Error Model
//!
//! * **Exhaustion** is expected: allocation returns `None` and the caller
//!   decides what to do.
//! * **Invariant violations** on free are not recoverable. [`FrameAllocator::try_free`]
//!   reports them as [`FreeError`]; [`FrameAllocator::free`] logs the
//!   diagnostic and halts via `panic!`.
//!
//! ## Sentinel Fills
//!
//! Every frame handed out is filled with [`ALLOC_JUNK`]; every frame taken
//! back is filled with [`FREE_JUNK`] (apart from the link word). Reads of
//! uninitialized or freed memory show up as recognizable garbage.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kernel_memory_addresses::PhysicalAddress;
//! use kernel_pmm::{FrameAllocator, IdentityMapper, PhysLayout};
//!
//! # fn kernel_end() -> PhysicalAddress { PhysicalAddress::new(0x8002_1000) }
//! let layout = PhysLayout::with_defaults(kernel_end()).expect("valid layout");
//! let pmm = FrameAllocator::new(layout, IdentityMapper);
//! let report = unsafe { pmm.initialize_from_layout() };
//! log::info!("{report}");
//!
//! if let Some(frame) = pmm.allocate_standard() {
//!     // ... use the frame ...
//!     unsafe { pmm.free(frame.base()) };
//! }
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod allocator;
mod error;
pub mod free_list;
pub mod global;
pub mod layout;
pub mod mapper;
pub mod pool;

pub use allocator::{FrameAllocator, InitReport, PoolStats};
pub use error::FreeError;
pub use layout::{Granularity, LayoutError, PhysLayout};
pub use mapper::{IdentityMapper, OffsetMapper, PhysMapper};
pub use pool::FramePool;

/// Byte written over every frame returned by an allocation.
pub const ALLOC_JUNK: u8 = 0x05;

/// Byte written over every frame accepted by a free.
pub const FREE_JUNK: u8 = 0x01;

const _: () = assert!(ALLOC_JUNK != FREE_JUNK);
