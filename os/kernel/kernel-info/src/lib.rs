//! # Kernel Physical Memory Configuration
//!
//! This crate is the single source of truth for the physical memory layout the
//! frame allocator manages. Every value here is a compile-time constant; the
//! allocator reads them once when it builds its layout and never renegotiates
//! them at runtime.
//!
//! ## Physical Memory Layout
//!
//! ```text
//! KERNBASE        ┌─────────────────────────────────┐ 0x8000_0000
//!                 │       Kernel Image              │
//!                 │   (Text, Data, BSS)             │
//! kernel end      ├─────────────────────────────────┤ (from the linker)
//!                 │   Standard 4 KiB frames         │
//!                 │                                 │
//! PAGE_BOUNDARY   ├─────────────────────────────────┤ 0x8400_0000
//!                 │   2 MiB superpages              │
//!                 │                                 │
//! PHYSTOP         └─────────────────────────────────┘ 0x8800_0000
//! ```
//!
//! The first usable address past the kernel image is not known here; the
//! linker provides it to the kernel, which passes it to the allocator.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_info::memory::{KERNBASE, PAGE_BOUNDARY, PHYSTOP};
//!
//! assert!(KERNBASE < PAGE_BOUNDARY && PAGE_BOUNDARY < PHYSTOP);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
