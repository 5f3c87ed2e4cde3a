//! # physgate-core
//!
//! The privileged gatekeeper for physical-memory reads and MMIO register writes.
//!
//! This crate is the core of physgate: it validates every inbound request
//! against address-range, size, and mapping-window invariants before any raw
//! memory is touched, then performs the access through a short-lived,
//! page-aligned mapping window that is released on every exit path.
//!
//! ## Architecture
//!
//! - [`Gatekeeper`] — validation choke point plus the map–copy/write–unmap
//!   primitive and the request dispatcher
//! - [`protocol`] — the fixed-layout wire protocol (request codes, packed
//!   request structs, status codes)
//! - [`platform`] — capability-injection traits ([`platform::RangeSource`],
//!   [`platform::IoSpace`]) with a simulated provider for testing and a
//!   `/dev/mem` adapter on Linux
//! - [`msr`] — the model-specific-register variant of the protocol
//!
//! ## Why unsafe code is needed
//!
//! The `/dev/mem` mapping adapter calls `mmap`/`munmap` and performs volatile
//! register stores through raw pointers. Those operations are inherently
//! unsafe; everything above the [`platform::IoSpace`] seam is safe code, and
//! the simulated provider used by the test suite contains no unsafe at all.

#![allow(unsafe_code)] // Required for the /dev/mem mapping adapter

pub mod error;
pub mod gatekeeper;
pub mod msr;
pub mod platform;
pub mod protocol;
pub mod types;

pub use error::{GateError, Result};
pub use gatekeeper::Gatekeeper;
// Re-export commonly used types
pub use types::{MmioWidth, PhysAddr, PhysRange, MAX_MAP_SIZE, MAX_READ_SIZE};
