//! # physgate
//!
//! Validated physical-memory reads and MMIO register writes over a
//! privileged channel.
//!
//! This facade crate stitches the workspace together:
//!
//! - [`physgate_core`] — the gatekeeper: request validation, the
//!   map–copy/write–unmap primitive, the wire protocol, and the platform
//!   provider seams
//! - [`physgate_client`] — the unprivileged side: channel handles, typed
//!   reads and MMIO writes, component lifecycle, hex dumps
//! - [`physgate_utils`] — logging bootstrap
//!
//! ## Quick start
//!
//! ```rust
//! use physgate::client::{LoopbackChannel, PhysMem};
//! use physgate::core::platform::sim::{SimIoSpace, SimRanges};
//! use physgate::core::types::{PhysAddr, PhysRange};
//! use physgate::core::Gatekeeper;
//!
//! // A simulated platform stands in for the real providers here; on a
//! // live system the gatekeeper is constructed over platform adapters
//! // and reached through a device channel instead.
//! let io = SimIoSpace::new(0x10000);
//! let ranges = SimRanges::new(vec![PhysRange::new(PhysAddr::ZERO, 0x10000)]);
//! let gatekeeper = Gatekeeper::new(&ranges, Box::new(io));
//!
//! let mut mem = PhysMem::new(LoopbackChannel::new(gatekeeper));
//! mem.write_mmio32(PhysAddr::new(0x1000), 0xDEAD_BEEF)?;
//! assert_eq!(mem.read::<u32>(PhysAddr::new(0x1000))?, 0xDEAD_BEEF);
//! # Ok::<(), physgate::core::GateError>(())
//! ```

pub use physgate_client as client;
pub use physgate_core as core;
pub use physgate_utils as utils;

// The everyday surface, re-exported flat
pub use physgate_client::{Channel, LoopbackChannel, Msr, PhysMem};
pub use physgate_core::{GateError, Gatekeeper, MmioWidth, PhysAddr, PhysRange, Result};
