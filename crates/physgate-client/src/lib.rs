//! # physgate-client
//!
//! The unprivileged half of physgate: everything a caller needs to manage
//! the gatekeeper component and talk to it.
//!
//! - [`channel`] — the transport seam ([`Channel`]) plus the in-process
//!   loopback transports; handles are move-only and released exactly once
//! - [`client`] — typed reads and MMIO writes over any channel
//! - [`lifecycle`] — install/start/stop/remove verbs for the gatekeeper
//!   component, idempotent with respect to already-installed state
//! - [`hexdump`] — the diagnostic hex + ASCII formatter
//! - [`platform`] — the Windows device channel and service control
//!   adapters (compiled on Windows only)
//!
//! Failures are always typed ([`physgate_core::GateError`]): a caller can
//! tell "component not present" from "component present but request
//! rejected" from "platform error with a numeric code" and decide whether
//! to install, retry, or abort.

#![allow(unsafe_code)] // Required for the Windows device-channel adapter

pub mod channel;
pub mod client;
pub mod hexdump;
pub mod lifecycle;
pub mod platform;

pub use channel::{Channel, LoopbackChannel, MsrLoopbackChannel};
pub use client::{MmioValue, Msr, PhysMem, PhysRead};
pub use hexdump::format_hexdump;
pub use lifecycle::{install, remove, ServiceConfig, ServiceManager, SimServiceManager};
