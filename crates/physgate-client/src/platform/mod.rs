//! # Platform Adapters
//!
//! Client-side platform wiring: the device channel and the service control
//! manager. Each platform gets its own module, compiled only on that
//! platform; everything above this seam ([`crate::Channel`],
//! [`crate::ServiceManager`]) is platform-agnostic.

#[cfg(windows)]
pub mod windows;
