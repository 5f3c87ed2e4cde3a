//! # Wire Protocol
//!
//! The fixed-layout request/response protocol spoken over the privileged
//! channel.
//!
//! Requests are packed little-endian structures with no padding; responses
//! are a status code plus, for reads, the raw bytes. Request codes are
//! opaque 32-bit constants; the dispatcher rejects anything it does not
//! recognize.
//!
//! The code and status values are kept wire-compatible with the kernel
//! component this crate fronts, so an existing installation keeps working
//! regardless of which side is updated first.

use crate::error::{GateError, Result};
use crate::types::{MmioWidth, PhysAddr};

/// Request code for "read physical memory"
///
/// Derived from the component's buffered-IO control code (device type 0x22,
/// function 0x800, read/write access).
pub const REQ_READ_PHYS: u32 = 0x0022_E000;

/// Request code for "write MMIO register" (function 0x801)
pub const REQ_WRITE_MMIO: u32 = 0x0022_E004;

/// Status code returned for every request
///
/// The numeric values mirror the NT status values the kernel component
/// reports, so a client can interpret statuses from either the in-process
/// loopback or the real device channel identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status
{
    /// The request was executed; for reads, the payload is valid
    Success = 0,
    /// Address out of known physical range, or the transfer faulted
    AccessViolation = 0xC000_0005,
    /// Length, width, or implied mapping window out of bounds
    InvalidParameter = 0xC000_000D,
    /// Unknown request code
    UnsupportedRequest = 0xC000_0010,
    /// Request or response buffer smaller than the operation requires
    BufferTooSmall = 0xC000_0023,
    /// A model-specific-register access faulted
    MsrFault = 0xC000_0096,
    /// The mapping window could not be established
    InsufficientResources = 0xC000_009A,
    /// Wrong execution context for the operation
    InvalidContext = 0xC000_0184,
}

impl Status
{
    /// The raw 32-bit wire value of this status
    pub const fn raw(self) -> u32
    {
        self as u32
    }

    /// Convert a raw wire value back into a status
    ///
    /// Returns `None` for values this protocol never produces.
    pub fn from_raw(raw: u32) -> Option<Self>
    {
        match raw {
            0 => Some(Status::Success),
            0xC000_0005 => Some(Status::AccessViolation),
            0xC000_000D => Some(Status::InvalidParameter),
            0xC000_0010 => Some(Status::UnsupportedRequest),
            0xC000_0023 => Some(Status::BufferTooSmall),
            0xC000_0096 => Some(Status::MsrFault),
            0xC000_009A => Some(Status::InsufficientResources),
            0xC000_0184 => Some(Status::InvalidContext),
            _ => None,
        }
    }

    /// Whether this status reports success
    pub const fn is_success(self) -> bool
    {
        matches!(self, Status::Success)
    }
}

impl From<&GateError> for Status
{
    fn from(err: &GateError) -> Self
    {
        match err {
            GateError::InvalidContext => Status::InvalidContext,
            GateError::BufferTooSmall { .. } => Status::BufferTooSmall,
            GateError::InvalidParameter(_) => Status::InvalidParameter,
            GateError::AccessViolation(_) => Status::AccessViolation,
            GateError::InsufficientResources => Status::InsufficientResources,
            GateError::UnsupportedRequest(_) => Status::UnsupportedRequest,
            GateError::MsrFault(_) => Status::MsrFault,
            // Client-side failures never originate inside the gatekeeper;
            // if one is ever funneled through here, reject the request.
            GateError::ChannelUnavailable(_)
            | GateError::ServiceControlFailure { .. }
            | GateError::Protocol(_)
            | GateError::Io(_) => Status::InvalidParameter,
        }
    }
}

fn read_u32_le(buf: &[u8]) -> u32
{
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

fn read_u64_le(buf: &[u8]) -> u64
{
    u64::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
}

/// A "read physical memory" request
///
/// Wire layout (12 bytes, packed, little-endian):
///
/// | offset | size | field   |
/// |--------|------|---------|
/// | 0      | 8    | address |
/// | 8      | 4    | length  |
///
/// The response is exactly `length` raw bytes on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest
{
    /// Starting physical address
    pub addr: PhysAddr,
    /// Number of bytes to read
    pub length: u32,
}

impl ReadRequest
{
    /// Size of the packed wire representation
    pub const WIRE_SIZE: usize = 12;

    /// Encode this request into its packed wire form
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE]
    {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[..8].copy_from_slice(&self.addr.value().to_le_bytes());
        buf[8..12].copy_from_slice(&self.length.to_le_bytes());
        buf
    }

    /// Decode a request from its packed wire form
    ///
    /// ## Errors
    ///
    /// - `BufferTooSmall`: the buffer is shorter than [`Self::WIRE_SIZE`]
    pub fn decode(buf: &[u8]) -> Result<Self>
    {
        if buf.len() < Self::WIRE_SIZE {
            return Err(GateError::BufferTooSmall {
                needed: Self::WIRE_SIZE,
                got: buf.len(),
            });
        }
        Ok(ReadRequest {
            addr: PhysAddr::new(read_u64_le(buf)),
            length: read_u32_le(&buf[8..12]),
        })
    }
}

/// A "write MMIO register" request
///
/// Wire layout (16 bytes, packed, little-endian):
///
/// | offset | size | field   |
/// |--------|------|---------|
/// | 0      | 8    | address |
/// | 8      | 4    | value   |
/// | 12     | 4    | width   |
///
/// The response carries no payload, only a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioWriteRequest
{
    /// Physical address of the register
    pub addr: PhysAddr,
    /// Value to write (narrowed to `width` bytes)
    pub value: u32,
    /// Width of the register store
    pub width: MmioWidth,
}

impl MmioWriteRequest
{
    /// Size of the packed wire representation
    pub const WIRE_SIZE: usize = 16;

    /// Encode this request into its packed wire form
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE]
    {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[..8].copy_from_slice(&self.addr.value().to_le_bytes());
        buf[8..12].copy_from_slice(&self.value.to_le_bytes());
        buf[12..16].copy_from_slice(&self.width.raw().to_le_bytes());
        buf
    }

    /// Decode a request from its packed wire form
    ///
    /// ## Errors
    ///
    /// - `BufferTooSmall`: the buffer is shorter than [`Self::WIRE_SIZE`]
    /// - `InvalidParameter`: the width field is not 1, 2, or 4
    pub fn decode(buf: &[u8]) -> Result<Self>
    {
        if buf.len() < Self::WIRE_SIZE {
            return Err(GateError::BufferTooSmall {
                needed: Self::WIRE_SIZE,
                got: buf.len(),
            });
        }
        let raw_width = read_u32_le(&buf[12..16]);
        let width = MmioWidth::from_raw(raw_width)
            .ok_or_else(|| GateError::InvalidParameter(format!("MMIO width must be 1, 2, or 4 bytes, got {raw_width}")))?;
        Ok(MmioWriteRequest {
            addr: PhysAddr::new(read_u64_le(buf)),
            value: read_u32_le(&buf[8..12]),
            width,
        })
    }
}
