//! # Typed Read/Write Facade
//!
//! Turns the raw byte-oriented channel into typed operations: read a
//! fixed-size value at a physical address, write an 8/16/32-bit MMIO
//! register with the width chosen from the value's type.
//!
//! The width selection is a compile-time affair: [`MmioValue`] is
//! implemented for `u8`, `u16`, and `u32` only, so a 64-bit MMIO write is
//! not just rejected — it does not type-check.

use tracing::debug;

use physgate_core::error::{GateError, Result};
use physgate_core::msr::{MsrReadRequest, MsrWriteRequest, REQ_MSR_READ, REQ_MSR_WRITE};
use physgate_core::protocol::{MmioWriteRequest, ReadRequest, REQ_READ_PHYS, REQ_WRITE_MMIO};
use physgate_core::types::{MmioWidth, PhysAddr, MAX_READ_SIZE};

use crate::channel::Channel;
use crate::hexdump;

/// A fixed-size, trivially copyable value readable from physical memory
///
/// Implemented for the unsigned integer types up to 64 bits; values are
/// decoded little-endian from the raw bytes the gatekeeper returns.
pub trait PhysRead: Sized + Copy
{
    /// Size of the value's physical representation, in bytes
    const SIZE: usize;

    /// Decode the value from exactly [`Self::SIZE`] little-endian bytes
    fn from_phys_bytes(bytes: &[u8]) -> Self;
}

impl PhysRead for u8
{
    const SIZE: usize = 1;

    fn from_phys_bytes(bytes: &[u8]) -> Self
    {
        bytes[0]
    }
}

impl PhysRead for u16
{
    const SIZE: usize = 2;

    fn from_phys_bytes(bytes: &[u8]) -> Self
    {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl PhysRead for u32
{
    const SIZE: usize = 4;

    fn from_phys_bytes(bytes: &[u8]) -> Self
    {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl PhysRead for u64
{
    const SIZE: usize = 8;

    fn from_phys_bytes(bytes: &[u8]) -> Self
    {
        u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ])
    }
}

/// A value writable to an MMIO register
///
/// The register width is the type's width; there is deliberately no
/// implementation for anything above 32 bits.
pub trait MmioValue: Copy
{
    /// The register store width for this type
    const WIDTH: MmioWidth;

    /// Widen the value into the 32-bit wire field
    fn widen(self) -> u32;
}

impl MmioValue for u8
{
    const WIDTH: MmioWidth = MmioWidth::Byte;

    fn widen(self) -> u32
    {
        u32::from(self)
    }
}

impl MmioValue for u16
{
    const WIDTH: MmioWidth = MmioWidth::Word;

    fn widen(self) -> u32
    {
        u32::from(self)
    }
}

impl MmioValue for u32
{
    const WIDTH: MmioWidth = MmioWidth::Dword;

    fn widen(self) -> u32
    {
        self
    }
}

/// Typed physical-memory client over any [`Channel`]
///
/// Owns its channel exclusively; dropping the client drops the channel and
/// releases the underlying handle exactly once.
pub struct PhysMem<C: Channel>
{
    channel: C,
}

impl<C: Channel> PhysMem<C>
{
    /// Take ownership of a channel
    pub fn new(channel: C) -> Self
    {
        PhysMem { channel }
    }

    /// Give the channel back, consuming the client
    pub fn into_channel(self) -> C
    {
        self.channel
    }

    /// Read `length` bytes of physical memory starting at `addr`
    ///
    /// The length is validated client-side before anything crosses the
    /// channel, mirroring the gatekeeper's own rule.
    ///
    /// ## Errors
    ///
    /// - `InvalidParameter`: `length` outside `[1, MAX_READ_SIZE]`
    /// - `Protocol`: the channel returned a different number of bytes than
    ///   requested
    /// - Any rejection the gatekeeper reports for the request
    pub fn read_bytes(&mut self, addr: PhysAddr, length: usize) -> Result<Vec<u8>>
    {
        if length == 0 || length > MAX_READ_SIZE {
            return Err(GateError::InvalidParameter(format!(
                "read length must be in 1..={MAX_READ_SIZE}, got {length}"
            )));
        }

        let request = ReadRequest {
            addr,
            length: length as u32,
        };
        let mut buffer = vec![0u8; length];
        let returned = self.channel.transact(REQ_READ_PHYS, &request.encode(), &mut buffer)?;
        if returned != length {
            return Err(GateError::Protocol(format!(
                "expected {length} bytes, channel returned {returned}"
            )));
        }
        Ok(buffer)
    }

    /// Read physical memory into an existing buffer
    pub fn read_into(&mut self, addr: PhysAddr, out: &mut [u8]) -> Result<()>
    {
        let bytes = self.read_bytes(addr, out.len())?;
        out.copy_from_slice(&bytes);
        Ok(())
    }

    /// Read a typed value at `addr`
    ///
    /// ## Example
    ///
    /// ```rust,no_run
    /// # use physgate_client::{Channel, PhysMem};
    /// # use physgate_core::types::PhysAddr;
    /// # fn demo<C: Channel>(mem: &mut PhysMem<C>) -> physgate_core::Result<()> {
    /// let vendor_id: u16 = mem.read(PhysAddr::new(0xE000_0000))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn read<T: PhysRead>(&mut self, addr: PhysAddr) -> Result<T>
    {
        let bytes = self.read_bytes(addr, T::SIZE)?;
        Ok(T::from_phys_bytes(&bytes))
    }

    /// Write a byte to the MMIO register at `addr`
    pub fn write_mmio8(&mut self, addr: PhysAddr, value: u8) -> Result<()>
    {
        self.write_mmio_raw(addr, u32::from(value), MmioWidth::Byte)
    }

    /// Write a 16-bit value to the MMIO register at `addr`
    pub fn write_mmio16(&mut self, addr: PhysAddr, value: u16) -> Result<()>
    {
        self.write_mmio_raw(addr, u32::from(value), MmioWidth::Word)
    }

    /// Write a 32-bit value to the MMIO register at `addr`
    pub fn write_mmio32(&mut self, addr: PhysAddr, value: u32) -> Result<()>
    {
        self.write_mmio_raw(addr, value, MmioWidth::Dword)
    }

    /// Write a value to the MMIO register at `addr`, the width chosen from
    /// the value's type
    pub fn write_mmio<T: MmioValue>(&mut self, addr: PhysAddr, value: T) -> Result<()>
    {
        self.write_mmio_raw(addr, value.widen(), T::WIDTH)
    }

    fn write_mmio_raw(&mut self, addr: PhysAddr, value: u32, width: MmioWidth) -> Result<()>
    {
        debug!(%addr, value = format_args!("0x{value:08x}"), %width, "mmio write");
        let request = MmioWriteRequest { addr, value, width };
        self.channel.transact(REQ_WRITE_MMIO, &request.encode(), &mut [])?;
        Ok(())
    }

    /// Read a range and render it as an address-prefixed hex + ASCII dump
    ///
    /// Purely a diagnostic convenience over [`Self::read_bytes`] and
    /// [`hexdump::format_hexdump`].
    pub fn hexdump(&mut self, addr: PhysAddr, length: usize, width: usize) -> Result<String>
    {
        let bytes = self.read_bytes(addr, length)?;
        Ok(hexdump::format_hexdump(addr, &bytes, width))
    }
}

/// Typed model-specific-register client over any [`Channel`]
pub struct Msr<C: Channel>
{
    channel: C,
}

impl<C: Channel> Msr<C>
{
    /// Take ownership of a channel
    pub fn new(channel: C) -> Self
    {
        Msr { channel }
    }

    /// Read the 64-bit value of `register`
    pub fn read(&mut self, register: u32) -> Result<u64>
    {
        let request = MsrReadRequest { register };
        let mut out = [0u8; 8];
        let returned = self.channel.transact(REQ_MSR_READ, &request.encode(), &mut out)?;
        if returned != out.len() {
            return Err(GateError::Protocol(format!(
                "expected 8 bytes, channel returned {returned}"
            )));
        }
        Ok(u64::from_le_bytes(out))
    }

    /// Write a 64-bit value to `register`
    pub fn write(&mut self, register: u32, value: u64) -> Result<()>
    {
        let request = MsrWriteRequest { register, value };
        self.channel.transact(REQ_MSR_WRITE, &request.encode(), &mut [])?;
        Ok(())
    }
}
