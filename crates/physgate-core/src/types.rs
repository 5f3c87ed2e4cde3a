//! # Core Types
//!
//! Platform-agnostic value types shared by the gatekeeper, the wire protocol,
//! and the client facade.

use std::fmt;
use std::ops::{Add, Sub};

/// Maximum number of bytes a single read request may ask for (64 KiB).
///
/// Oversized reads are rejected with `InvalidParameter` before any mapping
/// happens; a caller who needs more issues multiple requests.
pub const MAX_READ_SIZE: usize = 64 * 1024;

/// Safety cap for a single mapping window (128 KiB).
///
/// The window covers `(address % page_size) + length` bytes, so a request
/// near the end of a large page can imply a window bigger than the read
/// itself. Windows above this cap are rejected with `InvalidParameter` so a
/// single request can never pin an unbounded virtual range.
pub const MAX_MAP_SIZE: usize = 128 * 1024;

/// Strongly typed physical address
///
/// This wrapper around `u64` provides type safety when working with physical
/// addresses. It prevents accidentally mixing addresses with other `u64`
/// values (like lengths, register values, or page sizes).
///
/// ## Physical vs virtual
///
/// A `PhysAddr` names a byte offset in the machine's physical address space —
/// RAM, MMIO registers, firmware tables — not a location in any process's
/// virtual address space. It only becomes dereferenceable through a mapping
/// window established by an [`crate::platform::IoSpace`] provider.
///
/// ## Example
///
/// ```rust
/// use physgate_core::types::PhysAddr;
///
/// let addr = PhysAddr::new(0x1000);
/// let next = addr + 0x100;
/// assert_eq!(next.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(u64);

impl PhysAddr
{
    /// The null address (0x0)
    pub const ZERO: Self = PhysAddr(0);

    /// Create a new physical address from a `u64` value
    ///
    /// Usable in const contexts:
    ///
    /// ```rust
    /// use physgate_core::types::PhysAddr;
    ///
    /// const BIOS_AREA: PhysAddr = PhysAddr::new(0xF0000);
    /// ```
    pub const fn new(value: u64) -> Self
    {
        PhysAddr(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// Returns `Some(new_address)` if the addition doesn't overflow, or `None` if it does.
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(PhysAddr)
    }

    /// Add an offset to this address, saturating at the maximum value
    pub fn saturating_add(self, offset: u64) -> Self
    {
        PhysAddr(self.0.saturating_add(offset))
    }

    /// Align this address down to the nearest `page_size` boundary
    ///
    /// `page_size` must be a power of two.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use physgate_core::types::PhysAddr;
    ///
    /// let addr = PhysAddr::new(0x1234);
    /// assert_eq!(addr.align_down(4096), PhysAddr::new(0x1000));
    /// ```
    pub fn align_down(self, page_size: usize) -> Self
    {
        let mask = !(page_size as u64 - 1);
        PhysAddr(self.0 & mask)
    }

    /// Byte offset of this address into its `page_size`-aligned page
    ///
    /// ```rust
    /// use physgate_core::types::PhysAddr;
    ///
    /// assert_eq!(PhysAddr::new(0x1234).page_offset(4096), 0x234);
    /// ```
    pub fn page_offset(self, page_size: usize) -> usize
    {
        (self.0 - self.align_down(page_size).0) as usize
    }
}

impl From<u64> for PhysAddr
{
    fn from(value: u64) -> Self
    {
        PhysAddr(value)
    }
}

impl From<PhysAddr> for u64
{
    fn from(addr: PhysAddr) -> Self
    {
        addr.0
    }
}

impl fmt::Display for PhysAddr
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for PhysAddr
{
    type Output = PhysAddr;

    fn add(self, rhs: u64) -> Self::Output
    {
        PhysAddr(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for PhysAddr
{
    type Output = PhysAddr;

    fn sub(self, rhs: u64) -> Self::Output
    {
        PhysAddr(self.0.wrapping_sub(rhs))
    }
}

/// A contiguous range of physical memory reported by the platform
///
/// The gatekeeper folds the platform's range list into a single upper bound
/// at startup; it never stores the list itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysRange
{
    /// First byte of the range
    pub base: PhysAddr,
    /// Number of bytes in the range (ranges with zero bytes are ignored)
    pub bytes: u64,
}

impl PhysRange
{
    /// Create a new range
    pub const fn new(base: PhysAddr, bytes: u64) -> Self
    {
        PhysRange { base, bytes }
    }

    /// One past the last byte of the range, saturating on overflow
    pub fn end(self) -> PhysAddr
    {
        self.base.saturating_add(self.bytes)
    }
}

/// Width of a single MMIO register write
///
/// Only 1-, 2-, and 4-byte writes are supported; each is performed as one
/// volatile store of exactly that width, never emulated by a wider store
/// that could touch adjacent registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MmioWidth
{
    /// 8-bit register write
    Byte = 1,
    /// 16-bit register write
    Word = 2,
    /// 32-bit register write
    Dword = 4,
}

impl MmioWidth
{
    /// Convert a raw wire value into a width
    ///
    /// Returns `None` for anything other than 1, 2, or 4; the caller turns
    /// that into an `InvalidParameter` rejection.
    pub fn from_raw(raw: u32) -> Option<Self>
    {
        match raw {
            1 => Some(MmioWidth::Byte),
            2 => Some(MmioWidth::Word),
            4 => Some(MmioWidth::Dword),
            _ => None,
        }
    }

    /// The raw wire value of this width
    pub const fn raw(self) -> u32
    {
        self as u32
    }

    /// The number of bytes a write of this width touches
    pub const fn bytes(self) -> usize
    {
        self as u32 as usize
    }
}

impl fmt::Display for MmioWidth
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.raw())
    }
}
