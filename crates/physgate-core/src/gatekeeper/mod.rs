//! # Gatekeeper
//!
//! The validation choke point in front of every raw memory access.
//!
//! A [`Gatekeeper`] is constructed once from a pair of platform providers:
//! the range source is folded into an immutable upper bound on physical
//! address space, and the I/O space provider is kept for the lifetime of the
//! instance. After construction the gatekeeper holds no mutable state, so
//! independent requests can execute concurrently, each owning its own
//! mapping window for its duration.
//!
//! ## Request path
//!
//! Every request — whether it arrives through the typed methods
//! ([`Gatekeeper::read_physical`], [`Gatekeeper::write_mmio`]) or through
//! the wire dispatcher ([`Gatekeeper::handle`]) — passes the same rules, in
//! order, each a hard rejection:
//!
//! 1. execution context must permit blocking (`InvalidContext`)
//! 2. caller buffers must be large enough (`BufferTooSmall`)
//! 3. read length within `[1, MAX_READ_SIZE]` (`InvalidParameter`) and,
//!    when the bound is known, `address + length` within it
//!    (`AccessViolation`)
//! 4. MMIO width exactly 1, 2, or 4 (`InvalidParameter`)
//! 5. the implied page-aligned window within `MAX_MAP_SIZE`
//!    (`InvalidParameter`)
//!
//! Only a request that passes all of them reaches the mapping primitive.

mod dispatch;
mod window;

use tracing::{debug, warn};

use crate::error::{GateError, Result};
use crate::platform::{IoSpace, RangeSource};
use crate::types::{MmioWidth, PhysAddr, MAX_MAP_SIZE, MAX_READ_SIZE};

/// The privileged core: validates and executes physical-memory/MMIO requests
///
/// ## Lifecycle
///
/// 1. Create: [`Gatekeeper::new`] — computes the physical bound once
/// 2. Serve: [`Gatekeeper::read_physical`] / [`Gatekeeper::write_mmio`] /
///    [`Gatekeeper::handle`], any number of times, from any thread
/// 3. Drop — nothing to release; windows never outlive their request
pub struct Gatekeeper
{
    /// Mapping provider; the only path to raw memory
    io: Box<dyn IoSpace>,

    /// Highest known physical address (`base + length` of the highest
    /// platform-reported range), or 0 when the platform reported nothing.
    ///
    /// Computed once at construction, immutable afterwards. Zero means
    /// "unknown" and disables the range check — not "a valid range of size
    /// zero".
    max_phys: u64,

    /// Mapping granularity, cached from the provider
    page_size: usize,
}

impl std::fmt::Debug for Gatekeeper
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Gatekeeper")
            .field("max_phys", &self.max_phys)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Gatekeeper
{
    /// Create a gatekeeper over the given providers
    ///
    /// The range source is consumed here, once: the highest `base + length`
    /// over all non-empty ranges becomes the upper bound for every
    /// subsequent read. Construction never fails — if the source reports no
    /// ranges the bound is left unknown, the range check is skipped for
    /// this instance's lifetime, and a warning is logged. That fallback is
    /// deliberately loud: it means out-of-range reads are only caught by
    /// the transfer fault path.
    pub fn new(ranges: &dyn RangeSource, io: Box<dyn IoSpace>) -> Self
    {
        let max_phys = highest_range_end(ranges);
        let page_size = io.page_size();
        if max_phys == 0 {
            warn!("platform reported no physical memory ranges; address range checking is disabled");
        } else {
            debug!(max_phys = format_args!("0x{max_phys:x}"), page_size, "gatekeeper initialized");
        }
        Gatekeeper { io, max_phys, page_size }
    }

    /// The cached upper bound on physical address space, if known
    pub fn max_physical(&self) -> Option<PhysAddr>
    {
        (self.max_phys != 0).then(|| PhysAddr::new(self.max_phys))
    }

    /// The mapping granularity this instance validates against
    pub fn page_size(&self) -> usize
    {
        self.page_size
    }

    /// Read `length` bytes of physical memory starting at `addr` into `out`
    ///
    /// On success exactly `length` bytes have been written to the front of
    /// `out` and `length` is returned.
    ///
    /// ## Errors
    ///
    /// - `InvalidContext`: the execution context forbids blocking
    /// - `BufferTooSmall`: `out` is shorter than `length`
    /// - `InvalidParameter`: `length` outside `[1, MAX_READ_SIZE]`, or the
    ///   implied mapping window exceeds `MAX_MAP_SIZE`
    /// - `AccessViolation`: `addr + length` exceeds the known bound, or the
    ///   transfer faulted
    /// - `InsufficientResources`: the mapping window could not be established
    pub fn read_physical(&self, addr: PhysAddr, length: u32, out: &mut [u8]) -> Result<usize>
    {
        self.ensure_blocking_context()?;

        let length = length as usize;
        if out.len() < length {
            return Err(GateError::BufferTooSmall {
                needed: length,
                got: out.len(),
            });
        }
        if length == 0 || length > MAX_READ_SIZE {
            return Err(GateError::InvalidParameter(format!(
                "read length must be in 1..={MAX_READ_SIZE}, got {length}"
            )));
        }
        self.ensure_within_bound(addr, length as u64)?;
        let (aligned, offset, map_size) = self.window_extent(addr, length)?;

        window::copy_from_window(self.io.as_ref(), aligned, map_size, offset, addr, &mut out[..length])?;
        Ok(length)
    }

    /// Write a `width`-sized `value` to the MMIO register at `addr`
    ///
    /// The store is a single volatile write of exactly `width` bytes.
    ///
    /// Note the range bound is not consulted here: device registers
    /// routinely live above the highest RAM range, so an MMIO write is
    /// bounded only by the window cap and the transfer fault path.
    ///
    /// ## Errors
    ///
    /// - `InvalidContext`: the execution context forbids blocking
    /// - `InvalidParameter`: the implied mapping window exceeds `MAX_MAP_SIZE`
    /// - `AccessViolation`: the store faulted
    /// - `InsufficientResources`: the mapping window could not be established
    pub fn write_mmio(&self, addr: PhysAddr, value: u32, width: MmioWidth) -> Result<()>
    {
        self.ensure_blocking_context()?;
        let (aligned, offset, map_size) = self.window_extent(addr, width.bytes())?;
        window::write_to_window(self.io.as_ref(), aligned, map_size, offset, addr, value, width)
    }

    fn ensure_blocking_context(&self) -> Result<()>
    {
        if self.io.may_block() {
            Ok(())
        } else {
            Err(GateError::InvalidContext)
        }
    }

    fn ensure_within_bound(&self, addr: PhysAddr, bytes: u64) -> Result<()>
    {
        if self.max_phys == 0 {
            // Bound unknown: check skipped (see `new`)
            return Ok(());
        }
        let end = addr
            .value()
            .checked_add(bytes)
            .ok_or(GateError::AccessViolation(addr))?;
        if end > self.max_phys {
            return Err(GateError::AccessViolation(addr));
        }
        Ok(())
    }

    /// Compute the page-aligned window a transfer at `addr` implies
    ///
    /// Returns `(aligned_base, in_page_offset, map_size)` where
    /// `map_size = offset + transfer`, rejecting windows above the cap.
    fn window_extent(&self, addr: PhysAddr, transfer: usize) -> Result<(PhysAddr, usize, usize)>
    {
        let aligned = addr.align_down(self.page_size);
        let offset = addr.page_offset(self.page_size);
        let map_size = offset + transfer;
        if map_size > MAX_MAP_SIZE {
            return Err(GateError::InvalidParameter(format!(
                "mapping window of {map_size} bytes exceeds the {MAX_MAP_SIZE}-byte cap"
            )));
        }
        Ok((aligned, offset, map_size))
    }
}

fn highest_range_end(source: &dyn RangeSource) -> u64
{
    source
        .ranges()
        .iter()
        .filter(|range| range.bytes != 0)
        .map(|range| range.end().value())
        .max()
        .unwrap_or(0)
}
