//! # Simulated Platform
//!
//! In-memory [`RangeSource`] and [`IoSpace`] providers with a controllable
//! backing store.
//!
//! The simulated providers exist so the whole request path — validation,
//! mapping, transfer, unmapping, status conversion — can be exercised
//! without privileges and without real hardware. They can be steered into
//! every failure mode the gatekeeper has to handle:
//!
//! - fault windows that make a transfer fail partway ([`SimIoSpace::add_fault_range`])
//! - mapping denial to simulate resource exhaustion ([`SimIoSpace::deny_mappings`])
//! - a non-blocking execution context ([`SimIoSpace::set_may_block`])
//!
//! `SimIoSpace` is a cheap handle over shared state: clone it before handing
//! it to a gatekeeper and the clone still observes writes and the live
//! window count afterwards.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{GateError, Result};
use crate::platform::{IoSpace, IoWindow, RangeSource};
use crate::types::{MmioWidth, PhysAddr, PhysRange};

const DEFAULT_PAGE_SIZE: usize = 4096;

/// A fixed list of physical memory ranges
pub struct SimRanges
{
    ranges: Vec<PhysRange>,
}

impl SimRanges
{
    /// A source reporting exactly the given ranges
    pub fn new(ranges: Vec<PhysRange>) -> Self
    {
        SimRanges { ranges }
    }

    /// A source reporting no ranges at all
    ///
    /// Constructing a gatekeeper over this leaves the physical bound unknown
    /// and disables the range check — the documented fallback behavior.
    pub fn empty() -> Self
    {
        SimRanges { ranges: Vec::new() }
    }
}

impl RangeSource for SimRanges
{
    fn ranges(&self) -> Vec<PhysRange>
    {
        self.ranges.clone()
    }
}

/// A single recorded MMIO register store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite
{
    /// Absolute physical address of the store
    pub addr: PhysAddr,
    /// The raw 32-bit value carried by the request
    pub value: u32,
    /// Width of the store that was performed
    pub width: MmioWidth,
}

struct SimInner
{
    page_size: usize,
    store: Mutex<Vec<u8>>,
    faults: Mutex<Vec<(u64, u64)>>,
    writes: Mutex<Vec<RegisterWrite>>,
    map_calls: AtomicUsize,
    live_windows: AtomicUsize,
    may_block: AtomicBool,
    deny_map: AtomicBool,
}

/// Simulated physical address space backed by a plain byte vector
///
/// Addresses `[0, size)` are backed; mapping beyond the end succeeds (as it
/// does for real I/O space) but transfers into unbacked territory fault.
#[derive(Clone)]
pub struct SimIoSpace
{
    inner: Arc<SimInner>,
}

impl SimIoSpace
{
    /// A simulated space of `size` backed bytes with 4 KiB pages
    pub fn new(size: usize) -> Self
    {
        Self::with_page_size(size, DEFAULT_PAGE_SIZE)
    }

    /// A simulated space with an explicit page size (must be a power of two)
    ///
    /// Oversized pages make it possible to drive the mapping-window cap:
    /// with a 4 KiB page a capped read can never overflow the window, but a
    /// large page plus a large in-page offset can.
    pub fn with_page_size(size: usize, page_size: usize) -> Self
    {
        assert!(page_size.is_power_of_two(), "page size must be a power of two");
        SimIoSpace {
            inner: Arc::new(SimInner {
                page_size,
                store: Mutex::new(vec![0u8; size]),
                faults: Mutex::new(Vec::new()),
                writes: Mutex::new(Vec::new()),
                map_calls: AtomicUsize::new(0),
                live_windows: AtomicUsize::new(0),
                may_block: AtomicBool::new(true),
                deny_map: AtomicBool::new(false),
            }),
        }
    }

    /// Seed the backing store with `bytes` starting at `addr`
    pub fn fill(&self, addr: PhysAddr, bytes: &[u8])
    {
        let mut store = self.inner.store.lock().unwrap();
        let start = addr.value() as usize;
        store[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Copy `len` bytes of the backing store starting at `addr`
    pub fn snapshot(&self, addr: PhysAddr, len: usize) -> Vec<u8>
    {
        let store = self.inner.store.lock().unwrap();
        let start = addr.value() as usize;
        store[start..start + len].to_vec()
    }

    /// Make every transfer touching `[base, base + bytes)` fault
    pub fn add_fault_range(&self, base: PhysAddr, bytes: u64)
    {
        self.inner.faults.lock().unwrap().push((base.value(), base.value() + bytes));
    }

    /// Control the simulated execution context
    ///
    /// With `false`, the gatekeeper rejects every request with
    /// `InvalidContext` before reaching the mapper.
    pub fn set_may_block(&self, may_block: bool)
    {
        self.inner.may_block.store(may_block, Ordering::SeqCst);
    }

    /// Make every subsequent mapping attempt fail with resource exhaustion
    pub fn deny_mappings(&self, deny: bool)
    {
        self.inner.deny_map.store(deny, Ordering::SeqCst);
    }

    /// Number of mapping windows currently outstanding
    ///
    /// Zero between requests; the tests assert it stays zero even after a
    /// transfer fault.
    pub fn live_windows(&self) -> usize
    {
        self.inner.live_windows.load(Ordering::SeqCst)
    }

    /// Total number of times [`IoSpace::map`] has been called
    ///
    /// Lets tests assert that a rejected request never reached the mapping
    /// primitive at all.
    pub fn map_calls(&self) -> usize
    {
        self.inner.map_calls.load(Ordering::SeqCst)
    }

    /// Every register store performed so far, in order
    pub fn register_writes(&self) -> Vec<RegisterWrite>
    {
        self.inner.writes.lock().unwrap().clone()
    }
}

impl SimInner
{
    fn check_backed(&self, start: u64, len: usize) -> Result<()>
    {
        let end = start + len as u64;
        let faults = self.faults.lock().unwrap();
        if faults.iter().any(|&(fs, fe)| start < fe && end > fs) {
            return Err(GateError::AccessViolation(PhysAddr::new(start)));
        }
        let backed = self.store.lock().unwrap().len() as u64;
        if end > backed {
            return Err(GateError::AccessViolation(PhysAddr::new(start)));
        }
        Ok(())
    }
}

impl IoSpace for SimIoSpace
{
    fn page_size(&self) -> usize
    {
        self.inner.page_size
    }

    fn may_block(&self) -> bool
    {
        self.inner.may_block.load(Ordering::SeqCst)
    }

    fn map(&self, base: PhysAddr, len: usize) -> Result<Box<dyn IoWindow + '_>>
    {
        self.inner.map_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.deny_map.load(Ordering::SeqCst) {
            return Err(GateError::InsufficientResources);
        }
        self.inner.live_windows.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimWindow {
            inner: Arc::clone(&self.inner),
            base: base.value(),
            len,
        }))
    }
}

struct SimWindow
{
    inner: Arc<SimInner>,
    base: u64,
    len: usize,
}

impl IoWindow for SimWindow
{
    fn read_into(&self, offset: usize, out: &mut [u8]) -> Result<()>
    {
        if offset + out.len() > self.len {
            return Err(GateError::InvalidParameter("transfer exceeds mapped window".to_string()));
        }
        let start = self.base + offset as u64;
        self.inner.check_backed(start, out.len())?;
        let store = self.inner.store.lock().unwrap();
        let begin = start as usize;
        out.copy_from_slice(&store[begin..begin + out.len()]);
        Ok(())
    }

    fn write_register(&self, offset: usize, value: u32, width: MmioWidth) -> Result<()>
    {
        if offset + width.bytes() > self.len {
            return Err(GateError::InvalidParameter("transfer exceeds mapped window".to_string()));
        }
        let start = self.base + offset as u64;
        self.inner.check_backed(start, width.bytes())?;

        let mut store = self.inner.store.lock().unwrap();
        let begin = start as usize;
        store[begin..begin + width.bytes()].copy_from_slice(&value.to_le_bytes()[..width.bytes()]);
        drop(store);

        self.inner.writes.lock().unwrap().push(RegisterWrite {
            addr: PhysAddr::new(start),
            value,
            width,
        });
        Ok(())
    }
}

impl Drop for SimWindow
{
    fn drop(&mut self)
    {
        self.inner.live_windows.fetch_sub(1, Ordering::SeqCst);
    }
}
