//! # Linux `/dev/mem` Adapter
//!
//! An [`IoSpace`] provider backed by `mmap` over `/dev/mem`.
//!
//! `/dev/mem` exposes physical address space as a character device; mapping
//! a page-aligned offset of it yields a window equivalent to the kernel
//! mapping the original component establishes. Opening the device requires
//! root (and a kernel built without `CONFIG_STRICT_DEVMEM`, or addresses the
//! restriction allows).
//!
//! No range source is provided here: enumerating physical memory ranges on
//! Linux means reading pseudo-files, which belongs to the data-collection
//! collaborators outside this crate. Deployments inject whatever
//! [`crate::platform::RangeSource`] fits their platform.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr;

use once_cell::sync::Lazy;

use crate::error::{GateError, Result};
use crate::platform::{IoSpace, IoWindow};
use crate::types::{MmioWidth, PhysAddr};

static SYSTEM_PAGE_SIZE: Lazy<usize> = Lazy::new(|| unsafe {
    let size = libc::sysconf(libc::_SC_PAGESIZE);
    if size <= 0 { 4096 } else { size as usize }
});

/// Mapping provider over `/dev/mem`
///
/// ## Example
///
/// ```rust,no_run
/// use physgate_core::platform::linux::DevMem;
/// use physgate_core::platform::sim::SimRanges;
/// use physgate_core::Gatekeeper;
///
/// let devmem = DevMem::open()?;
/// let gatekeeper = Gatekeeper::new(&SimRanges::empty(), Box::new(devmem));
/// # Ok::<(), physgate_core::GateError>(())
/// ```
pub struct DevMem
{
    file: File,
    page_size: usize,
}

impl DevMem
{
    /// Open `/dev/mem` for mapping
    ///
    /// The device is opened with `O_SYNC` so mapped MMIO windows are
    /// uncached, matching the non-cached mapping the original component
    /// requests.
    ///
    /// ## Errors
    ///
    /// - `Io`: the device does not exist or the caller lacks the privilege
    ///   to open it
    pub fn open() -> Result<Self>
    {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")?;
        Ok(DevMem {
            file,
            page_size: *SYSTEM_PAGE_SIZE,
        })
    }
}

impl IoSpace for DevMem
{
    fn page_size(&self) -> usize
    {
        self.page_size
    }

    fn map(&self, base: PhysAddr, len: usize) -> Result<Box<dyn IoWindow + '_>>
    {
        let mapped = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                base.value() as libc::off_t,
            )
        };
        if mapped == libc::MAP_FAILED {
            return Err(GateError::InsufficientResources);
        }
        Ok(Box::new(DevMemWindow {
            ptr: mapped.cast::<u8>(),
            len,
        }))
    }
}

struct DevMemWindow
{
    ptr: *mut u8,
    len: usize,
}

impl IoWindow for DevMemWindow
{
    fn read_into(&self, offset: usize, out: &mut [u8]) -> Result<()>
    {
        if offset + out.len() > self.len {
            return Err(GateError::InvalidParameter("transfer exceeds mapped window".to_string()));
        }
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.add(offset).cast_const(), out.as_mut_ptr(), out.len());
        }
        Ok(())
    }

    fn write_register(&self, offset: usize, value: u32, width: MmioWidth) -> Result<()>
    {
        if offset + width.bytes() > self.len {
            return Err(GateError::InvalidParameter("transfer exceeds mapped window".to_string()));
        }
        unsafe {
            let target = self.ptr.add(offset);
            match width {
                MmioWidth::Byte => ptr::write_volatile(target, value as u8),
                MmioWidth::Word => ptr::write_volatile(target.cast::<u16>(), value as u16),
                MmioWidth::Dword => ptr::write_volatile(target.cast::<u32>(), value),
            }
        }
        Ok(())
    }
}

impl Drop for DevMemWindow
{
    fn drop(&mut self)
    {
        // Best effort unmap - ignore errors
        unsafe {
            let _ = libc::munmap(self.ptr.cast(), self.len);
        }
    }
}
