//! # Map–Transfer–Unmap Primitive
//!
//! The only functions that touch a mapping window.
//!
//! Both paths follow the same contract: map, transfer, unmap — with the
//! unmap guaranteed on every path. The window type unmaps in `Drop`, and the
//! explicit `drop` before the transfer result is surfaced makes the ordering
//! visible: no mapping outlives its request, whether the transfer succeeded
//! or faulted. A fault during the transfer is converted to `AccessViolation`
//! at this boundary; it never propagates as a crash.

use crate::error::{GateError, Result};
use crate::platform::IoSpace;
use crate::types::{MmioWidth, PhysAddr};

/// Map `[aligned, aligned + map_size)` and copy `out.len()` bytes from
/// `offset` into the caller's buffer.
pub(crate) fn copy_from_window(
    io: &dyn IoSpace,
    aligned: PhysAddr,
    map_size: usize,
    offset: usize,
    addr: PhysAddr,
    out: &mut [u8],
) -> Result<()>
{
    let window = io.map(aligned, map_size).map_err(|_| GateError::InsufficientResources)?;
    let transfer = window.read_into(offset, out).map_err(|_| GateError::AccessViolation(addr));
    // Unmap before surfacing the transfer result
    drop(window);
    transfer
}

/// Map `[aligned, aligned + map_size)` and store `value` at `offset` as a
/// single `width`-sized volatile write.
pub(crate) fn write_to_window(
    io: &dyn IoSpace,
    aligned: PhysAddr,
    map_size: usize,
    offset: usize,
    addr: PhysAddr,
    value: u32,
    width: MmioWidth,
) -> Result<()>
{
    let window = io.map(aligned, map_size).map_err(|_| GateError::InsufficientResources)?;
    let transfer = window
        .write_register(offset, value, width)
        .map_err(|_| GateError::AccessViolation(addr));
    drop(window);
    transfer
}
