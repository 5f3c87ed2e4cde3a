//! # Channel
//!
//! The transport seam between the client facade and a gatekeeper.
//!
//! A channel handle is an exclusively owned resource: it is moved, never
//! cloned, and whatever it holds (a device handle, an in-process
//! gatekeeper) is released exactly once, when the owning value is dropped —
//! on normal return, early return, and panic alike. Rust's move semantics
//! make use-after-move and double-release unrepresentable; implementations
//! only have to put their release in `Drop`.
//!
//! Two transports live here:
//!
//! - [`LoopbackChannel`] — drives an in-process [`Gatekeeper`]; used by the
//!   test suite and by deployments where the privileged core runs in the
//!   same process
//! - [`MsrLoopbackChannel`] — the same for the MSR variant
//!
//! The Windows device transport lives in `crate::platform::windows`.

use physgate_core::error::{GateError, Result};
use physgate_core::msr::{MsrGatekeeper, MsrReadRequest, MsrWriteRequest, REQ_MSR_READ, REQ_MSR_WRITE};
use physgate_core::protocol::{MmioWriteRequest, ReadRequest, Status, REQ_READ_PHYS, REQ_WRITE_MMIO};
use physgate_core::{Gatekeeper, PhysAddr};

/// A request/response transport to a gatekeeper
///
/// `transact` submits one request and blocks until its response: `code` is
/// the opaque request code, `input` the packed request structure, and
/// `output` receives the payload (empty for writes). Returns the number of
/// payload bytes written.
///
/// Implementations surface rejections as typed errors, so a caller sees the
/// same [`GateError`] whether the gatekeeper is in-process or behind a
/// device handle.
pub trait Channel
{
    /// Submit one request and wait for its response
    fn transact(&mut self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>;
}

/// Reconstruct the typed error behind a non-success wire status
///
/// Payloads that do not cross the wire are recovered from the request the
/// client just sent: the faulting address from the request's address field,
/// the register id for MSR faults, the code for unsupported requests. A
/// `BufferTooSmall` status is reported as a protocol error — the client
/// always frames its requests correctly, so seeing it means the two halves
/// disagree about the protocol.
pub(crate) fn rejection(status: Status, code: u32, input: &[u8]) -> GateError
{
    match status {
        Status::Success => GateError::Protocol("success status surfaced as a rejection".to_string()),
        Status::AccessViolation => GateError::AccessViolation(request_addr(code, input)),
        Status::InvalidParameter => {
            GateError::InvalidParameter(format!("request 0x{code:08x} rejected by the gatekeeper"))
        }
        Status::BufferTooSmall => {
            GateError::Protocol("gatekeeper reported a short request or response buffer".to_string())
        }
        Status::UnsupportedRequest => GateError::UnsupportedRequest(code),
        Status::MsrFault => GateError::MsrFault(request_register(code, input)),
        Status::InsufficientResources => GateError::InsufficientResources,
        Status::InvalidContext => GateError::InvalidContext,
    }
}

fn request_addr(code: u32, input: &[u8]) -> PhysAddr
{
    match code {
        REQ_READ_PHYS => ReadRequest::decode(input).map(|r| r.addr).unwrap_or(PhysAddr::ZERO),
        REQ_WRITE_MMIO => MmioWriteRequest::decode(input).map(|r| r.addr).unwrap_or(PhysAddr::ZERO),
        _ => PhysAddr::ZERO,
    }
}

fn request_register(code: u32, input: &[u8]) -> u32
{
    match code {
        REQ_MSR_READ => MsrReadRequest::decode(input).map(|r| r.register).unwrap_or(0),
        REQ_MSR_WRITE => MsrWriteRequest::decode(input).map(|r| r.register).unwrap_or(0),
        _ => 0,
    }
}

/// In-process transport over an owned [`Gatekeeper`]
///
/// ## Example
///
/// ```rust
/// use physgate_client::{LoopbackChannel, PhysMem};
/// use physgate_core::platform::sim::{SimIoSpace, SimRanges};
/// use physgate_core::types::{PhysAddr, PhysRange};
/// use physgate_core::Gatekeeper;
///
/// let io = SimIoSpace::new(0x10000);
/// let ranges = SimRanges::new(vec![PhysRange::new(PhysAddr::ZERO, 0x10000)]);
/// let gatekeeper = Gatekeeper::new(&ranges, Box::new(io));
///
/// let mut mem = PhysMem::new(LoopbackChannel::new(gatekeeper));
/// let value: u32 = mem.read(PhysAddr::new(0x1000))?;
/// assert_eq!(value, 0);
/// # Ok::<(), physgate_core::GateError>(())
/// ```
#[derive(Debug)]
pub struct LoopbackChannel
{
    gatekeeper: Gatekeeper,
}

impl LoopbackChannel
{
    /// Wrap an in-process gatekeeper as a channel
    pub fn new(gatekeeper: Gatekeeper) -> Self
    {
        LoopbackChannel { gatekeeper }
    }

    /// Borrow the wrapped gatekeeper
    pub fn gatekeeper(&self) -> &Gatekeeper
    {
        &self.gatekeeper
    }
}

impl Channel for LoopbackChannel
{
    fn transact(&mut self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        let (status, written) = self.gatekeeper.handle(code, input, output);
        if status.is_success() {
            Ok(written)
        } else {
            Err(rejection(status, code, input))
        }
    }
}

/// In-process transport over an owned [`MsrGatekeeper`]
pub struct MsrLoopbackChannel
{
    gatekeeper: MsrGatekeeper,
}

impl MsrLoopbackChannel
{
    /// Wrap an in-process MSR gatekeeper as a channel
    pub fn new(gatekeeper: MsrGatekeeper) -> Self
    {
        MsrLoopbackChannel { gatekeeper }
    }
}

impl Channel for MsrLoopbackChannel
{
    fn transact(&mut self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        let (status, written) = self.gatekeeper.handle(code, input, output);
        if status.is_success() {
            Ok(written)
        } else {
            Err(rejection(status, code, input))
        }
    }
}
