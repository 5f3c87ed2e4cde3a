//! # Model-Specific-Register Variant
//!
//! The secondary protocol: read and write model-specific registers through
//! the same validate → execute → respond shape as the physical-memory
//! channel, with its own request codes and a much smaller validation
//! surface (there is no address range or mapping window — just framing and
//! the fault boundary around the register access itself).
//!
//! An MSR access that faults (a register the processor does not implement
//! raises a privileged-instruction fault) is caught at the [`MsrAccess`]
//! provider boundary and reported as `MsrFault`; it never propagates as a
//! crash.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{GateError, Result};
use crate::protocol::Status;

/// Request code for "read MSR" (device type 0x8000, function 0x800)
pub const REQ_MSR_READ: u32 = 0x8000_2000;

/// Request code for "write MSR" (function 0x801)
pub const REQ_MSR_WRITE: u32 = 0x8000_2004;

/// A "read MSR" request
///
/// Wire layout: 4-byte little-endian register id. The response is the
/// 8-byte little-endian register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrReadRequest
{
    /// The register id (the value loaded into `ecx` for `rdmsr`)
    pub register: u32,
}

impl MsrReadRequest
{
    /// Size of the packed wire representation
    pub const WIRE_SIZE: usize = 4;

    /// Encode this request into its packed wire form
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE]
    {
        self.register.to_le_bytes()
    }

    /// Decode a request from its packed wire form
    pub fn decode(buf: &[u8]) -> Result<Self>
    {
        if buf.len() < Self::WIRE_SIZE {
            return Err(GateError::BufferTooSmall {
                needed: Self::WIRE_SIZE,
                got: buf.len(),
            });
        }
        Ok(MsrReadRequest {
            register: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        })
    }
}

/// A "write MSR" request
///
/// Wire layout (12 bytes, packed, little-endian): 4-byte register id
/// followed by the 8-byte value. The response carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrWriteRequest
{
    /// The register id
    pub register: u32,
    /// The 64-bit value to write
    pub value: u64,
}

impl MsrWriteRequest
{
    /// Size of the packed wire representation
    pub const WIRE_SIZE: usize = 12;

    /// Encode this request into its packed wire form
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE]
    {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[..4].copy_from_slice(&self.register.to_le_bytes());
        buf[4..12].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    /// Decode a request from its packed wire form
    pub fn decode(buf: &[u8]) -> Result<Self>
    {
        if buf.len() < Self::WIRE_SIZE {
            return Err(GateError::BufferTooSmall {
                needed: Self::WIRE_SIZE,
                got: buf.len(),
            });
        }
        Ok(MsrWriteRequest {
            register: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            value: u64::from_le_bytes([buf[4], buf[5], buf[6], buf[7], buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// Provider of raw MSR access
///
/// The contract is narrow on purpose: an access either returns the value /
/// succeeds, or reports a fault as an `Err`. The gatekeeper converts any
/// provider error into `MsrFault` carrying the register id.
pub trait MsrAccess: Send + Sync
{
    /// Read the 64-bit value of `register`
    fn read(&self, register: u32) -> Result<u64>;

    /// Write a 64-bit value to `register`
    fn write(&self, register: u32, value: u64) -> Result<()>;
}

/// The MSR-side gatekeeper: framing checks plus the fault boundary
///
/// Stateless beyond the injected provider; methods take `&self` and are
/// safe to call concurrently.
pub struct MsrGatekeeper
{
    msr: Box<dyn MsrAccess>,
}

impl MsrGatekeeper
{
    /// Create an MSR gatekeeper over the given provider
    pub fn new(msr: Box<dyn MsrAccess>) -> Self
    {
        MsrGatekeeper { msr }
    }

    /// Read `register`, converting a provider fault into `MsrFault`
    pub fn read(&self, register: u32) -> Result<u64>
    {
        self.msr.read(register).map_err(|_| GateError::MsrFault(register))
    }

    /// Write `register`, converting a provider fault into `MsrFault`
    pub fn write(&self, register: u32, value: u64) -> Result<()>
    {
        self.msr.write(register, value).map_err(|_| GateError::MsrFault(register))
    }

    /// Handle one wire request; the MSR counterpart of
    /// [`crate::Gatekeeper::handle`]
    pub fn handle(&self, code: u32, input: &[u8], output: &mut [u8]) -> (Status, usize)
    {
        match self.dispatch(code, input, output) {
            Ok(written) => (Status::Success, written),
            Err(err) => {
                debug!(code = format_args!("0x{code:08x}"), error = %err, "MSR request rejected");
                (Status::from(&err), 0)
            }
        }
    }

    fn dispatch(&self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        match code {
            REQ_MSR_READ => {
                let request = MsrReadRequest::decode(input)?;
                if output.len() < 8 {
                    return Err(GateError::BufferTooSmall {
                        needed: 8,
                        got: output.len(),
                    });
                }
                let value = self.read(request.register)?;
                output[..8].copy_from_slice(&value.to_le_bytes());
                Ok(8)
            }
            REQ_MSR_WRITE => {
                let request = MsrWriteRequest::decode(input)?;
                self.write(request.register, request.value)?;
                Ok(0)
            }
            other => Err(GateError::UnsupportedRequest(other)),
        }
    }
}

struct SimMsrInner
{
    registers: Mutex<HashMap<u32, u64>>,
    faulting: Mutex<HashSet<u32>>,
}

/// Simulated MSR provider backed by a register map
///
/// Registers that were never seeded fault on read, as an unimplemented MSR
/// does on real hardware. Like the simulated I/O space, this is a cheap
/// handle over shared state: clone it before handing it to a gatekeeper and
/// inspect it afterwards.
#[derive(Clone)]
pub struct SimMsr
{
    inner: Arc<SimMsrInner>,
}

impl SimMsr
{
    /// An empty register file (every read faults until seeded)
    pub fn new() -> Self
    {
        SimMsr {
            inner: Arc::new(SimMsrInner {
                registers: Mutex::new(HashMap::new()),
                faulting: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Define `register` with an initial `value`
    pub fn seed(&self, register: u32, value: u64)
    {
        self.inner.registers.lock().unwrap().insert(register, value);
    }

    /// Make every access to `register` fault, even if seeded
    pub fn fault_on(&self, register: u32)
    {
        self.inner.faulting.lock().unwrap().insert(register);
    }

    /// The current value of `register`, if defined
    pub fn get(&self, register: u32) -> Option<u64>
    {
        self.inner.registers.lock().unwrap().get(&register).copied()
    }
}

impl Default for SimMsr
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl MsrAccess for SimMsr
{
    fn read(&self, register: u32) -> Result<u64>
    {
        if self.inner.faulting.lock().unwrap().contains(&register) {
            return Err(GateError::MsrFault(register));
        }
        self.inner
            .registers
            .lock()
            .unwrap()
            .get(&register)
            .copied()
            .ok_or(GateError::MsrFault(register))
    }

    fn write(&self, register: u32, value: u64) -> Result<()>
    {
        if self.inner.faulting.lock().unwrap().contains(&register) {
            return Err(GateError::MsrFault(register));
        }
        self.inner.registers.lock().unwrap().insert(register, value);
        Ok(())
    }
}
