//! # Request Dispatch
//!
//! The gatekeeper-side protocol state machine.
//!
//! Stateless: two request kinds, each a straight-line
//! validate → execute → respond path, with no request depending on a prior
//! one. The dispatcher performs no raw memory access itself — every branch
//! funnels through the validation choke point before the mapping primitive.

use tracing::debug;

use crate::error::{GateError, Result};
use crate::gatekeeper::Gatekeeper;
use crate::protocol::{MmioWriteRequest, ReadRequest, Status, REQ_READ_PHYS, REQ_WRITE_MMIO};

impl Gatekeeper
{
    /// Handle one wire request
    ///
    /// `input` is the packed request structure, `output` receives the read
    /// payload (unused for writes). Returns the wire status plus the number
    /// of payload bytes written to `output`.
    ///
    /// This is the entry point a channel transport drives; in-process
    /// callers are better served by the typed methods.
    pub fn handle(&self, code: u32, input: &[u8], output: &mut [u8]) -> (Status, usize)
    {
        match self.dispatch(code, input, output) {
            Ok(written) => (Status::Success, written),
            Err(err) => {
                debug!(code = format_args!("0x{code:08x}"), error = %err, "request rejected");
                (Status::from(&err), 0)
            }
        }
    }

    fn dispatch(&self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        match code {
            REQ_READ_PHYS => {
                let request = ReadRequest::decode(input)?;
                self.read_physical(request.addr, request.length, output)
            }
            REQ_WRITE_MMIO => {
                let request = MmioWriteRequest::decode(input)?;
                self.write_mmio(request.addr, request.value, request.width)?;
                Ok(0)
            }
            other => Err(GateError::UnsupportedRequest(other)),
        }
    }
}
