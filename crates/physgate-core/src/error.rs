//! # Error Types
//!
//! General error handling for the gatekeeper and its clients.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::PhysAddr;

/// Main error type for gatekeeper operations
///
/// This enum represents all the ways a physical-memory or MMIO request can
/// fail, on either side of the privileged channel.
///
/// ## Error Categories
///
/// 1. **Validation errors**: InvalidContext, BufferTooSmall, InvalidParameter
/// 2. **Access errors**: AccessViolation (out-of-range address or a fault
///    during the actual transfer), MsrFault
/// 3. **Resource errors**: InsufficientResources (mapping window could not be
///    established)
/// 4. **Protocol errors**: UnsupportedRequest, Protocol
/// 5. **Client-side errors**: ChannelUnavailable, ServiceControlFailure, Io
///
/// Every validation failure is detected before any unsafe access happens and
/// is non-fatal to the gatekeeper — only the offending request fails.
#[derive(Error, Debug)]
pub enum GateError
{
    /// The operation was attempted from an execution context where touching
    /// caller buffers or performing a blocking mapping is not permitted.
    ///
    /// The original driver rejects requests arriving above passive IRQL; the
    /// provider reports the equivalent condition through
    /// [`crate::platform::IoSpace::may_block`].
    #[error("Operation not permitted in the current execution context")]
    InvalidContext,

    /// A request or response buffer is smaller than the fixed-size structure
    /// (or payload) the operation requires.
    #[error("Buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall
    {
        /// Minimum number of bytes the operation requires
        needed: usize,
        /// Number of bytes actually supplied
        got: usize,
    },

    /// A request parameter is out of bounds
    ///
    /// Examples:
    /// - Read length of zero or above [`crate::types::MAX_READ_SIZE`]
    /// - MMIO write width other than 1, 2, or 4 bytes
    /// - Implied mapping window above [`crate::types::MAX_MAP_SIZE`]
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The request names an address outside the known physical range, or the
    /// transfer faulted partway (e.g. the range turned out to be unbacked).
    ///
    /// Transfer-time faults are caught at the map/copy boundary and converted
    /// to this variant; they never propagate as a crash.
    #[error("Access violation at physical address {0}")]
    AccessViolation(PhysAddr),

    /// The mapping window could not be established (resource exhaustion).
    #[error("Insufficient resources to establish the mapping window")]
    InsufficientResources,

    /// The request carried a code the dispatcher does not recognize.
    #[error("Unsupported request code 0x{0:08x}")]
    UnsupportedRequest(u32),

    /// A model-specific-register access faulted.
    ///
    /// Reading or writing a register the processor does not implement raises
    /// a privileged-instruction fault; the MSR gatekeeper catches it at the
    /// provider boundary and reports it here.
    #[error("MSR access fault on register 0x{0:08x}")]
    MsrFault(u32),

    /// The gatekeeper component is not installed or not running
    ///
    /// Surfaced by the client when opening the channel fails because the
    /// component is absent, as distinct from a generic open failure. The
    /// caller can decide to install the component and retry.
    #[error("Gatekeeper channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// A service lifecycle operation (install/start/stop/remove) failed
    ///
    /// Carries the underlying platform error code so callers can distinguish
    /// e.g. "not found" from "access denied".
    #[error("Service control operation `{operation}` failed with code {code}")]
    ServiceControlFailure
    {
        /// The lifecycle verb that failed
        operation: &'static str,
        /// The raw platform error code
        code: i32,
    },

    /// The response frame was malformed (short read, unexpected length)
    ///
    /// This is the client-side counterpart of `BufferTooSmall`: the channel
    /// transport returned fewer or more bytes than the protocol promises.
    #[error("Malformed response frame: {0}")]
    Protocol(String),

    /// I/O error (for channel transport operations, `/dev/mem`, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, GateError>`
///
/// ```rust
/// use physgate_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, GateError>;
