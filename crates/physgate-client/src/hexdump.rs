//! # Hex Dump
//!
//! Formats byte buffers into a traditional address-prefixed hex + ASCII
//! view. Purely a presentation utility; nothing here touches the channel.

use physgate_core::types::PhysAddr;

/// Render `bytes` as a hex + ASCII dump with `width` bytes per row
///
/// Rows are prefixed with the absolute address, hex columns carry an extra
/// gap at the half-row mark, and the ASCII gutter shows printable bytes
/// verbatim with `.` for everything else. `width` is clamped to `[8, 32]`.
///
/// ## Example
///
/// ```rust
/// use physgate_client::hexdump::format_hexdump;
/// use physgate_core::types::PhysAddr;
///
/// let dump = format_hexdump(PhysAddr::new(0x1000), b"physgate", 16);
/// assert!(dump.starts_with("0000000000001000: 70 68 79 73 67 61 74 65"));
/// assert!(dump.ends_with("|physgate|\n"));
/// ```
pub fn format_hexdump(base: PhysAddr, bytes: &[u8], width: usize) -> String
{
    let width = width.clamp(8, 32);
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(width).enumerate() {
        let addr = base.value().saturating_add((row * width) as u64);
        out.push_str(&format!("{addr:016x}: "));

        for i in 0..width {
            if i < chunk.len() {
                out.push_str(&format!("{:02x} ", chunk[i]));
            } else {
                out.push_str("   ");
            }
            if i + 1 == width / 2 {
                out.push(' ');
            }
        }

        out.push('|');
        for byte in chunk {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            out.push(ch);
        }
        out.push_str("|\n");
    }
    out
}
