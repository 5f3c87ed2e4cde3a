//! Tests for the hex + ASCII diagnostic formatter

use physgate_client::format_hexdump;
use physgate_core::types::PhysAddr;

#[test]
fn test_full_row_format()
{
    let bytes: Vec<u8> = (0..16).collect();
    let dump = format_hexdump(PhysAddr::new(0x1000), &bytes, 16);
    assert_eq!(
        dump,
        "0000000000001000: 00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f |................|\n"
    );
}

#[test]
fn test_ascii_gutter_shows_printable_bytes()
{
    let dump = format_hexdump(PhysAddr::ZERO, b"physgate", 8);
    assert_eq!(dump, "0000000000000000: 70 68 79 73  67 61 74 65 |physgate|\n");
}

#[test]
fn test_non_printable_bytes_render_as_dots()
{
    let dump = format_hexdump(PhysAddr::ZERO, &[0x41, 0x00, 0x7F, 0x20, 0xFF, 0x42, 0x0A, 0x5A], 8);
    assert!(dump.ends_with("|A.. .B.Z|\n"));
}

#[test]
fn test_partial_row_is_padded()
{
    let dump = format_hexdump(PhysAddr::new(0x2000), b"AB", 8);
    assert!(dump.starts_with("0000000000002000: 41 42 "));
    assert!(dump.ends_with("|AB|\n"));
    // Padded to the same row width as a full 8-byte row:
    // 18 prefix + 8 * 3 hex columns + 1 half-row gap + "|AB|" + newline
    assert_eq!(dump.len(), 18 + 25 + 4 + 1);
}

#[test]
fn test_rows_advance_the_address()
{
    let bytes = vec![0u8; 24];
    let dump = format_hexdump(PhysAddr::new(0x1000), &bytes, 8);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("0000000000001000: "));
    assert!(lines[1].starts_with("0000000000001008: "));
    assert!(lines[2].starts_with("0000000000001010: "));
}

#[test]
fn test_width_is_clamped()
{
    // Below the minimum: treated as 8 bytes per row
    let dump = format_hexdump(PhysAddr::ZERO, &[0u8; 16], 1);
    assert_eq!(dump.lines().count(), 2);

    // Above the maximum: treated as 32 bytes per row
    let dump = format_hexdump(PhysAddr::ZERO, &[0u8; 64], 100);
    assert_eq!(dump.lines().count(), 2);
}

#[test]
fn test_empty_buffer_renders_nothing()
{
    assert_eq!(format_hexdump(PhysAddr::ZERO, &[], 16), "");
}
