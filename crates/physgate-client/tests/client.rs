//! Tests for the typed read/write facade over the loopback channel

use physgate_client::{Channel, LoopbackChannel, MsrLoopbackChannel, Msr, PhysMem};
use physgate_core::error::GateError;
use physgate_core::msr::{MsrGatekeeper, SimMsr};
use physgate_core::platform::sim::{SimIoSpace, SimRanges};
use physgate_core::types::{MmioWidth, PhysAddr, PhysRange, MAX_READ_SIZE};
use physgate_core::Gatekeeper;

fn loopback(bound: u64, backed: usize) -> (PhysMem<LoopbackChannel>, SimIoSpace)
{
    let io = SimIoSpace::new(backed);
    let ranges = SimRanges::new(vec![PhysRange::new(PhysAddr::ZERO, bound)]);
    let gatekeeper = Gatekeeper::new(&ranges, Box::new(io.clone()));
    (PhysMem::new(LoopbackChannel::new(gatekeeper)), io)
}

#[test]
fn test_read_bytes_round_trip()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);
    let pattern: Vec<u8> = (0..32).collect();
    io.fill(PhysAddr::new(0x100000), &pattern);

    let bytes = mem.read_bytes(PhysAddr::new(0x100000), 32).unwrap();
    assert_eq!(bytes, pattern);
}

#[test]
fn test_read_into_buffer()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);
    io.fill(PhysAddr::new(0x2000), b"firmware");

    let mut out = [0u8; 8];
    mem.read_into(PhysAddr::new(0x2000), &mut out).unwrap();
    assert_eq!(&out, b"firmware");
}

#[test]
fn test_typed_reads_are_little_endian()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);
    io.fill(PhysAddr::new(0x1000), &[0x78, 0x56, 0x34, 0x12, 0xEF, 0xCD, 0xAB, 0x89]);

    assert_eq!(mem.read::<u8>(PhysAddr::new(0x1000)).unwrap(), 0x78);
    assert_eq!(mem.read::<u16>(PhysAddr::new(0x1000)).unwrap(), 0x5678);
    assert_eq!(mem.read::<u32>(PhysAddr::new(0x1000)).unwrap(), 0x1234_5678);
    assert_eq!(mem.read::<u64>(PhysAddr::new(0x1000)).unwrap(), 0x89AB_CDEF_1234_5678);
}

#[test]
fn test_mmio_write_read_round_trip()
{
    let (mut mem, _io) = loopback(0x200000, 0x200000);
    let register = PhysAddr::new(0x4000);

    mem.write_mmio32(register, 0xA5A5_5A5A).unwrap();
    assert_eq!(mem.read::<u32>(register).unwrap(), 0xA5A5_5A5A);
}

#[test]
fn test_generic_mmio_write_selects_width_from_type()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);

    mem.write_mmio(PhysAddr::new(0x1000), 0xABu8).unwrap();
    mem.write_mmio(PhysAddr::new(0x2000), 0xBEEFu16).unwrap();
    mem.write_mmio(PhysAddr::new(0x3000), 0xDEAD_BEEFu32).unwrap();

    let widths: Vec<MmioWidth> = io.register_writes().iter().map(|write| write.width).collect();
    assert_eq!(widths, [MmioWidth::Byte, MmioWidth::Word, MmioWidth::Dword]);
}

#[test]
fn test_width_helpers_match_generic_write()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);
    mem.write_mmio8(PhysAddr::new(0x1000), 0x11).unwrap();
    mem.write_mmio16(PhysAddr::new(0x1002), 0x2222).unwrap();
    mem.write_mmio32(PhysAddr::new(0x1004), 0x3333_3333).unwrap();

    let writes = io.register_writes();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0].width, MmioWidth::Byte);
    assert_eq!(writes[1].width, MmioWidth::Word);
    assert_eq!(writes[2].width, MmioWidth::Dword);
}

#[test]
fn test_client_validates_length_before_the_channel()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);

    assert!(matches!(
        mem.read_bytes(PhysAddr::new(0x1000), 0),
        Err(GateError::InvalidParameter(_))
    ));
    assert!(matches!(
        mem.read_bytes(PhysAddr::new(0x1000), MAX_READ_SIZE + 1),
        Err(GateError::InvalidParameter(_))
    ));
    // Neither request crossed the channel
    assert_eq!(io.map_calls(), 0);
}

#[test]
fn test_gatekeeper_rejection_surfaces_typed()
{
    let (mut mem, _io) = loopback(0x200000, 0x200000);
    let addr = PhysAddr::new(0xFFFF_FFFF_FFFF);
    let err = mem.read_bytes(addr, 16).unwrap_err();
    match err {
        GateError::AccessViolation(at) => assert_eq!(at, addr),
        other => panic!("Expected AccessViolation, got {other:?}"),
    }
}

/// A channel that acknowledges reads with one byte fewer than requested
struct ShortChannel;

impl Channel for ShortChannel
{
    fn transact(&mut self, _code: u32, _input: &[u8], output: &mut [u8]) -> physgate_core::Result<usize>
    {
        Ok(output.len().saturating_sub(1))
    }
}

#[test]
fn test_short_response_is_a_protocol_error()
{
    let mut mem = PhysMem::new(ShortChannel);
    let err = mem.read_bytes(PhysAddr::new(0x1000), 16).unwrap_err();
    assert!(matches!(err, GateError::Protocol(_)));
}

#[test]
fn test_hexdump_through_the_client()
{
    let (mut mem, io) = loopback(0x200000, 0x200000);
    io.fill(PhysAddr::new(0x1000), b"PHYSGATE");

    let dump = mem.hexdump(PhysAddr::new(0x1000), 8, 8).unwrap();
    assert!(dump.starts_with("0000000000001000: "));
    assert!(dump.contains("|PHYSGATE|"));
}

#[test]
fn test_msr_facade_round_trip()
{
    let sim = SimMsr::new();
    sim.seed(0x1B, 0xFEE0_0900);
    let mut msr = Msr::new(MsrLoopbackChannel::new(MsrGatekeeper::new(Box::new(sim.clone()))));

    assert_eq!(msr.read(0x1B).unwrap(), 0xFEE0_0900);
    msr.write(0x1B, 0xFEE0_0800).unwrap();
    assert_eq!(sim.get(0x1B), Some(0xFEE0_0800));
}

#[test]
fn test_msr_facade_fault_carries_register()
{
    let sim = SimMsr::new();
    let mut msr = Msr::new(MsrLoopbackChannel::new(MsrGatekeeper::new(Box::new(sim))));

    let err = msr.read(0xC0DE).unwrap_err();
    match err {
        GateError::MsrFault(register) => assert_eq!(register, 0xC0DE),
        other => panic!("Expected MsrFault, got {other:?}"),
    }
}
