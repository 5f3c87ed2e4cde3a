//! Hexdump Tour Example
//!
//! Reads a simulated firmware area and renders it with the diagnostic
//! hex + ASCII formatter.
//!
//! ## Usage:
//!
//! ```bash
//! cargo run --example hexdump_tour
//! ```

use physgate::client::LoopbackChannel;
use physgate::core::platform::sim::{SimIoSpace, SimRanges};
use physgate::utils::init_logging;
use physgate::{Gatekeeper, PhysAddr, PhysMem, PhysRange};

fn main()
{
    init_logging().expect("Failed to initialize logging");

    // Seed the legacy BIOS area with something recognizable
    let io = SimIoSpace::new(0x100000);
    io.fill(PhysAddr::new(0xF0000), b"PHYSGATE DEMO FIRMWARE 1.0\0");
    io.fill(PhysAddr::new(0xF0040), &[0x55, 0xAA, 0xDE, 0xAD, 0xBE, 0xEF]);

    let ranges = SimRanges::new(vec![PhysRange::new(PhysAddr::ZERO, 0x100000)]);
    let gatekeeper = Gatekeeper::new(&ranges, Box::new(io));
    let mut mem = PhysMem::new(LoopbackChannel::new(gatekeeper));

    let dump = mem
        .hexdump(PhysAddr::new(0xF0000), 0x60, 16)
        .expect("Failed to read the firmware area");
    println!("{dump}");
}
