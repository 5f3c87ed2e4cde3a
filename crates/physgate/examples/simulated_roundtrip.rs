//! Simulated Round-Trip Example
//!
//! Demonstrates the whole request path without privileges or hardware, on
//! the simulated platform.
//!
//! ## What this example does:
//!
//! 1. Installs and starts the gatekeeper component (in-memory manager)
//! 2. Opens a channel and wraps it in the typed facade
//! 3. Writes a 32-bit pattern to a simulated MMIO register
//! 4. Reads it back through the typed read facade
//! 5. Shows a rejected request surfacing as a typed error
//! 6. Removes the component again
//!
//! ## Usage:
//!
//! ```bash
//! RUST_LOG=debug cargo run --example simulated_roundtrip
//! ```

use physgate::client::lifecycle::{install, remove, ServiceConfig};
use physgate::client::SimServiceManager;
use physgate::core::platform::sim::{SimIoSpace, SimRanges};
use physgate::utils::init_logging;
use physgate::{Gatekeeper, PhysAddr, PhysMem, PhysRange};

fn main()
{
    init_logging().expect("Failed to initialize logging");

    // The simulated platform: 1 MiB of backed "physical memory" plus the
    // matching range list the gatekeeper folds into its bound
    let io = SimIoSpace::new(0x100000);
    let ranges = SimRanges::new(vec![PhysRange::new(PhysAddr::ZERO, 0x100000)]);

    // Install and start the gatekeeper component. Doing it twice is fine -
    // install converges on already-installed state.
    let mut manager = SimServiceManager::new();
    let config = ServiceConfig::new("physgate", "physgate.sys");
    install(&mut manager, &config).expect("Failed to install the component");
    install(&mut manager, &config).expect("Second install should converge");

    // Open the channel and hand it to the typed facade
    let gatekeeper = Gatekeeper::new(&ranges, Box::new(io.clone()));
    let channel = manager
        .open_channel(&config.name, gatekeeper)
        .expect("Failed to open the channel");
    let mut mem = PhysMem::new(channel);

    // Write a known pattern to a "register" and read it back typed
    let register = PhysAddr::new(0x8000);
    mem.write_mmio32(register, 0xCAFE_F00D).expect("MMIO write failed");
    let value: u32 = mem.read(register).expect("Typed read failed");
    tracing::info!(%register, value = format_args!("0x{value:08x}"), "round trip complete");
    assert_eq!(value, 0xCAFE_F00D);

    // A request past the known bound is rejected, typed, without touching
    // the mapping primitive
    match mem.read_bytes(PhysAddr::new(0xFFFF0), 0x20) {
        Err(err) => tracing::warn!(error = %err, "out-of-range read rejected as expected"),
        Ok(_) => panic!("out-of-range read should have been rejected"),
    }

    // Tear the component down
    remove(&mut manager, &config.name).expect("Failed to remove the component");
    tracing::info!("done");
}
