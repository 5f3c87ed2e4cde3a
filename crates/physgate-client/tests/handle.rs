//! Tests for channel handle ownership: move-only, released exactly once

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use physgate_client::{Channel, PhysMem};
use physgate_core::Result;

/// A channel that counts how many times it is released
struct CountingChannel
{
    releases: Arc<AtomicUsize>,
}

impl Channel for CountingChannel
{
    fn transact(&mut self, _code: u32, _input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        Ok(output.len())
    }
}

impl Drop for CountingChannel
{
    fn drop(&mut self)
    {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_channel() -> (CountingChannel, Arc<AtomicUsize>)
{
    let releases = Arc::new(AtomicUsize::new(0));
    (
        CountingChannel {
            releases: Arc::clone(&releases),
        },
        releases,
    )
}

fn pass_through<C: Channel>(mem: PhysMem<C>) -> PhysMem<C>
{
    // Ownership moves in and back out; no release happens on the way
    mem
}

#[test]
fn test_handle_released_exactly_once_on_drop()
{
    let (channel, releases) = counting_channel();
    {
        let mem = PhysMem::new(channel);
        let mem = pass_through(mem);
        assert_eq!(releases.load(Ordering::SeqCst), 0);
        drop(mem);
    }
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handle_released_once_through_into_channel()
{
    let (channel, releases) = counting_channel();
    let mem = PhysMem::new(channel);

    // Consuming the client transfers ownership back without releasing
    let channel = mem.into_channel();
    assert_eq!(releases.load(Ordering::SeqCst), 0);

    drop(channel);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handle_released_on_early_exit()
{
    let (channel, releases) = counting_channel();

    fn uses_and_bails<C: Channel>(_mem: PhysMem<C>) -> Result<()>
    {
        // The handle goes out of scope on this early return
        Err(physgate_core::GateError::InsufficientResources)
    }

    let result = uses_and_bails(PhysMem::new(channel));
    assert!(result.is_err());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}
