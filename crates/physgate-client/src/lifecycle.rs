//! # Component Lifecycle
//!
//! Out-of-band management of the gatekeeper component itself: install
//! (register + start) and remove (stop + unregister), spoken through the
//! [`ServiceManager`] capability so the same verbs drive the real service
//! control manager on Windows and the in-memory manager in tests.
//!
//! Both verbs converge rather than error on state that is already where it
//! should be: installing an already-registered, already-running component
//! succeeds without side effects. Removal of a component that was never
//! installed surfaces the platform's "does not exist" code — the caller
//! asked to change state that is not there, which is worth knowing about.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use physgate_core::error::{GateError, Result};
use physgate_core::Gatekeeper;

use crate::channel::LoopbackChannel;

/// The platform's "service does not exist" error code
///
/// Surfaced by [`remove`] when the component was never installed.
pub const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;

/// Identity and on-disk location of the gatekeeper component
#[derive(Debug, Clone)]
pub struct ServiceConfig
{
    /// Service name the component registers under
    pub name: String,
    /// Path to the component binary
    pub binary_path: PathBuf,
}

impl ServiceConfig
{
    /// Config for a component named `name` backed by `binary_path`
    pub fn new(name: impl Into<String>, binary_path: impl Into<PathBuf>) -> Self
    {
        ServiceConfig {
            name: name.into(),
            binary_path: binary_path.into(),
        }
    }
}

impl Default for ServiceConfig
{
    fn default() -> Self
    {
        ServiceConfig::new("physgate", "physgate.sys")
    }
}

/// Platform capability for registering and controlling the component
///
/// The primitives carry idempotence information upward (`Ok(false)` for
/// "was already there") instead of burying it in platform error codes, so
/// [`install`] and [`remove`] stay platform-agnostic.
pub trait ServiceManager
{
    /// Register the component
    ///
    /// Returns `Ok(true)` if newly registered, `Ok(false)` if a component
    /// of that name already existed.
    fn create(&mut self, config: &ServiceConfig) -> Result<bool>;

    /// Start the component
    ///
    /// Returns `Ok(true)` if started, `Ok(false)` if it was already
    /// running.
    fn start(&mut self, name: &str) -> Result<bool>;

    /// Stop the component
    fn stop(&mut self, name: &str) -> Result<()>;

    /// Unregister the component
    fn delete(&mut self, name: &str) -> Result<()>;
}

/// Register and start the gatekeeper component
///
/// Idempotent: "already registered" and "already running" are success, not
/// errors — repeated calls converge on the same installed-and-running
/// state.
///
/// ## Errors
///
/// - `ServiceControlFailure`: registration or start failed for any other
///   reason; carries the lifecycle verb and the platform error code
pub fn install(manager: &mut dyn ServiceManager, config: &ServiceConfig) -> Result<()>
{
    if manager.create(config)? {
        info!(service = %config.name, path = %config.binary_path.display(), "component registered");
    } else {
        debug!(service = %config.name, "component already registered");
    }

    if manager.start(&config.name)? {
        info!(service = %config.name, "component started");
    } else {
        debug!(service = %config.name, "component already running");
    }
    Ok(())
}

/// Stop and unregister the gatekeeper component
///
/// The stop is best-effort — a component that is not running still gets
/// unregistered. Removing a component that does not exist surfaces the
/// platform's "does not exist" code.
///
/// ## Errors
///
/// - `ServiceControlFailure`: the component could not be unregistered;
///   carries the platform error code (notably
///   [`ERROR_SERVICE_DOES_NOT_EXIST`])
pub fn remove(manager: &mut dyn ServiceManager, name: &str) -> Result<()>
{
    if let Err(err) = manager.stop(name) {
        debug!(service = name, error = %err, "stop before removal failed");
    }
    manager.delete(name)?;
    info!(service = name, "component removed");
    Ok(())
}

#[derive(Default)]
struct SimService
{
    running: bool,
}

/// In-memory service manager
///
/// Models the external registration state the real service control manager
/// holds, including state left over from "a prior run" (construct, install,
/// and hand the same manager to the next piece of code). Also the place
/// where channel availability is decided in tests: [`Self::open_channel`]
/// refuses with `ChannelUnavailable` unless the component is installed and
/// running, as opening the device node would.
#[derive(Default)]
pub struct SimServiceManager
{
    services: HashMap<String, SimService>,
}

impl SimServiceManager
{
    /// An empty registration state
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Whether a component of this name is registered
    pub fn is_registered(&self, name: &str) -> bool
    {
        self.services.contains_key(name)
    }

    /// Whether a component of this name is registered and running
    pub fn is_running(&self, name: &str) -> bool
    {
        self.services.get(name).is_some_and(|service| service.running)
    }

    /// Open a channel to the named component
    ///
    /// ## Errors
    ///
    /// - `ChannelUnavailable`: the component is not installed or not
    ///   running
    pub fn open_channel(&self, name: &str, gatekeeper: Gatekeeper) -> Result<LoopbackChannel>
    {
        if self.is_running(name) {
            Ok(LoopbackChannel::new(gatekeeper))
        } else {
            Err(GateError::ChannelUnavailable(format!(
                "component `{name}` is not installed or not running"
            )))
        }
    }
}

impl ServiceManager for SimServiceManager
{
    fn create(&mut self, config: &ServiceConfig) -> Result<bool>
    {
        if self.services.contains_key(&config.name) {
            return Ok(false);
        }
        self.services.insert(config.name.clone(), SimService::default());
        Ok(true)
    }

    fn start(&mut self, name: &str) -> Result<bool>
    {
        let service = self.services.get_mut(name).ok_or(GateError::ServiceControlFailure {
            operation: "start",
            code: ERROR_SERVICE_DOES_NOT_EXIST,
        })?;
        if service.running {
            Ok(false)
        } else {
            service.running = true;
            Ok(true)
        }
    }

    fn stop(&mut self, name: &str) -> Result<()>
    {
        let service = self.services.get_mut(name).ok_or(GateError::ServiceControlFailure {
            operation: "stop",
            code: ERROR_SERVICE_DOES_NOT_EXIST,
        })?;
        service.running = false;
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<()>
    {
        if self.services.remove(name).is_none() {
            return Err(GateError::ServiceControlFailure {
                operation: "delete",
                code: ERROR_SERVICE_DOES_NOT_EXIST,
            });
        }
        Ok(())
    }
}
