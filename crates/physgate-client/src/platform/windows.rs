//! # Windows Adapters
//!
//! The real transport and lifecycle wiring: [`DeviceChannel`] opens the
//! gatekeeper's device node and speaks buffered device I/O control to it;
//! [`ScmServiceManager`] drives the service control manager to register,
//! start, stop, and unregister the kernel component.
//!
//! Handle hygiene follows the rest of the crate: every raw OS handle lives
//! inside an owning type whose `Drop` closes it exactly once.

use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use tracing::debug;

use physgate_core::error::{GateError, Result};

use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND, ERROR_SERVICE_ALREADY_RUNNING,
    ERROR_SERVICE_EXISTS, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{CreateFileW, DELETE, FILE_ATTRIBUTE_NORMAL, OPEN_EXISTING};
use windows_sys::Win32::System::Services::{
    CloseServiceHandle, ControlService, CreateServiceW, DeleteService, OpenSCManagerW, OpenServiceW, StartServiceW,
    SC_HANDLE, SC_MANAGER_ALL_ACCESS, SC_MANAGER_CREATE_SERVICE, SERVICE_ALL_ACCESS, SERVICE_CONTROL_STOP,
    SERVICE_DEMAND_START, SERVICE_ERROR_NORMAL, SERVICE_KERNEL_DRIVER, SERVICE_STATUS, SERVICE_STOP,
};
use windows_sys::Win32::System::IO::DeviceIoControl;

use crate::channel::Channel;
use crate::lifecycle::{ServiceConfig, ServiceManager};

fn wide(s: &OsStr) -> Vec<u16>
{
    s.encode_wide().chain(std::iter::once(0)).collect()
}

fn last_error() -> i32
{
    unsafe { GetLastError() as i32 }
}

/// Channel over the gatekeeper's device node
///
/// Opened by path (e.g. `\\.\PhysGate`); the handle is closed exactly once,
/// when the channel is dropped.
pub struct DeviceChannel
{
    handle: HANDLE,
}

impl DeviceChannel
{
    /// Open the device node at `device_path`
    ///
    /// ## Errors
    ///
    /// - `ChannelUnavailable`: the node does not exist — the component is
    ///   not installed or not running
    /// - `Io`: any other open failure (access denied, sharing violation)
    pub fn open(device_path: &str) -> Result<Self>
    {
        let path = wide(OsStr::new(device_path));
        let handle = unsafe {
            CreateFileW(
                path.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                0,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            let code = last_error();
            return match code as u32 {
                ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => {
                    Err(GateError::ChannelUnavailable(device_path.to_string()))
                }
                _ => Err(GateError::Io(io::Error::from_raw_os_error(code))),
            };
        }
        debug!(device = device_path, "device channel opened");
        Ok(DeviceChannel { handle })
    }
}

// The handle is exclusively owned and only used through &mut self.
unsafe impl Send for DeviceChannel {}

impl Channel for DeviceChannel
{
    fn transact(&mut self, code: u32, input: &[u8], output: &mut [u8]) -> Result<usize>
    {
        let mut returned: u32 = 0;
        let ok = unsafe {
            DeviceIoControl(
                self.handle,
                code,
                input.as_ptr().cast(),
                input.len() as u32,
                output.as_mut_ptr().cast(),
                output.len() as u32,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(GateError::Io(io::Error::from_raw_os_error(last_error())));
        }
        Ok(returned as usize)
    }
}

impl Drop for DeviceChannel
{
    fn drop(&mut self)
    {
        if self.handle != INVALID_HANDLE_VALUE {
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}

/// Owned service-control handle, closed on drop
struct ScHandle(SC_HANDLE);

impl Drop for ScHandle
{
    fn drop(&mut self)
    {
        unsafe {
            CloseServiceHandle(self.0);
        }
    }
}

/// [`ServiceManager`] over the Windows service control manager
///
/// Each verb opens the manager fresh and closes every handle before
/// returning, like the setup routines it replaces.
#[derive(Default)]
pub struct ScmServiceManager;

impl ScmServiceManager
{
    /// A manager for the local machine
    pub fn new() -> Self
    {
        ScmServiceManager
    }

    fn open_manager(&self, access: u32, operation: &'static str) -> Result<ScHandle>
    {
        let scm = unsafe { OpenSCManagerW(ptr::null(), ptr::null(), access) };
        if scm.is_null() {
            return Err(GateError::ServiceControlFailure {
                operation,
                code: last_error(),
            });
        }
        Ok(ScHandle(scm))
    }

    fn open_service(&self, scm: &ScHandle, name: &str, access: u32, operation: &'static str) -> Result<ScHandle>
    {
        let wide_name = wide(OsStr::new(name));
        let service = unsafe { OpenServiceW(scm.0, wide_name.as_ptr(), access) };
        if service.is_null() {
            return Err(GateError::ServiceControlFailure {
                operation,
                code: last_error(),
            });
        }
        Ok(ScHandle(service))
    }
}

impl ServiceManager for ScmServiceManager
{
    fn create(&mut self, config: &ServiceConfig) -> Result<bool>
    {
        let scm = self.open_manager(SC_MANAGER_CREATE_SERVICE, "create")?;
        let name = wide(OsStr::new(&config.name));
        let path = wide(config.binary_path.as_os_str());

        let service = unsafe {
            CreateServiceW(
                scm.0,
                name.as_ptr(),
                name.as_ptr(),
                SERVICE_ALL_ACCESS,
                SERVICE_KERNEL_DRIVER,
                SERVICE_DEMAND_START,
                SERVICE_ERROR_NORMAL,
                path.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
            )
        };
        if service.is_null() {
            let code = last_error();
            if code as u32 == ERROR_SERVICE_EXISTS {
                return Ok(false);
            }
            return Err(GateError::ServiceControlFailure { operation: "create", code });
        }
        drop(ScHandle(service));
        Ok(true)
    }

    fn start(&mut self, name: &str) -> Result<bool>
    {
        let scm = self.open_manager(SC_MANAGER_ALL_ACCESS, "start")?;
        let service = self.open_service(&scm, name, SERVICE_ALL_ACCESS, "start")?;

        let started = unsafe { StartServiceW(service.0, 0, ptr::null()) };
        if started == 0 {
            let code = last_error();
            if code as u32 == ERROR_SERVICE_ALREADY_RUNNING {
                return Ok(false);
            }
            return Err(GateError::ServiceControlFailure { operation: "start", code });
        }
        Ok(true)
    }

    fn stop(&mut self, name: &str) -> Result<()>
    {
        let scm = self.open_manager(SC_MANAGER_ALL_ACCESS, "stop")?;
        let service = self.open_service(&scm, name, SERVICE_STOP, "stop")?;

        let mut status: SERVICE_STATUS = unsafe { std::mem::zeroed() };
        let stopped = unsafe { ControlService(service.0, SERVICE_CONTROL_STOP, &mut status) };
        if stopped == 0 {
            return Err(GateError::ServiceControlFailure {
                operation: "stop",
                code: last_error(),
            });
        }
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<()>
    {
        let scm = self.open_manager(SC_MANAGER_ALL_ACCESS, "delete")?;
        let service = self.open_service(&scm, name, DELETE, "delete")?;

        if unsafe { DeleteService(service.0) } == 0 {
            return Err(GateError::ServiceControlFailure {
                operation: "delete",
                code: last_error(),
            });
        }
        Ok(())
    }
}
