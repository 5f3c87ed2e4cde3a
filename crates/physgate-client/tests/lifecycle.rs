//! Tests for component lifecycle: install/remove idempotence and channel availability

use physgate_client::lifecycle::{install, remove, ServiceConfig, ServiceManager, ERROR_SERVICE_DOES_NOT_EXIST};
use physgate_client::SimServiceManager;
use physgate_core::error::GateError;
use physgate_core::platform::sim::{SimIoSpace, SimRanges};
use physgate_core::Gatekeeper;

fn config() -> ServiceConfig
{
    ServiceConfig::new("physgate", "C:/drivers/physgate.sys")
}

fn gatekeeper() -> Gatekeeper
{
    Gatekeeper::new(&SimRanges::empty(), Box::new(SimIoSpace::new(0x1000)))
}

#[test]
fn test_install_registers_and_starts()
{
    let mut manager = SimServiceManager::new();
    install(&mut manager, &config()).unwrap();
    assert!(manager.is_registered("physgate"));
    assert!(manager.is_running("physgate"));
}

#[test]
fn test_install_is_idempotent()
{
    let mut manager = SimServiceManager::new();
    install(&mut manager, &config()).unwrap();
    // Already registered and already running both converge to success
    install(&mut manager, &config()).unwrap();
    install(&mut manager, &config()).unwrap();
    assert!(manager.is_running("physgate"));
}

#[test]
fn test_install_over_registered_but_stopped_component()
{
    let mut manager = SimServiceManager::new();
    manager.create(&config()).unwrap();
    assert!(!manager.is_running("physgate"));

    install(&mut manager, &config()).unwrap();
    assert!(manager.is_running("physgate"));
}

#[test]
fn test_remove_stops_and_unregisters()
{
    let mut manager = SimServiceManager::new();
    install(&mut manager, &config()).unwrap();

    remove(&mut manager, "physgate").unwrap();
    assert!(!manager.is_registered("physgate"));
}

#[test]
fn test_remove_missing_component_surfaces_not_found()
{
    let mut manager = SimServiceManager::new();
    let err = remove(&mut manager, "physgate").unwrap_err();
    match err {
        GateError::ServiceControlFailure { operation, code } => {
            assert_eq!(operation, "delete");
            assert_eq!(code, ERROR_SERVICE_DOES_NOT_EXIST);
        }
        other => panic!("Expected ServiceControlFailure, got {other:?}"),
    }
}

#[test]
fn test_remove_twice_surfaces_not_found_the_second_time()
{
    let mut manager = SimServiceManager::new();
    install(&mut manager, &config()).unwrap();
    remove(&mut manager, "physgate").unwrap();
    assert!(matches!(
        remove(&mut manager, "physgate"),
        Err(GateError::ServiceControlFailure { .. })
    ));
}

#[test]
fn test_start_missing_component_fails()
{
    let mut manager = SimServiceManager::new();
    let err = manager.start("physgate").unwrap_err();
    assert!(matches!(
        err,
        GateError::ServiceControlFailure {
            operation: "start",
            code: ERROR_SERVICE_DOES_NOT_EXIST,
        }
    ));
}

#[test]
fn test_open_channel_when_component_absent()
{
    let manager = SimServiceManager::new();
    let err = manager.open_channel("physgate", gatekeeper()).unwrap_err();
    match err {
        GateError::ChannelUnavailable(detail) => assert!(detail.contains("physgate")),
        other => panic!("Expected ChannelUnavailable, got {other:?}"),
    }
}

#[test]
fn test_open_channel_when_registered_but_stopped()
{
    let mut manager = SimServiceManager::new();
    manager.create(&config()).unwrap();
    assert!(matches!(
        manager.open_channel("physgate", gatekeeper()),
        Err(GateError::ChannelUnavailable(_))
    ));
}

#[test]
fn test_open_channel_after_install()
{
    let mut manager = SimServiceManager::new();
    install(&mut manager, &config()).unwrap();
    assert!(manager.open_channel("physgate", gatekeeper()).is_ok());
}

#[test]
fn test_service_control_failure_display_carries_code()
{
    let err = GateError::ServiceControlFailure {
        operation: "delete",
        code: ERROR_SERVICE_DOES_NOT_EXIST,
    };
    let message = format!("{err}");
    assert!(message.contains("delete"));
    assert!(message.contains("1060"));
}
