//! Device Registry
//!
//! Holds the process-wide device layer that execution contexts dispatch to.
//!
//! # Design
//! - Installed once, during enclave initialization
//! - Read lock-free afterwards (`spin::Once`)
//! - Contexts may also be built over an explicit device, bypassing this

use core::fmt;

use spin::Once;

use super::Device;

/// The installed device layer.
static DEVICE: Once<&'static dyn Device> = Once::new();

/// Error type for registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A device layer is already installed.
    AlreadyInstalled,
    /// No device layer has been installed yet.
    NotInstalled,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => write!(f, "device layer already installed"),
            Self::NotInstalled => write!(f, "no device layer installed"),
        }
    }
}

/// Install the process-wide device layer.
///
/// The first call wins; later calls leave it in place and fail.
pub fn install(device: &'static dyn Device) -> Result<(), RegistryError> {
    let mut fresh = false;
    DEVICE.call_once(|| {
        fresh = true;
        device
    });

    if fresh {
        log::info!("[SYSCALL] Device layer installed ({:?})", device.capabilities());
        Ok(())
    } else {
        log::warn!("[SYSCALL] Device layer already installed, ignoring");
        Err(RegistryError::AlreadyInstalled)
    }
}

/// Get the installed device layer, if any.
#[inline]
pub fn installed() -> Option<&'static dyn Device> {
    DEVICE.get().copied()
}
