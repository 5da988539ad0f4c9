//! Per-Context Error State
//!
//! Each execution context (thread, task) owns one `TaskContext`. The error
//! number of its last call lives in that value, not in shared state, so two
//! contexts dispatching concurrently cannot see each other's errors.

use crate::device::{self, Device, RegistryError};
use crate::errno::{Errno, SysResult};

use super::args::SyscallArgs;
use super::handler;

/// Value returned to the caller on failure.
pub const SYSCALL_FAILED: isize = -1;

/// Outcome of one dispatch: the return value and the error number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallReturn {
    /// Operation-specific success data, or `SYSCALL_FAILED`.
    pub value: isize,
    /// `Errno::NONE` on success.
    pub errno: Errno,
}

impl SyscallReturn {
    /// A successful outcome.
    #[inline]
    pub const fn success(value: isize) -> Self {
        Self {
            value,
            errno: Errno::NONE,
        }
    }

    /// A failed outcome.
    #[inline]
    pub const fn failure(errno: Errno) -> Self {
        Self {
            value: SYSCALL_FAILED,
            errno,
        }
    }

    /// Convert a device result.
    #[inline]
    pub const fn from_result(result: SysResult) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(errno) => Self::failure(errno),
        }
    }

    /// Check if the call failed.
    #[inline]
    pub const fn is_err(&self) -> bool {
        self.value == SYSCALL_FAILED && !self.errno.is_none()
    }

    /// Convert back into a `Result`.
    #[inline]
    pub const fn into_result(self) -> SysResult {
        if self.is_err() {
            Err(self.errno)
        } else {
            Ok(self.value)
        }
    }

    /// Encode in the raw kernel convention: `-errno` on failure.
    ///
    /// Entry trampolines that return straight into a libc syscall stub use
    /// this instead of the `-1` + errno pair.
    #[inline]
    pub const fn to_raw_kernel(self) -> isize {
        if self.is_err() {
            -(self.errno.raw() as isize)
        } else {
            self.value
        }
    }
}

/// One execution context's view of the router.
pub struct TaskContext<'d> {
    device: &'d dyn Device,
    errno: Errno,
}

impl<'d> TaskContext<'d> {
    /// Create a context over an explicit device layer.
    pub fn new(device: &'d dyn Device) -> Self {
        Self {
            device,
            errno: Errno::NONE,
        }
    }

    /// The device layer this context dispatches to.
    #[inline]
    pub fn device(&self) -> &'d dyn Device {
        self.device
    }

    /// Error number left by the most recent call on this context.
    #[inline]
    pub fn errno(&self) -> Errno {
        self.errno
    }

    /// Dispatch a call and return its value; the error number is kept in
    /// this context for [`errno`](Self::errno).
    pub fn syscall(&mut self, number: usize, args: SyscallArgs) -> isize {
        self.syscall_full(number, args).value
    }

    /// Dispatch a call and return the full outcome.
    pub fn syscall_full(&mut self, number: usize, args: SyscallArgs) -> SyscallReturn {
        self.errno = Errno::NONE;
        let ret = handler::dispatch(self.device, number, args);
        self.errno = ret.errno;
        ret
    }
}

impl TaskContext<'static> {
    /// Create a context over the installed device layer.
    pub fn with_installed() -> Result<Self, RegistryError> {
        device::installed()
            .map(Self::new)
            .ok_or(RegistryError::NotInstalled)
    }
}

impl core::fmt::Debug for TaskContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskContext")
            .field("errno", &self.errno)
            .finish_non_exhaustive()
    }
}
