//! PantherOS Syscall Router
//!
//! The in-enclave dispatch layer that sits between a libc-style syscall stub
//! and the enclave's device layer.
//!
//! # Overview
//! - [`syscall`]: operation codes, the argument bundle, the operation table
//!   and per-context error state
//! - [`device`]: the traits a device layer implements, plus the process-wide
//!   registry
//! - [`abi`]: C-layout structures and flag sets shared with callers
//! - [`errno`]: error numbers
//!
//! # Example
//! ```ignore
//! use sysroute::syscall::{Sysno, TaskContext};
//!
//! sysroute::device::install(&MY_DEVICE)?;
//! let mut ctx = TaskContext::with_installed()?;
//! let fd = sysroute::syscall!(ctx, Sysno::Open, c"/tmp/x", 0i32, 0u32);
//! if fd < 0 {
//!     log::warn!("open failed: {}", ctx.errno());
//! }
//! ```
//!
//! # Logging
//! All messages go through the `log` facade with a `[SYSCALL]` prefix; the
//! host installs whatever logger it has.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod abi;
pub mod device;
pub mod errno;
pub mod syscall;

pub use device::{Capabilities, Device};
pub use errno::{Errno, SysResult};
pub use syscall::{dispatch, SyscallArgs, SyscallReturn, Sysno, TaskContext, Word};
