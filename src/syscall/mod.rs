//! System Call Interface
//!
//! Routes Linux-style system calls issued inside an enclave to the device
//! layer that actually performs them.
//!
//! # Flow
//! 1. The caller hands over an operation code and six argument words
//! 2. [`dispatch`] looks the code up in the operation table
//! 3. The handler reinterprets the words and makes one device call
//! 4. The outcome comes back as a [`SyscallReturn`]; [`TaskContext`] keeps
//!    the error number for the calling context
//!
//! # Trust Model
//! - Caller and router share one trust domain
//! - Pointer arguments are forwarded, never validated ([`UserPtr`])
//! - Unknown codes return ENOSYS, never panic

mod args;
mod context;
mod handler;
mod numbers;
mod user;

pub use args::{SyscallArgs, Word, SYSCALL_ARG_COUNT};
pub use context::{SyscallReturn, TaskContext, SYSCALL_FAILED};
pub use handler::{dispatch, handler_for, Handler};
pub use numbers::Sysno;
pub use user::{UserCStr, UserPtr, UserPtrMut};
