//! Error Numbers
//!
//! POSIX error codes carried on the error-state channel.
//!
//! # Design
//! - `Errno` is a newtype over the raw C `int` so that device layers may
//!   report any code, including ones this crate has no constant for
//! - `Errno::NONE` (0) is the "no error" value written before every dispatch
//! - Values follow the Linux numbering used by the enclave libc

use core::fmt;

/// An error number as seen by the caller after a syscall.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Errno(i32);

impl Errno {
    /// No error.
    pub const NONE: Self = Self(0);

    /// Operation not permitted.
    pub const EPERM: Self = Self(1);

    /// No such file or directory.
    pub const ENOENT: Self = Self(2);

    /// No such process.
    pub const ESRCH: Self = Self(3);

    /// Interrupted system call.
    pub const EINTR: Self = Self(4);

    /// I/O error.
    pub const EIO: Self = Self(5);

    /// Bad file descriptor.
    pub const EBADF: Self = Self(9);

    /// Resource temporarily unavailable.
    pub const EAGAIN: Self = Self(11);

    /// Out of memory.
    pub const ENOMEM: Self = Self(12);

    /// Permission denied.
    pub const EACCES: Self = Self(13);

    /// Bad address.
    pub const EFAULT: Self = Self(14);

    /// Device or resource busy.
    pub const EBUSY: Self = Self(16);

    /// File exists.
    pub const EEXIST: Self = Self(17);

    /// Not a directory.
    pub const ENOTDIR: Self = Self(20);

    /// Is a directory.
    pub const EISDIR: Self = Self(21);

    /// Invalid argument.
    pub const EINVAL: Self = Self(22);

    /// Too many open files.
    pub const EMFILE: Self = Self(24);

    /// Inappropriate ioctl for device.
    pub const ENOTTY: Self = Self(25);

    /// No space left on device.
    pub const ENOSPC: Self = Self(28);

    /// Illegal seek.
    pub const ESPIPE: Self = Self(29);

    /// Read-only file system.
    pub const EROFS: Self = Self(30);

    /// Result too large.
    pub const ERANGE: Self = Self(34);

    /// Function not implemented.
    pub const ENOSYS: Self = Self(38);

    /// Directory not empty.
    pub const ENOTEMPTY: Self = Self(39);

    /// Socket operation on non-socket.
    pub const ENOTSOCK: Self = Self(88);

    /// Operation not supported.
    pub const EOPNOTSUPP: Self = Self(95);

    /// Address already in use.
    pub const EADDRINUSE: Self = Self(98);

    /// Connection reset by peer.
    pub const ECONNRESET: Self = Self(104);

    /// Transport endpoint is not connected.
    pub const ENOTCONN: Self = Self(107);

    /// Connection timed out.
    pub const ETIMEDOUT: Self = Self(110);

    /// Connection refused.
    pub const ECONNREFUSED: Self = Self(111);

    /// Create an error number from its raw value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Check if this is the "no error" value.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Short symbolic name, if this crate knows the code.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "ENONE",
            1 => "EPERM",
            2 => "ENOENT",
            3 => "ESRCH",
            4 => "EINTR",
            5 => "EIO",
            9 => "EBADF",
            11 => "EAGAIN",
            12 => "ENOMEM",
            13 => "EACCES",
            14 => "EFAULT",
            16 => "EBUSY",
            17 => "EEXIST",
            20 => "ENOTDIR",
            21 => "EISDIR",
            22 => "EINVAL",
            24 => "EMFILE",
            25 => "ENOTTY",
            28 => "ENOSPC",
            29 => "ESPIPE",
            30 => "EROFS",
            34 => "ERANGE",
            38 => "ENOSYS",
            39 => "ENOTEMPTY",
            88 => "ENOTSOCK",
            95 => "EOPNOTSUPP",
            98 => "EADDRINUSE",
            104 => "ECONNRESET",
            107 => "ENOTCONN",
            110 => "ETIMEDOUT",
            111 => "ECONNREFUSED",
            _ => return None,
        })
    }
}

impl Default for Errno {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "errno {}", self.0),
        }
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Errno({}, {})", self.0, self)
    }
}

/// Outcome of a device operation: success data or an error number.
pub type SysResult = Result<isize, Errno>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert!(Errno::default().is_none());
        assert!(!Errno::ENOENT.is_none());
    }

    #[test]
    fn test_display_known_and_unknown() {
        assert_eq!(format!("{}", Errno::ENOSYS), "ENOSYS");
        assert_eq!(format!("{}", Errno::from_raw(4242)), "errno 4242");
    }

    #[test]
    fn test_raw_roundtrip_of_constant() {
        assert_eq!(Errno::from_raw(Errno::EACCES.raw()), Errno::EACCES);
        assert_eq!(Errno::ENOSYS.raw(), 38);
    }
}
