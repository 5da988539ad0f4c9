//! Enclave C ABI Types
//!
//! Structures and flag sets whose addresses travel through syscall words.
//!
//! # Layout
//! All structures are `#[repr(C)]` with the Linux x86_64 layout that the
//! enclave libc was built against. The router never reads their fields; it
//! only forms typed pointers to them. Device layers read and write them.

use core::ffi::{c_int, c_long, c_short, c_ulong, c_void};

/// File descriptor.
pub type Fd = c_int;

/// File mode bits (`mode_t`).
pub type Mode = u32;

/// Socket address length (`socklen_t`).
pub type SockLen = u32;

/// Number of poll descriptors (`nfds_t`).
pub type Nfds = c_ulong;

/// Process identifier.
pub type Pid = c_int;

/// User identifier.
pub type Uid = u32;

bitflags::bitflags! {
    /// Flags accepted by `open`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: c_int {
        /// Open for reading only.
        const O_RDONLY = 0;
        /// Open for writing only.
        const O_WRONLY = 0o1;
        /// Open for reading and writing.
        const O_RDWR = 0o2;
        /// Create the file if it does not exist.
        const O_CREAT = 0o100;
        /// Fail if the file exists (with `O_CREAT`).
        const O_EXCL = 0o200;
        /// Do not become the controlling terminal.
        const O_NOCTTY = 0o400;
        /// Truncate to zero length.
        const O_TRUNC = 0o1000;
        /// Writes append.
        const O_APPEND = 0o2000;
        /// Non-blocking I/O.
        const O_NONBLOCK = 0o4000;
        /// Fail if not a directory.
        const O_DIRECTORY = 0o200000;
        /// Close on exec.
        const O_CLOEXEC = 0o2000000;
        /// <https://docs.rs/bitflags/*/bitflags/#externally-defined-flags>
        const _ = !0;
    }
}

impl OpenFlags {
    /// The flag combination `creat(2)` is defined in terms of.
    pub const CREAT_COMPAT: Self = Self::O_CREAT.union(Self::O_WRONLY).union(Self::O_TRUNC);
}

/// File status (`struct stat`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub st_dev: u64,
    pub st_ino: u64,
    pub st_nlink: u64,
    pub st_mode: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    pub __pad0: u32,
    pub st_rdev: u64,
    pub st_size: i64,
    pub st_blksize: i64,
    pub st_blocks: i64,
    pub st_atime: i64,
    pub st_atime_nsec: i64,
    pub st_mtime: i64,
    pub st_mtime_nsec: i64,
    pub st_ctime: i64,
    pub st_ctime_nsec: i64,
    pub __unused: [i64; 3],
}

/// Scatter/gather element (`struct iovec`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IoVec {
    pub iov_base: *mut c_void,
    pub iov_len: usize,
}

/// Generic socket address (`struct sockaddr`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SockAddr {
    pub sa_family: u16,
    pub sa_data: [u8; 14],
}

/// Message header for `sendmsg`/`recvmsg` (`struct msghdr`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsgHdr {
    pub msg_name: *mut c_void,
    pub msg_namelen: SockLen,
    pub msg_iov: *mut IoVec,
    pub msg_iovlen: usize,
    pub msg_control: *mut c_void,
    pub msg_controllen: usize,
    pub msg_flags: c_int,
}

/// Descriptor set for `select` (1024 bits).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FdSet {
    pub fds_bits: [u64; 16],
}

/// Time interval (`struct timeval`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimeVal {
    pub tv_sec: c_long,
    pub tv_usec: c_long,
}

/// Poll descriptor (`struct pollfd`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollFd {
    pub fd: Fd,
    pub events: c_short,
    pub revents: c_short,
}

/// Epoll event (`struct epoll_event`), packed on x86_64.
#[repr(C, packed)]
#[derive(Debug, Default, Clone, Copy)]
pub struct EpollEvent {
    pub events: u32,
    pub data: u64,
}

/// Directory entry as produced by `getdents`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Dirent {
    pub d_ino: u64,
    pub d_off: i64,
    pub d_reclen: u16,
    pub d_type: u8,
    pub d_name: [u8; 256],
}

/// System identification (`struct utsname`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UtsName {
    pub sysname: [u8; 65],
    pub nodename: [u8; 65],
    pub release: [u8; 65],
    pub version: [u8; 65],
    pub machine: [u8; 65],
    pub domainname: [u8; 65],
}

/// Signal set (`sigset_t`, 1024 bits as in the enclave libc).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SigSet {
    pub bits: [u64; 16],
}

/// Signal disposition (`struct sigaction`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SigAction {
    pub sa_handler: usize,
    pub sa_flags: c_ulong,
    pub sa_restorer: usize,
    pub sa_mask: SigSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn test_creat_compat_flags() {
        let flags = OpenFlags::CREAT_COMPAT;
        assert!(flags.contains(OpenFlags::O_CREAT));
        assert!(flags.contains(OpenFlags::O_WRONLY));
        assert!(flags.contains(OpenFlags::O_TRUNC));
        assert_eq!(flags.bits(), 0o1101);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_x86_64_layouts() {
        assert_eq!(size_of::<Stat>(), 144);
        assert_eq!(size_of::<EpollEvent>(), 12);
        assert_eq!(size_of::<PollFd>(), 8);
        assert_eq!(size_of::<SockAddr>(), 16);
        assert_eq!(size_of::<UtsName>(), 390);
    }
}
