//! Device/Capability Layer Interface
//!
//! The operations the router forwards to, one trait per facility.
//!
//! # Design
//! - The router owns no descriptors, sockets or mounts; every resource lives
//!   behind these traits
//! - Arguments arrive fully typed; pointer arguments are the caller's own
//!   pointers, unvalidated (see [`crate::syscall::UserPtr`])
//! - Each fallible operation returns `SysResult`: `Ok` carries the
//!   operation-specific success value, `Err` the error number
//! - Operations a device layer does not provide keep their default body,
//!   which reports `ENOSYS`
//!
//! Identity queries and `exit` have no default: every execution context has
//! an identity and a way to terminate.

pub mod registry;

use core::ffi::{c_int, c_long, c_uint, c_ulong, c_void};

use crate::abi::{
    Dirent, EpollEvent, Fd, FdSet, IoVec, Mode, MsgHdr, Nfds, OpenFlags, Pid, PollFd, SigAction,
    SigSet, SockAddr, SockLen, Stat, TimeVal, Uid, UtsName,
};
use crate::errno::{Errno, SysResult};
use crate::syscall::{UserCStr, UserPtr, UserPtrMut};

pub use registry::{install, installed, RegistryError};

bitflags::bitflags! {
    /// Optional facilities a device layer may advertise.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        /// `epoll_pwait` honors its signal mask.
        const SIGNAL_MASK_WAIT = 1 << 0;
    }
}

/// File descriptor I/O.
#[allow(unused_variables)]
pub trait FileOps {
    /// Open `path`, returning a new descriptor.
    fn open(&self, path: UserCStr, flags: OpenFlags, mode: Mode) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn read(&self, fd: Fd, buf: UserPtrMut<u8>, count: usize) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn write(&self, fd: Fd, buf: UserPtr<u8>, count: usize) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn readv(&self, fd: Fd, iov: UserPtr<IoVec>, iovcnt: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn writev(&self, fd: Fd, iov: UserPtr<IoVec>, iovcnt: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Reposition the file offset, returning the new offset.
    fn lseek(&self, fd: Fd, offset: isize, whence: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn close(&self, fd: Fd) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn dup(&self, fd: Fd) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn dup2(&self, fd: Fd, newfd: Fd) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Device control. The four trailing words are forwarded unexamined.
    fn ioctl(&self, fd: Fd, request: c_ulong, args: [c_long; 4]) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn fcntl(&self, fd: Fd, cmd: c_int, arg: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Filesystem namespace and metadata.
#[allow(unused_variables)]
pub trait FsOps {
    /// Fill `buf` with the status of `path`.
    fn stat(&self, path: UserCStr, buf: &mut Stat) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn link(&self, oldpath: UserCStr, newpath: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn unlink(&self, path: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn rename(&self, oldpath: UserCStr, newpath: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn truncate(&self, path: UserCStr, length: isize) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn mkdir(&self, path: UserCStr, mode: Mode) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn rmdir(&self, path: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn access(&self, path: UserCStr, mode: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Read directory entries, returning the number of bytes produced.
    fn getdents(&self, fd: c_uint, dirp: UserPtrMut<Dirent>, count: c_uint) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Copy the working directory into `buf`.
    fn getcwd(&self, buf: UserPtrMut<u8>, size: usize) -> Result<(), Errno> {
        Err(Errno::ENOSYS)
    }

    fn chdir(&self, path: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Mount table.
#[allow(unused_variables)]
pub trait MountOps {
    fn mount(
        &self,
        source: UserCStr,
        target: UserCStr,
        fstype: UserCStr,
        flags: c_ulong,
        data: UserPtr<c_void>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn umount(&self, target: UserCStr) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Sockets.
#[allow(unused_variables)]
pub trait SocketOps {
    fn socket(&self, domain: c_int, ty: c_int, protocol: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn connect(&self, fd: Fd, addr: UserPtr<SockAddr>, addrlen: SockLen) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn bind(&self, fd: Fd, addr: UserPtr<SockAddr>, addrlen: SockLen) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn listen(&self, fd: Fd, backlog: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Accept a connection. Either address pointer may be null.
    fn accept(&self, fd: Fd, addr: UserPtrMut<SockAddr>, addrlen: UserPtrMut<SockLen>) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn sendto(
        &self,
        fd: Fd,
        buf: UserPtr<u8>,
        len: usize,
        flags: c_int,
        dest: UserPtr<SockAddr>,
        addrlen: SockLen,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn recvfrom(
        &self,
        fd: Fd,
        buf: UserPtrMut<u8>,
        len: usize,
        flags: c_int,
        src: UserPtrMut<SockAddr>,
        addrlen: UserPtrMut<SockLen>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn sendmsg(&self, fd: Fd, msg: UserPtr<MsgHdr>, flags: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn recvmsg(&self, fd: Fd, msg: UserPtrMut<MsgHdr>, flags: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Create a connected pair, storing both descriptors in `sv`.
    fn socketpair(
        &self,
        domain: c_int,
        ty: c_int,
        protocol: c_int,
        sv: UserPtrMut<[Fd; 2]>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn shutdown(&self, fd: Fd, how: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn setsockopt(
        &self,
        fd: Fd,
        level: c_int,
        optname: c_int,
        optval: UserPtr<c_void>,
        optlen: SockLen,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn getsockopt(
        &self,
        fd: Fd,
        level: c_int,
        optname: c_int,
        optval: UserPtrMut<c_void>,
        optlen: UserPtrMut<SockLen>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn getpeername(
        &self,
        fd: Fd,
        addr: UserPtrMut<SockAddr>,
        addrlen: UserPtrMut<SockLen>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn getsockname(
        &self,
        fd: Fd,
        addr: UserPtrMut<SockAddr>,
        addrlen: UserPtrMut<SockLen>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Readiness polling and event descriptors.
///
/// `select`, `poll`, `epoll_wait` and `epoll_pwait` may block the calling
/// context; the router does not manage or cancel that.
#[allow(unused_variables)]
pub trait PollOps {
    fn select(
        &self,
        nfds: c_int,
        readfds: UserPtrMut<FdSet>,
        writefds: UserPtrMut<FdSet>,
        exceptfds: UserPtrMut<FdSet>,
        timeout: UserPtrMut<TimeVal>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn poll(&self, fds: UserPtrMut<PollFd>, nfds: Nfds, timeout: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn epoll_create(&self, size: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn epoll_create1(&self, flags: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn epoll_wait(
        &self,
        epfd: Fd,
        events: UserPtrMut<EpollEvent>,
        maxevents: c_int,
        timeout: c_int,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    /// Only called when the device advertises
    /// [`Capabilities::SIGNAL_MASK_WAIT`].
    fn epoll_pwait(
        &self,
        epfd: Fd,
        events: UserPtrMut<EpollEvent>,
        maxevents: c_int,
        timeout: c_int,
        sigmask: UserPtr<SigSet>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn epoll_ctl(&self, epfd: Fd, op: c_int, fd: Fd, event: UserPtrMut<EpollEvent>) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn eventfd(&self, initval: c_uint, flags: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Process identity and termination.
pub trait ProcessOps {
    fn getpid(&self) -> Pid;

    fn getppid(&self) -> Pid;

    fn getuid(&self) -> Uid;

    fn geteuid(&self) -> Uid;

    fn getpgrp(&self) -> Pid;

    /// Terminate the calling context. Never returns.
    fn exit(&self, status: c_int) -> !;

    /// Fill in the host/system name.
    #[allow(unused_variables)]
    fn uname(&self, buf: UserPtrMut<UtsName>) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// Signals.
#[allow(unused_variables)]
pub trait SignalOps {
    /// Install and/or query the handler for `signum`. Either pointer may be
    /// null.
    fn sigaction(
        &self,
        signum: c_int,
        act: UserPtr<SigAction>,
        oact: UserPtrMut<SigAction>,
    ) -> SysResult {
        Err(Errno::ENOSYS)
    }

    fn kill(&self, pid: Pid, signum: c_int) -> SysResult {
        Err(Errno::ENOSYS)
    }
}

/// A complete device layer: every facility plus capability negotiation.
///
/// One device is shared by all execution contexts, hence `Sync`.
pub trait Device: FileOps + FsOps + MountOps + SocketOps + PollOps + ProcessOps + SignalOps + Sync {
    /// Optional facilities this device provides.
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}
