//! System Call Handler
//!
//! Maps operation codes to handlers and implements the routing policy.
//!
//! # Reinterpretation
//! Every handler turns its argument words into typed values at the top of
//! its body, once, with the `Word::as_*` casts, and then makes exactly one
//! device call. Words the operation does not use are never touched.
//!
//! # Policy
//! - Unknown codes return ENOSYS without reaching the device
//! - `creat` is `open(O_CREAT | O_WRONLY | O_TRUNC)`; an ENOENT failure is
//!   reported as ENOSYS so the caller retries through its other path
//! - `getdents64`, `eventfd2`, `epoll_wait_old` and `epoll_ctl_old` share
//!   the handler of their canonical code
//! - `epoll_pwait` degrades to `epoll_wait` when the device cannot honor a
//!   signal mask
//! - `umount2` drops its flags
//! - `exit` never returns; `exit_group` succeeds without a device call

use core::ffi::c_void;

use crate::abi::{
    Dirent, EpollEvent, FdSet, IoVec, MsgHdr, OpenFlags, PollFd, SigAction, SigSet, SockAddr,
    SockLen, Stat, TimeVal, UtsName,
};
use crate::device::{Capabilities, Device};
use crate::errno::{Errno, SysResult};

use super::args::SyscallArgs;
use super::context::SyscallReturn;
use super::numbers::Sysno;

/// A handler: reinterprets the words and performs one device call.
pub type Handler = fn(&dyn Device, &SyscallArgs) -> SysResult;

/// Dispatch a system call
///
/// # Arguments
/// * `device` - Device layer the call is forwarded to
/// * `number` - Raw operation code
/// * `args` - The six argument words
///
/// # Returns
/// The return value and error number for the caller's error-state channel.
/// For `exit` this function does not return.
pub fn dispatch(device: &dyn Device, number: usize, args: SyscallArgs) -> SyscallReturn {
    let Some(sysno) = Sysno::from_raw(number) else {
        log::warn!("[SYSCALL] Unknown syscall: {}", number);
        return SyscallReturn::failure(Errno::ENOSYS);
    };

    log::trace!("[SYSCALL] {}({:?})", sysno, args);
    let ret = SyscallReturn::from_result(handler_for(sysno)(device, &args));
    log::trace!("[SYSCALL] {} -> {} ({})", sysno, ret.value, ret.errno);
    ret
}

/// The operation table.
///
/// Aliased codes map to the same handler as their canonical code.
pub fn handler_for(sysno: Sysno) -> Handler {
    match sysno {
        // File I/O
        Sysno::Open => sys_open,
        Sysno::Creat => sys_creat,
        Sysno::Read => sys_read,
        Sysno::Write => sys_write,
        Sysno::Readv => sys_readv,
        Sysno::Writev => sys_writev,
        Sysno::Lseek => sys_lseek,
        Sysno::Close => sys_close,
        Sysno::Dup => sys_dup,
        Sysno::Dup2 => sys_dup2,
        Sysno::Ioctl => sys_ioctl,
        Sysno::Fcntl => sys_fcntl,

        // Filesystem namespace
        Sysno::Stat => sys_stat,
        Sysno::Link => sys_link,
        Sysno::Unlink => sys_unlink,
        Sysno::Rename => sys_rename,
        Sysno::Truncate => sys_truncate,
        Sysno::Mkdir => sys_mkdir,
        Sysno::Rmdir => sys_rmdir,
        Sysno::Access => sys_access,
        Sysno::Getdents | Sysno::Getdents64 => sys_getdents,
        Sysno::Getcwd => sys_getcwd,
        Sysno::Chdir => sys_chdir,
        Sysno::Mount => sys_mount,
        Sysno::Umount2 => sys_umount2,

        // Sockets
        Sysno::Socket => sys_socket,
        Sysno::Connect => sys_connect,
        Sysno::Bind => sys_bind,
        Sysno::Listen => sys_listen,
        Sysno::Accept => sys_accept,
        Sysno::Sendto => sys_sendto,
        Sysno::Recvfrom => sys_recvfrom,
        Sysno::Sendmsg => sys_sendmsg,
        Sysno::Recvmsg => sys_recvmsg,
        Sysno::Socketpair => sys_socketpair,
        Sysno::Shutdown => sys_shutdown,
        Sysno::Setsockopt => sys_setsockopt,
        Sysno::Getsockopt => sys_getsockopt,
        Sysno::Getpeername => sys_getpeername,
        Sysno::Getsockname => sys_getsockname,

        // Polling and events
        Sysno::Select => sys_select,
        Sysno::Poll => sys_poll,
        Sysno::EpollCreate => sys_epoll_create,
        Sysno::EpollCreate1 => sys_epoll_create1,
        Sysno::EpollWait | Sysno::EpollWaitOld => sys_epoll_wait,
        Sysno::EpollPwait => sys_epoll_pwait,
        Sysno::EpollCtl | Sysno::EpollCtlOld => sys_epoll_ctl,
        Sysno::Eventfd | Sysno::Eventfd2 => sys_eventfd,

        // Process and identity
        Sysno::Exit => sys_exit,
        Sysno::ExitGroup => sys_exit_group,
        Sysno::Getpid => sys_getpid,
        Sysno::Getppid => sys_getppid,
        Sysno::Getuid => sys_getuid,
        Sysno::Geteuid => sys_geteuid,
        Sysno::Getpgrp => sys_getpgrp,
        Sysno::Uname => sys_uname,

        // Signals
        Sysno::RtSigaction => sys_rt_sigaction,
        Sysno::Kill => sys_kill,
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn sys_open(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let flags = OpenFlags::from_bits_retain(args[1].as_int());
    let mode = args[2].as_u32();

    device.open(path, flags, mode)
}

/// `creat(path, mode)`
///
/// A missing path component is not a definitive answer for the enclave: the
/// file may exist on the host side. ENOENT is therefore turned into ENOSYS,
/// which tells the caller to route the call elsewhere.
fn sys_creat(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let mode = args[1].as_u32();

    match device.open(path, OpenFlags::CREAT_COMPAT, mode) {
        Err(Errno::ENOENT) => {
            log::debug!("[SYSCALL] creat: ENOENT, deferring to caller (ENOSYS)");
            Err(Errno::ENOSYS)
        }
        other => other,
    }
}

fn sys_read(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let buf = args[1].as_mut_ptr::<u8>();
    let count = args[2].as_usize();

    device.read(fd, buf, count)
}

fn sys_write(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let buf = args[1].as_ptr::<u8>();
    let count = args[2].as_usize();

    device.write(fd, buf, count)
}

fn sys_readv(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let iov = args[1].as_ptr::<IoVec>();
    let iovcnt = args[2].as_int();

    device.readv(fd, iov, iovcnt)
}

fn sys_writev(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let iov = args[1].as_ptr::<IoVec>();
    let iovcnt = args[2].as_int();

    device.writev(fd, iov, iovcnt)
}

fn sys_lseek(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let offset = args[1].as_isize();
    let whence = args[2].as_int();

    device.lseek(fd, offset, whence)
}

fn sys_close(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.close(args[0].as_int())
}

fn sys_dup(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.dup(args[0].as_int())
}

fn sys_dup2(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let newfd = args[1].as_int();

    device.dup2(fd, newfd)
}

fn sys_ioctl(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let request = args[1].as_ulong();
    let extra = [
        args[2].as_long(),
        args[3].as_long(),
        args[4].as_long(),
        args[5].as_long(),
    ];

    device.ioctl(fd, request, extra)
}

fn sys_fcntl(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let cmd = args[1].as_int();
    let arg = args[2].as_int();

    device.fcntl(fd, cmd, arg)
}

// ---------------------------------------------------------------------------
// Filesystem namespace
// ---------------------------------------------------------------------------

/// `stat(path, buf)`
///
/// The device fills a local `Stat`; the caller's buffer is written only
/// after the device reports success.
fn sys_stat(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let out = args[1].as_mut_ptr::<Stat>();

    let mut buf = Stat::default();
    let ret = device.stat(path, &mut buf)?;

    // SAFETY: The caller passed `out` as its `struct stat` buffer. Caller
    // and router share a trust domain, so the pointer is writable.
    unsafe {
        out.write(buf);
    }

    Ok(ret)
}

fn sys_link(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let oldpath = args[0].as_cstr();
    let newpath = args[1].as_cstr();

    device.link(oldpath, newpath)
}

fn sys_unlink(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.unlink(args[0].as_cstr())
}

fn sys_rename(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let oldpath = args[0].as_cstr();
    let newpath = args[1].as_cstr();

    device.rename(oldpath, newpath)
}

fn sys_truncate(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let length = args[1].as_isize();

    device.truncate(path, length)
}

fn sys_mkdir(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let mode = args[1].as_u32();

    device.mkdir(path, mode)
}

fn sys_rmdir(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.rmdir(args[0].as_cstr())
}

fn sys_access(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let path = args[0].as_cstr();
    let mode = args[1].as_int();

    device.access(path, mode)
}

fn sys_getdents(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_uint();
    let dirp = args[1].as_mut_ptr::<Dirent>();
    let count = args[2].as_uint();

    device.getdents(fd, dirp, count)
}

/// `getcwd(buf, size)` returns `size` on success, not the buffer address.
fn sys_getcwd(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let buf = args[0].as_mut_ptr::<u8>();
    let size = args[1].as_usize();

    device.getcwd(buf, size)?;
    Ok(size as isize)
}

fn sys_chdir(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.chdir(args[0].as_cstr())
}

fn sys_mount(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let source = args[0].as_cstr();
    let target = args[1].as_cstr();
    let fstype = args[2].as_cstr();
    let flags = args[3].as_ulong();
    let data = args[4].as_ptr::<c_void>();

    device.mount(source, target, fstype, flags, data)
}

/// `umount2(target, flags)`: the flags word is not read.
fn sys_umount2(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.umount(args[0].as_cstr())
}

// ---------------------------------------------------------------------------
// Sockets
// ---------------------------------------------------------------------------

fn sys_socket(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let domain = args[0].as_int();
    let ty = args[1].as_int();
    let protocol = args[2].as_int();

    device.socket(domain, ty, protocol)
}

fn sys_connect(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let addr = args[1].as_ptr::<SockAddr>();
    let addrlen = args[2].as_u32();

    device.connect(fd, addr, addrlen)
}

fn sys_bind(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let addr = args[1].as_ptr::<SockAddr>();
    let addrlen = args[2].as_u32();

    device.bind(fd, addr, addrlen)
}

fn sys_listen(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let backlog = args[1].as_int();

    device.listen(fd, backlog)
}

fn sys_accept(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let addr = args[1].as_mut_ptr::<SockAddr>();
    let addrlen = args[2].as_mut_ptr::<SockLen>();

    device.accept(fd, addr, addrlen)
}

fn sys_sendto(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let buf = args[1].as_ptr::<u8>();
    let len = args[2].as_usize();
    let flags = args[3].as_int();
    let dest = args[4].as_ptr::<SockAddr>();
    let addrlen = args[5].as_u32();

    device.sendto(fd, buf, len, flags, dest, addrlen)
}

fn sys_recvfrom(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let buf = args[1].as_mut_ptr::<u8>();
    let len = args[2].as_usize();
    let flags = args[3].as_int();
    let src = args[4].as_mut_ptr::<SockAddr>();
    let addrlen = args[5].as_mut_ptr::<SockLen>();

    device.recvfrom(fd, buf, len, flags, src, addrlen)
}

fn sys_sendmsg(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let msg = args[1].as_ptr::<MsgHdr>();
    let flags = args[2].as_int();

    device.sendmsg(fd, msg, flags)
}

fn sys_recvmsg(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let msg = args[1].as_mut_ptr::<MsgHdr>();
    let flags = args[2].as_int();

    device.recvmsg(fd, msg, flags)
}

fn sys_socketpair(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let domain = args[0].as_int();
    let ty = args[1].as_int();
    let protocol = args[2].as_int();
    let sv = args[3].as_mut_ptr::<[i32; 2]>();

    device.socketpair(domain, ty, protocol, sv)
}

fn sys_shutdown(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let how = args[1].as_int();

    device.shutdown(fd, how)
}

fn sys_setsockopt(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let level = args[1].as_int();
    let optname = args[2].as_int();
    let optval = args[3].as_ptr::<c_void>();
    let optlen = args[4].as_u32();

    device.setsockopt(fd, level, optname, optval, optlen)
}

fn sys_getsockopt(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let level = args[1].as_int();
    let optname = args[2].as_int();
    let optval = args[3].as_mut_ptr::<c_void>();
    let optlen = args[4].as_mut_ptr::<SockLen>();

    device.getsockopt(fd, level, optname, optval, optlen)
}

fn sys_getpeername(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let addr = args[1].as_mut_ptr::<SockAddr>();
    let addrlen = args[2].as_mut_ptr::<SockLen>();

    device.getpeername(fd, addr, addrlen)
}

fn sys_getsockname(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fd = args[0].as_int();
    let addr = args[1].as_mut_ptr::<SockAddr>();
    let addrlen = args[2].as_mut_ptr::<SockLen>();

    device.getsockname(fd, addr, addrlen)
}

// ---------------------------------------------------------------------------
// Polling and events
// ---------------------------------------------------------------------------

fn sys_select(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let nfds = args[0].as_int();
    let readfds = args[1].as_mut_ptr::<FdSet>();
    let writefds = args[2].as_mut_ptr::<FdSet>();
    let exceptfds = args[3].as_mut_ptr::<FdSet>();
    let timeout = args[4].as_mut_ptr::<TimeVal>();

    device.select(nfds, readfds, writefds, exceptfds, timeout)
}

fn sys_poll(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let fds = args[0].as_mut_ptr::<PollFd>();
    let nfds = args[1].as_ulong();
    let timeout = args[2].as_int();

    device.poll(fds, nfds, timeout)
}

fn sys_epoll_create(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.epoll_create(args[0].as_int())
}

fn sys_epoll_create1(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.epoll_create1(args[0].as_int())
}

fn sys_epoll_wait(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let epfd = args[0].as_int();
    let events = args[1].as_mut_ptr::<EpollEvent>();
    let maxevents = args[2].as_int();
    let timeout = args[3].as_int();

    device.epoll_wait(epfd, events, maxevents, timeout)
}

/// `epoll_pwait(epfd, events, maxevents, timeout, sigmask)`
///
/// Without `SIGNAL_MASK_WAIT` the mask word is not read and the call is a
/// plain `epoll_wait`. This is not reported as an error.
fn sys_epoll_pwait(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let epfd = args[0].as_int();
    let events = args[1].as_mut_ptr::<EpollEvent>();
    let maxevents = args[2].as_int();
    let timeout = args[3].as_int();

    if device.capabilities().contains(Capabilities::SIGNAL_MASK_WAIT) {
        let sigmask = args[4].as_ptr::<SigSet>();
        device.epoll_pwait(epfd, events, maxevents, timeout, sigmask)
    } else {
        device.epoll_wait(epfd, events, maxevents, timeout)
    }
}

fn sys_epoll_ctl(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let epfd = args[0].as_int();
    let op = args[1].as_int();
    let fd = args[2].as_int();
    let event = args[3].as_mut_ptr::<EpollEvent>();

    device.epoll_ctl(epfd, op, fd, event)
}

fn sys_eventfd(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let initval = args[0].as_uint();
    let flags = args[1].as_int();

    device.eventfd(initval, flags)
}

// ---------------------------------------------------------------------------
// Process and identity
// ---------------------------------------------------------------------------

/// `exit(status)`: control passes to the device and does not come back.
fn sys_exit(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let status = args[0].as_int();
    log::debug!("[SYSCALL] exit({})", status);

    device.exit(status)
}

/// `exit_group`: group termination is not handled at this layer.
fn sys_exit_group(_device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(0)
}

fn sys_getpid(device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(device.getpid() as isize)
}

fn sys_getppid(device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(device.getppid() as isize)
}

fn sys_getuid(device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(device.getuid() as isize)
}

fn sys_geteuid(device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(device.geteuid() as isize)
}

fn sys_getpgrp(device: &dyn Device, _args: &SyscallArgs) -> SysResult {
    Ok(device.getpgrp() as isize)
}

fn sys_uname(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    device.uname(args[0].as_mut_ptr::<UtsName>())
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

fn sys_rt_sigaction(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let signum = args[0].as_int();
    let act = args[1].as_ptr::<SigAction>();
    let oact = args[2].as_mut_ptr::<SigAction>();

    device.sigaction(signum, act, oact)
}

fn sys_kill(device: &dyn Device, args: &SyscallArgs) -> SysResult {
    let pid = args[0].as_int();
    let signum = args[1].as_int();

    device.kill(pid, signum)
}
