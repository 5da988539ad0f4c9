//! End-to-end routing through `TaskContext` over a small in-memory device.

use std::collections::BTreeMap;
use std::ffi::c_int;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::thread;

use spin::Mutex;
use sysroute::abi::{Mode, OpenFlags, Pid, Stat, Uid};
use sysroute::device::{
    self, FileOps, FsOps, MountOps, PollOps, ProcessOps, RegistryError, SignalOps, SocketOps,
};
use sysroute::syscall::{SyscallArgs, UserCStr, UserPtr, UserPtrMut, SYSCALL_FAILED};
use sysroute::{dispatch, Device, Errno, SysResult, Sysno, TaskContext};

/// Payload `MemFs::exit` unwinds with.
#[derive(Debug, PartialEq, Eq)]
struct Exited(c_int);

/// A flat filesystem: a fixed set of directories and a growing set of files.
///
/// `/ro` exists but refuses new entries.
struct MemFs {
    files: Mutex<Vec<String>>,
    open: Mutex<BTreeMap<c_int, String>>,
    next_fd: Mutex<c_int>,
}

const DIRS: &[&str] = &["", "/tmp", "/ro"];
const READ_ONLY: &[&str] = &["/ro"];
const CWD: &[u8] = b"/tmp\0";

impl MemFs {
    const fn new() -> Self {
        Self {
            files: Mutex::new(Vec::new()),
            open: Mutex::new(BTreeMap::new()),
            next_fd: Mutex::new(3),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.files.lock().iter().any(|f| f == path)
    }
}

fn path_of(path: UserCStr) -> Result<String, Errno> {
    // SAFETY: Every caller in this file passes a string literal or null.
    let s = unsafe { path.as_cstr() }.ok_or(Errno::EFAULT)?;
    s.to_str().map(String::from).map_err(|_| Errno::EINVAL)
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

impl FileOps for MemFs {
    fn open(&self, path: UserCStr, flags: OpenFlags, _mode: Mode) -> SysResult {
        let path = path_of(path)?;
        let parent = parent_of(&path);
        if !DIRS.contains(&parent) {
            return Err(Errno::ENOENT);
        }

        if !self.exists(&path) {
            if !flags.contains(OpenFlags::O_CREAT) {
                return Err(Errno::ENOENT);
            }
            if READ_ONLY.contains(&parent) {
                return Err(Errno::EACCES);
            }
            self.files.lock().push(path.clone());
        }

        let mut next = self.next_fd.lock();
        let fd = *next;
        *next += 1;
        self.open.lock().insert(fd, path);
        Ok(fd as isize)
    }

    fn write(&self, fd: c_int, _buf: UserPtr<u8>, count: usize) -> SysResult {
        if self.open.lock().contains_key(&fd) {
            Ok(count as isize)
        } else {
            Err(Errno::EBADF)
        }
    }

    fn close(&self, fd: c_int) -> SysResult {
        self.open.lock().remove(&fd).map(|_| 0).ok_or(Errno::EBADF)
    }
}

impl FsOps for MemFs {
    fn stat(&self, path: UserCStr, buf: &mut Stat) -> SysResult {
        if !self.exists(&path_of(path)?) {
            return Err(Errno::ENOENT);
        }
        buf.st_mode = 0o100644;
        buf.st_nlink = 1;
        Ok(0)
    }

    fn unlink(&self, path: UserCStr) -> SysResult {
        let path = path_of(path)?;
        let mut files = self.files.lock();
        let idx = files.iter().position(|f| *f == path).ok_or(Errno::ENOENT)?;
        files.remove(idx);
        Ok(0)
    }

    fn getcwd(&self, buf: UserPtrMut<u8>, size: usize) -> Result<(), Errno> {
        if size < CWD.len() {
            return Err(Errno::ERANGE);
        }
        // SAFETY: The caller's buffer holds `size` bytes.
        let out = unsafe { buf.as_mut_slice(CWD.len()) };
        out.copy_from_slice(CWD);
        Ok(())
    }
}

impl MountOps for MemFs {}
impl SocketOps for MemFs {}
impl PollOps for MemFs {}
impl SignalOps for MemFs {}

impl ProcessOps for MemFs {
    fn getpid(&self) -> Pid {
        42
    }
    fn getppid(&self) -> Pid {
        1
    }
    fn getuid(&self) -> Uid {
        0
    }
    fn geteuid(&self) -> Uid {
        0
    }
    fn getpgrp(&self) -> Pid {
        42
    }
    fn exit(&self, status: c_int) -> ! {
        panic::panic_any(Exited(status))
    }
}

impl Device for MemFs {}

static FS: MemFs = MemFs::new();

fn open_flags(flags: OpenFlags) -> c_int {
    flags.bits()
}

#[test]
fn test_open_then_close() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    let flags = open_flags(OpenFlags::O_CREAT | OpenFlags::O_WRONLY);
    let fd = sysroute::syscall!(ctx, Sysno::Open, c"/tmp/x", flags, 0o644u32);
    assert!(fd >= 0);
    assert_eq!(ctx.errno(), Errno::NONE);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Write, fd, c"hello".as_ptr(), 5usize), 5);
    assert_eq!(sysroute::syscall!(ctx, Sysno::Close, fd), 0);
    assert_eq!(sysroute::syscall!(ctx, Sysno::Close, fd), SYSCALL_FAILED);
    assert_eq!(ctx.errno(), Errno::EBADF);
}

#[test]
fn test_unlink_missing_file() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Unlink, c"/nonexistent"), -1);
    assert_eq!(ctx.errno(), Errno::ENOENT);
}

#[test]
fn test_success_clears_previous_errno() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    sysroute::syscall!(ctx, Sysno::Unlink, c"/nonexistent");
    assert_eq!(ctx.errno(), Errno::ENOENT);
    assert_eq!(sysroute::syscall!(ctx, Sysno::Getpid), 42);
    assert_eq!(ctx.errno(), Errno::NONE);
}

#[test]
fn test_creat_creates_file() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert!(sysroute::syscall!(ctx, Sysno::Creat, c"/tmp/new", 0o600u32) >= 0);
    assert!(fs.exists("/tmp/new"));
}

#[test]
fn test_creat_missing_parent_falls_back() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Creat, c"/missing/dir/f", 0o644u32), -1);
    assert_eq!(ctx.errno(), Errno::ENOSYS);

    // open through the same path keeps the device's answer.
    let flags = open_flags(OpenFlags::CREAT_COMPAT);
    assert_eq!(sysroute::syscall!(ctx, Sysno::Open, c"/missing/dir/f", flags, 0o644u32), -1);
    assert_eq!(ctx.errno(), Errno::ENOENT);
}

#[test]
fn test_creat_permission_denied() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Creat, c"/ro/f", 0o644u32), -1);
    assert_eq!(ctx.errno(), Errno::EACCES);
}

#[test]
fn test_stat_and_getcwd() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);
    sysroute::syscall!(ctx, Sysno::Creat, c"/tmp/s", 0o644u32);

    let mut st = Stat::default();
    assert_eq!(sysroute::syscall!(ctx, Sysno::Stat, c"/tmp/s", &mut st as *mut Stat), 0);
    assert_eq!(st.st_mode, 0o100644);
    assert_eq!(st.st_nlink, 1);

    let mut cwd = [0xffu8; 16];
    let ret = sysroute::syscall!(ctx, Sysno::Getcwd, cwd.as_mut_ptr(), cwd.len());
    assert_eq!(ret, 16);
    assert_eq!(&cwd[..CWD.len()], CWD);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Getcwd, cwd.as_mut_ptr(), 2usize), -1);
    assert_eq!(ctx.errno(), Errno::ERANGE);
}

#[test]
fn test_unimplemented_operation_is_enosys() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert_eq!(sysroute::syscall!(ctx, Sysno::Socket, 2i32, 1i32, 0i32), -1);
    assert_eq!(ctx.errno(), Errno::ENOSYS);
}

#[test]
fn test_unknown_code() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    // fork
    assert_eq!(ctx.syscall(57, SyscallArgs::default()), -1);
    assert_eq!(ctx.errno(), Errno::ENOSYS);
}

#[test]
fn test_exit_never_returns() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        sysroute::syscall!(ctx, Sysno::Exit, 3i32);
    }));

    let payload = outcome.expect_err("exit returned");
    assert_eq!(payload.downcast_ref::<Exited>(), Some(&Exited(3)));
}

#[test]
fn test_exit_group_reports_success() {
    let fs = MemFs::new();
    let mut ctx = TaskContext::new(&fs);

    assert_eq!(sysroute::syscall!(ctx, Sysno::ExitGroup, 3i32), 0);
    assert_eq!(ctx.errno(), Errno::NONE);
}

#[test]
fn test_alias_codes_route_alike() {
    let fs = MemFs::new();
    let args = SyscallArgs::from_slice(&[0, 0, 0, 0]);
    let pairs = [
        (Sysno::Getdents, Sysno::Getdents64),
        (Sysno::Eventfd, Sysno::Eventfd2),
        (Sysno::EpollWait, Sysno::EpollWaitOld),
        (Sysno::EpollCtl, Sysno::EpollCtlOld),
        (Sysno::EpollWait, Sysno::EpollPwait),
    ];
    for (canonical, alias) in pairs {
        assert_eq!(
            dispatch(&fs, canonical.raw(), args),
            dispatch(&fs, alias.raw(), args),
            "{} vs {}",
            canonical,
            alias
        );
    }
}

#[test]
fn test_errors_stay_per_context() {
    let barrier = Barrier::new(2);

    thread::scope(|s| {
        let failing = s.spawn(|| {
            let mut ctx = TaskContext::new(&FS);
            assert_eq!(sysroute::syscall!(ctx, Sysno::Unlink, c"/nonexistent"), -1);
            barrier.wait();
            barrier.wait();
            ctx.errno()
        });
        let succeeding = s.spawn(|| {
            let mut ctx = TaskContext::new(&FS);
            barrier.wait();
            assert_eq!(sysroute::syscall!(ctx, Sysno::Getppid), 1);
            barrier.wait();
            ctx.errno()
        });

        assert_eq!(failing.join().ok(), Some(Errno::ENOENT));
        assert_eq!(succeeding.join().ok(), Some(Errno::NONE));
    });
}

#[test]
fn test_concurrent_opens_get_distinct_descriptors() {
    let fds: Vec<isize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    let mut ctx = TaskContext::new(&FS);
                    let flags = open_flags(OpenFlags::O_CREAT | OpenFlags::O_RDWR);
                    sysroute::syscall!(ctx, Sysno::Open, c"/tmp/shared", flags, 0o644u32)
                })
            })
            .collect();
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    });

    let mut sorted = fds.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 8);
    assert!(fds.iter().all(|fd| *fd >= 3));
}

#[test]
fn test_registry_install_once() {
    assert_eq!(
        TaskContext::with_installed().map(|_| ()),
        Err(RegistryError::NotInstalled)
    );

    assert_eq!(device::install(&FS), Ok(()));
    assert_eq!(device::install(&FS), Err(RegistryError::AlreadyInstalled));

    let mut ctx = TaskContext::with_installed().expect("device installed");
    assert_eq!(sysroute::syscall!(ctx, Sysno::Getpgrp), 42);
    assert_eq!(device::installed().map(|d| d.getpid()), Some(42));
}
