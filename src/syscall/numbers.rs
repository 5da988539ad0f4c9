//! System Call Numbers
//!
//! The operation codes the router recognizes, using the Linux x86_64
//! numbering the enclave libc emits.

macro_rules! sysno_table {
    ($($(#[$doc:meta])* $variant:ident = $num:literal => $name:literal,)*) => {
        /// A recognized operation code.
        #[repr(usize)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Sysno {
            $($(#[$doc])* $variant = $num,)*
        }

        impl Sysno {
            /// Every recognized code, in ascending numeric order.
            pub const ALL: &'static [Sysno] = &[$(Sysno::$variant,)*];

            /// Look up a raw operation code.
            ///
            /// Returns None for codes the router does not handle.
            pub const fn from_raw(num: usize) -> Option<Self> {
                match num {
                    $($num => Some(Sysno::$variant),)*
                    _ => None,
                }
            }

            /// The conventional syscall name.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Sysno::$variant => $name,)*
                }
            }
        }
    };
}

sysno_table! {
    Read = 0 => "read",
    Write = 1 => "write",
    Open = 2 => "open",
    Close = 3 => "close",
    Stat = 4 => "stat",
    Poll = 7 => "poll",
    Lseek = 8 => "lseek",
    RtSigaction = 13 => "rt_sigaction",
    Ioctl = 16 => "ioctl",
    Readv = 19 => "readv",
    Writev = 20 => "writev",
    Access = 21 => "access",
    Select = 23 => "select",
    Dup = 32 => "dup",
    Dup2 = 33 => "dup2",
    Getpid = 39 => "getpid",
    Socket = 41 => "socket",
    Connect = 42 => "connect",
    Accept = 43 => "accept",
    Sendto = 44 => "sendto",
    Recvfrom = 45 => "recvfrom",
    Sendmsg = 46 => "sendmsg",
    Recvmsg = 47 => "recvmsg",
    Shutdown = 48 => "shutdown",
    Bind = 49 => "bind",
    Listen = 50 => "listen",
    Getsockname = 51 => "getsockname",
    Getpeername = 52 => "getpeername",
    Socketpair = 53 => "socketpair",
    Setsockopt = 54 => "setsockopt",
    Getsockopt = 55 => "getsockopt",
    /// Terminates the calling context; never returns.
    Exit = 60 => "exit",
    Kill = 62 => "kill",
    Uname = 63 => "uname",
    Fcntl = 72 => "fcntl",
    Truncate = 76 => "truncate",
    Getdents = 78 => "getdents",
    Getcwd = 79 => "getcwd",
    Chdir = 80 => "chdir",
    Rename = 82 => "rename",
    Mkdir = 83 => "mkdir",
    Rmdir = 84 => "rmdir",
    /// Composed as `open(O_CREAT | O_WRONLY | O_TRUNC)`.
    Creat = 85 => "creat",
    Link = 86 => "link",
    Unlink = 87 => "unlink",
    Getuid = 102 => "getuid",
    Geteuid = 107 => "geteuid",
    Getppid = 110 => "getppid",
    Getpgrp = 111 => "getpgrp",
    Mount = 165 => "mount",
    Umount2 = 166 => "umount2",
    EpollCreate = 213 => "epoll_create",
    /// Alias of `epoll_ctl`.
    EpollCtlOld = 214 => "epoll_ctl_old",
    /// Alias of `epoll_wait`.
    EpollWaitOld = 215 => "epoll_wait_old",
    /// Alias of `getdents`.
    Getdents64 = 217 => "getdents64",
    ExitGroup = 231 => "exit_group",
    EpollWait = 232 => "epoll_wait",
    EpollCtl = 233 => "epoll_ctl",
    EpollPwait = 281 => "epoll_pwait",
    Eventfd = 284 => "eventfd",
    /// Alias of `eventfd`.
    Eventfd2 = 290 => "eventfd2",
    EpollCreate1 = 291 => "epoll_create1",
}

impl Sysno {
    /// Get the raw operation code.
    #[inline]
    pub const fn raw(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for Sysno {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
