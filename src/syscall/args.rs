//! Syscall Argument Bundle
//!
//! The word-sized argument slots every call carries, and the single place
//! where a variable-length argument list is packed into them.
//!
//! # Contract
//! - A call always carries exactly `SYSCALL_ARG_COUNT` words
//! - Words past what the target operation needs are never read
//! - Packing does not inspect, count-check or range-check anything; the
//!   words are only reinterpreted later, by the handler for the code

use core::ffi::{c_int, c_long, c_uint, c_ulong, CStr};
use core::ops::Index;

use super::numbers::Sysno;
use super::user::{UserCStr, UserPtr, UserPtrMut};

/// Number of argument slots per call.
pub const SYSCALL_ARG_COUNT: usize = 6;

/// An opaque machine word from the caller.
///
/// Conversions into a `Word` follow the C `long` calling convention: signed
/// values are sign-extended, unsigned values and pointers zero-extended.
/// Conversions out of a `Word` are the reinterpretation casts; each one
/// mirrors the C cast `(type)argN` and performs no checking.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Word(usize);

impl Word {
    /// The all-zero word used to fill unused slots.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw register value.
    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Reinterpret as a C `int` (truncating).
    #[inline]
    pub const fn as_int(self) -> c_int {
        self.0 as c_int
    }

    /// Reinterpret as a C `unsigned int` (truncating).
    #[inline]
    pub const fn as_uint(self) -> c_uint {
        self.0 as c_uint
    }

    /// Reinterpret as a C `long`.
    #[inline]
    pub const fn as_long(self) -> c_long {
        self.0 as c_long
    }

    /// Reinterpret as a C `unsigned long`.
    #[inline]
    pub const fn as_ulong(self) -> c_ulong {
        self.0 as c_ulong
    }

    /// Reinterpret as a 32-bit unsigned value (`mode_t`, `socklen_t`).
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Reinterpret as `size_t`.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Reinterpret as `ssize_t` / `off_t`.
    #[inline]
    pub const fn as_isize(self) -> isize {
        self.0 as isize
    }

    /// Reinterpret as a pointer to caller memory that is only read.
    #[inline]
    pub const fn as_ptr<T>(self) -> UserPtr<T> {
        UserPtr::from_addr(self.0)
    }

    /// Reinterpret as a pointer to caller memory that may be written.
    #[inline]
    pub const fn as_mut_ptr<T>(self) -> UserPtrMut<T> {
        UserPtrMut::from_addr(self.0)
    }

    /// Reinterpret as a pointer to a NUL-terminated string.
    #[inline]
    pub const fn as_cstr(self) -> UserCStr {
        UserCStr::from_addr(self.0)
    }
}

impl core::fmt::Debug for Word {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

macro_rules! word_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Word {
            #[inline]
            fn from(value: $ty) -> Self {
                Self(value as usize)
            }
        })*
    };
}

macro_rules! word_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Word {
            #[inline]
            fn from(value: $ty) -> Self {
                Self(value as isize as usize)
            }
        })*
    };
}

word_from_unsigned!(u8, u16, u32, u64, usize);
word_from_signed!(i8, i16, i32, i64, isize);

impl<T> From<*const T> for Word {
    #[inline]
    fn from(ptr: *const T) -> Self {
        Self(ptr as usize)
    }
}

impl<T> From<*mut T> for Word {
    #[inline]
    fn from(ptr: *mut T) -> Self {
        Self(ptr as usize)
    }
}

impl From<&CStr> for Word {
    #[inline]
    fn from(s: &CStr) -> Self {
        Self(s.as_ptr() as usize)
    }
}

impl<T> From<UserPtr<T>> for Word {
    #[inline]
    fn from(ptr: UserPtr<T>) -> Self {
        Self(ptr.addr())
    }
}

impl<T> From<UserPtrMut<T>> for Word {
    #[inline]
    fn from(ptr: UserPtrMut<T>) -> Self {
        Self(ptr.addr())
    }
}

impl From<UserCStr> for Word {
    #[inline]
    fn from(s: UserCStr) -> Self {
        Self(s.addr())
    }
}

impl From<Sysno> for usize {
    #[inline]
    fn from(sysno: Sysno) -> Self {
        sysno.raw()
    }
}

/// The fixed six-slot argument bundle of one call.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct SyscallArgs([Word; SYSCALL_ARG_COUNT]);

impl SyscallArgs {
    /// Create a bundle from six words.
    #[inline]
    pub const fn new(words: [Word; SYSCALL_ARG_COUNT]) -> Self {
        Self(words)
    }

    /// Pack a variable-length argument list.
    ///
    /// The first `SYSCALL_ARG_COUNT` words are taken in order; missing slots
    /// are zero and anything past the sixth word is dropped.
    pub fn pack(words: &[Word]) -> Self {
        let mut slots = [Word::ZERO; SYSCALL_ARG_COUNT];
        for (slot, word) in slots.iter_mut().zip(words) {
            *slot = *word;
        }
        Self(slots)
    }

    /// Pack raw register values, as saved by an entry trampoline.
    pub fn from_slice(raw: &[usize]) -> Self {
        let mut slots = [Word::ZERO; SYSCALL_ARG_COUNT];
        for (slot, &value) in slots.iter_mut().zip(raw) {
            *slot = Word(value);
        }
        Self(slots)
    }

    /// Get one slot, or `None` past the sixth.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Word> {
        self.0.get(index).copied()
    }

    /// Get all six words.
    #[inline]
    pub const fn words(&self) -> &[Word; SYSCALL_ARG_COUNT] {
        &self.0
    }
}

impl Index<usize> for SyscallArgs {
    type Output = Word;

    #[inline]
    fn index(&self, index: usize) -> &Word {
        &self.0[index]
    }
}

impl core::fmt::Debug for SyscallArgs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Issue a syscall on a `TaskContext` with up to six arguments.
///
/// Each argument is converted with `Word::from`, so integers, raw pointers,
/// `&CStr` and the user pointer types can be passed directly.
///
/// ```ignore
/// let fd = syscall!(ctx, Sysno::Open, c"/tmp/x", flags.bits(), 0o644u32);
/// ```
#[macro_export]
macro_rules! syscall {
    ($ctx:expr, $sysno:expr $(, $arg:expr)* $(,)?) => {
        $ctx.syscall(
            ::core::primitive::usize::from($sysno),
            $crate::syscall::SyscallArgs::pack(&[$($crate::syscall::Word::from($arg)),*]),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_pads_with_zero() {
        let args = SyscallArgs::pack(&[Word::from(7u32), Word::from(-1i32)]);
        assert_eq!(args[0].as_int(), 7);
        assert_eq!(args[1].as_isize(), -1);
        assert!(args.words()[2..].iter().all(|w| *w == Word::ZERO));
        assert_eq!(args.get(5), Some(Word::ZERO));
        assert_eq!(args.get(SYSCALL_ARG_COUNT), None);
    }

    #[test]
    fn test_pack_drops_seventh_word() {
        let raw: [usize; 7] = [1, 2, 3, 4, 5, 6, 7];
        let args = SyscallArgs::from_slice(&raw);
        let expected = [1usize, 2, 3, 4, 5, 6].map(Word::new);
        assert_eq!(*args.words(), expected);
    }

    #[test]
    fn test_signed_values_sign_extend() {
        assert_eq!(Word::from(-2i32).as_long(), -2);
        assert_eq!(Word::from(-2i32).as_usize(), usize::MAX - 1);
        // Truncation back to int recovers the original value.
        assert_eq!(Word::from(-100i64).as_int(), -100);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_int_cast_truncates_high_bits() {
        let word = Word::new(0x1_0000_0005);
        assert_eq!(word.as_int(), 5);
        assert_eq!(word.as_uint(), 5);
    }

    #[test]
    fn test_pointer_reinterpretation_keeps_address() {
        let value = 9u16;
        let word = Word::from(&value as *const u16);
        assert_eq!(word.as_ptr::<u16>().as_raw(), &value as *const u16);
        assert_eq!(word.as_cstr().addr(), word.as_usize());
    }
}
