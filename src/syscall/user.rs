//! Caller Pointer Types
//!
//! Typed views of pointer-shaped syscall words.
//!
//! # Trust Boundary
//! The caller and the router share one trust domain inside the enclave. A
//! word reinterpreted as a pointer is therefore NOT validated here: there is
//! no range check, no alignment check and no mapping check. These types only
//! record the pointee type so that each handler performs its cast at exactly
//! one place, and so that a device layer has to opt in to every dereference
//! through an `unsafe` accessor.
//!
//! Null is the only value given a meaning of its own, because several calls
//! (accept, select, rt_sigaction, ...) define a null pointer as "absent".

use core::ffi::{c_char, CStr};
use core::fmt;
use core::marker::PhantomData;

/// A caller-supplied pointer to memory the callee only reads.
#[repr(transparent)]
pub struct UserPtr<T> {
    addr: usize,
    _phantom: PhantomData<*const T>,
}

impl<T> UserPtr<T> {
    /// Wrap a raw address.
    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self {
            addr,
            _phantom: PhantomData,
        }
    }

    /// The null pointer.
    #[inline]
    pub const fn null() -> Self {
        Self::from_addr(0)
    }

    /// Wrap a Rust pointer.
    #[inline]
    pub fn from_ptr(ptr: *const T) -> Self {
        Self::from_addr(ptr as usize)
    }

    /// Get the raw address.
    #[inline]
    pub const fn addr(self) -> usize {
        self.addr
    }

    /// Check if this is the null pointer.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    /// Get the pointer as a raw Rust pointer.
    #[inline]
    pub const fn as_raw(self) -> *const T {
        self.addr as *const T
    }

    /// Borrow the pointee, or `None` for a null pointer.
    ///
    /// # Safety
    /// A non-null pointer must be valid for reads of `T`, properly aligned,
    /// and not mutated for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_ref<'a>(self) -> Option<&'a T> {
        // SAFETY: Caller guarantees validity of a non-null pointer.
        unsafe { self.as_raw().as_ref() }
    }

    /// Copy the pointee out without any alignment requirement.
    ///
    /// # Safety
    /// The pointer must be non-null and valid for reads of `T`.
    #[inline]
    pub unsafe fn read(self) -> T {
        // SAFETY: Caller guarantees the pointer is readable.
        unsafe { core::ptr::read_unaligned(self.as_raw()) }
    }

    /// View `len` consecutive elements as a slice.
    ///
    /// A zero length never touches memory and yields an empty slice, null
    /// or not.
    ///
    /// # Safety
    /// For `len > 0` the pointer must be valid for reads of `len` elements
    /// of `T`, properly aligned, and not mutated for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_slice<'a>(self, len: usize) -> &'a [T] {
        if len == 0 {
            return &[];
        }
        // SAFETY: Caller guarantees validity for `len` elements.
        unsafe { core::slice::from_raw_parts(self.as_raw(), len) }
    }
}

/// A caller-supplied pointer to memory the callee may write.
#[repr(transparent)]
pub struct UserPtrMut<T> {
    addr: usize,
    _phantom: PhantomData<*mut T>,
}

impl<T> UserPtrMut<T> {
    /// Wrap a raw address.
    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self {
            addr,
            _phantom: PhantomData,
        }
    }

    /// The null pointer.
    #[inline]
    pub const fn null() -> Self {
        Self::from_addr(0)
    }

    /// Wrap a Rust pointer.
    #[inline]
    pub fn from_ptr(ptr: *mut T) -> Self {
        Self::from_addr(ptr as usize)
    }

    /// Get the raw address.
    #[inline]
    pub const fn addr(self) -> usize {
        self.addr
    }

    /// Check if this is the null pointer.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    /// Get the pointer as a raw Rust pointer.
    #[inline]
    pub const fn as_raw(self) -> *mut T {
        self.addr as *mut T
    }

    /// Drop write access.
    #[inline]
    pub const fn as_const(self) -> UserPtr<T> {
        UserPtr::from_addr(self.addr)
    }

    /// Mutably borrow the pointee, or `None` for a null pointer.
    ///
    /// # Safety
    /// A non-null pointer must be valid for reads and writes of `T`,
    /// properly aligned, and not aliased for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_mut<'a>(self) -> Option<&'a mut T> {
        // SAFETY: Caller guarantees validity of a non-null pointer.
        unsafe { self.as_raw().as_mut() }
    }

    /// Store `value` at the pointer without any alignment requirement.
    ///
    /// # Safety
    /// The pointer must be non-null and valid for writes of `T`.
    #[inline]
    pub unsafe fn write(self, value: T) {
        // SAFETY: Caller guarantees the pointer is writable.
        unsafe { core::ptr::write_unaligned(self.as_raw(), value) }
    }

    /// View `len` consecutive elements as a mutable slice.
    ///
    /// A zero length never touches memory and yields an empty slice.
    ///
    /// # Safety
    /// For `len > 0` the pointer must be valid for reads and writes of `len`
    /// elements of `T`, properly aligned, and not aliased for `'a`.
    #[inline]
    pub unsafe fn as_mut_slice<'a>(self, len: usize) -> &'a mut [T] {
        if len == 0 {
            return &mut [];
        }
        // SAFETY: Caller guarantees validity for `len` elements.
        unsafe { core::slice::from_raw_parts_mut(self.as_raw(), len) }
    }
}

/// A caller-supplied pointer to a NUL-terminated path or name.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct UserCStr {
    addr: usize,
}

impl UserCStr {
    /// Wrap a raw address.
    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self { addr }
    }

    /// The null string pointer.
    #[inline]
    pub const fn null() -> Self {
        Self::from_addr(0)
    }

    /// Wrap a Rust C string. The string must outlive every use of the result.
    #[inline]
    pub fn from_cstr(s: &CStr) -> Self {
        Self::from_addr(s.as_ptr() as usize)
    }

    /// Get the raw address.
    #[inline]
    pub const fn addr(self) -> usize {
        self.addr
    }

    /// Check if this is the null pointer.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.addr == 0
    }

    /// Borrow the string, or `None` for a null pointer.
    ///
    /// # Safety
    /// A non-null pointer must reference a NUL-terminated byte string that
    /// stays valid and unmodified for the lifetime `'a`.
    #[inline]
    pub unsafe fn as_cstr<'a>(self) -> Option<&'a CStr> {
        if self.is_null() {
            return None;
        }
        // SAFETY: Non-null, and the caller guarantees NUL termination.
        Some(unsafe { CStr::from_ptr(self.addr as *const c_char) })
    }
}

impl<T> Clone for UserPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserPtr<T> {}

impl<T> PartialEq for UserPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for UserPtr<T> {}

impl<T> Clone for UserPtrMut<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserPtrMut<T> {}

impl<T> PartialEq for UserPtrMut<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for UserPtrMut<T> {}

impl<T> fmt::Debug for UserPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserPtr(0x{:x})", self.addr)
    }
}

impl<T> fmt::Debug for UserPtrMut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserPtrMut(0x{:x})", self.addr)
    }
}

impl fmt::Debug for UserCStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserCStr(0x{:x})", self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_slice_never_dereferences() {
        // Null with zero length is a legal empty read/write buffer.
        let ptr = UserPtr::<u8>::null();
        assert!(unsafe { ptr.as_slice(0) }.is_empty());
        let ptr = UserPtrMut::<u8>::null();
        assert!(unsafe { ptr.as_mut_slice(0) }.is_empty());
    }

    #[test]
    fn test_null_is_absent() {
        assert!(unsafe { UserPtr::<u32>::null().as_ref() }.is_none());
        assert!(unsafe { UserPtrMut::<u32>::null().as_mut() }.is_none());
        assert!(unsafe { UserCStr::null().as_cstr() }.is_none());
    }

    #[test]
    fn test_cstr_roundtrip() {
        let path = c"/tmp/x";
        let user = UserCStr::from_cstr(path);
        assert_eq!(unsafe { user.as_cstr() }, Some(path));
    }

    #[test]
    fn test_write_then_read_through_pointer() {
        let mut slot = 0u64;
        let out = UserPtrMut::from_ptr(&mut slot as *mut u64);
        unsafe { out.write(0xdead_beef) };
        assert_eq!(unsafe { out.as_const().read() }, 0xdead_beef);
        assert_eq!(slot, 0xdead_beef);
    }
}
