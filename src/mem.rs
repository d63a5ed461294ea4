use crate::error::{DetourError, DetourErrorKind};
use crate::platform::{self, MemoryProtector};
use std::ffi::c_void;
use std::ptr;

/// First byte of a callable's executable code. Raw, unowned view into
/// process memory; the width follows the host pointer size.
pub type NativeAddress = usize;

/// A fixed range of process memory holding executable code.
///
/// Constructing a region asserts, on the caller's authority, that the whole
/// range is mapped, that it is writable for the writes performed through it,
/// executable if it will be executed, and that the instructions starting at
/// its base span at least the bytes any write will cover. None of this is
/// verified: a write into a protected page faults instead of returning an
/// error, and a write longer than the true instruction run corrupts the code
/// that follows it.
pub struct ExecutableMemoryRegion {
    base: NativeAddress,
    len: usize,
}

impl ExecutableMemoryRegion {
    /// # Safety
    ///
    /// The caller guarantees the type-level contract for `[base, base + len)`.
    pub unsafe fn assume(base: NativeAddress, len: usize) -> ExecutableMemoryRegion {
        ExecutableMemoryRegion { base, len }
    }

    pub fn base(&self) -> NativeAddress {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, at: NativeAddress, size: usize) -> bool {
        at >= self.base && size <= self.len && at - self.base <= self.len - size
    }

    /// Copies `size` bytes starting at `at` out of the region.
    pub fn snapshot(&self, at: NativeAddress, size: usize) -> Result<Vec<u8>, DetourError> {
        self.check(at, size)?;
        let mut bytes = vec![0u8; size];
        unsafe { ptr::copy_nonoverlapping(at as *const u8, bytes.as_mut_ptr(), size) };
        Ok(bytes)
    }

    /// Writes `bytes` starting at `at`, then flushes the instruction cache.
    ///
    /// Page protection is left exactly as found; a write-protected page
    /// faults here rather than failing recoverably.
    pub fn write(&mut self, at: NativeAddress, bytes: &[u8]) -> Result<(), DetourError> {
        self.check(at, bytes.len())?;
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), at as *mut u8, bytes.len()) };
        platform::flush_instruction_cache(at as *const c_void, bytes.len())?;
        Ok(())
    }

    fn check(&self, at: NativeAddress, size: usize) -> Result<(), DetourError> {
        if self.contains(at, size) {
            Ok(())
        } else {
            Err(DetourError::new(DetourErrorKind::OutOfRegion {
                base: self.base,
                len: self.len,
                at,
                size,
            }))
        }
    }
}

/// Typed store through a temporary protection lift.
///
/// Unlike the detour write path this changes page protection around the
/// store and restores it afterwards.
///
/// # Safety
///
/// `addr` must be mapped for at least `size_of::<T>()` bytes.
pub unsafe fn raw_write<T: Sized>(addr: NativeAddress, value: T) -> Result<(), DetourError> {
    let _guard = MemoryProtector::new_with::<T>(addr)?;
    unsafe { ptr::write(addr as *mut T, value) };
    Ok(())
}

/// # Safety
///
/// `addr` must be mapped for at least `size_of::<T>()` bytes.
pub unsafe fn raw_read<T: Sized>(addr: NativeAddress) -> T {
    unsafe { ptr::read(addr as *const T) }
}
