use crate::error::DetourError;
use crate::mem::NativeAddress;
use crate::platform::{PAGE_FLAG_EXECUTE_READWRITE, vprotect};
use std::ffi::c_void;

pub type PageProtectionFlag = u32;

/// RAII guard that holds a range writable and puts the previous protection
/// back on drop.
///
/// This is the opt-in path for callers who must write through protected
/// pages; the detour apply path never changes protection itself.
pub struct MemoryProtector {
    addr: NativeAddress,
    size: usize,
    old_flag: PageProtectionFlag,
}

impl MemoryProtector {
    pub fn new(addr: NativeAddress, size: usize) -> Result<MemoryProtector, DetourError> {
        vprotect(addr as *const c_void, size, PAGE_FLAG_EXECUTE_READWRITE).map(|old_flag| {
            MemoryProtector {
                addr,
                size,
                old_flag,
            }
        })
    }

    pub fn new_with<T: Sized>(addr: NativeAddress) -> Result<MemoryProtector, DetourError> {
        Self::new(addr, size_of::<T>())
    }
}

impl Drop for MemoryProtector {
    fn drop(&mut self) {
        let _ = vprotect(self.addr as *const c_void, self.size, self.old_flag);
    }
}
