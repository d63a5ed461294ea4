use crate::error::{DetourError, DetourErrorKind};
use crate::platform::comm::PageProtectionFlag;
use std::ffi::c_void;
use windows_sys::Win32::Foundation::{GetLastError, HANDLE};
use windows_sys::Win32::System::Diagnostics::Debug::FlushInstructionCache;
use windows_sys::Win32::System::Memory::{PAGE_EXECUTE_READWRITE, VirtualProtect};
use windows_sys::Win32::System::Threading::GetCurrentProcess;

pub const PAGE_FLAG_EXECUTE_READWRITE: PageProtectionFlag = PAGE_EXECUTE_READWRITE;

/// Changes protection on `[addr, addr + size)`, returning the previous
/// flags.
pub fn vprotect<T>(
    addr: *const T,
    size: usize,
    flag: PageProtectionFlag,
) -> Result<PageProtectionFlag, DetourError> {
    let mut out_flag = 0;
    if (unsafe { VirtualProtect(addr.cast(), size, flag, &mut out_flag) }) == 0 {
        Err(DetourError::new(DetourErrorKind::Os(unsafe {
            GetLastError() as usize
        })))
    } else {
        Ok(out_flag)
    }
}

pub fn get_current_process() -> HANDLE {
    unsafe { GetCurrentProcess() }
}

/// Publishes freshly written code bytes to the execution pipeline.
pub fn flush_instruction_cache(addr: *const c_void, size: usize) -> Result<(), DetourError> {
    if (unsafe { FlushInstructionCache(get_current_process(), addr, size) }) != 0 {
        Ok(())
    } else {
        Err(DetourError::new(DetourErrorKind::Os(unsafe {
            GetLastError() as usize
        })))
    }
}
