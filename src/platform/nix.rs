use crate::error::{DetourError, DetourErrorKind};
use crate::platform::comm::PageProtectionFlag;
use std::ffi::c_void;

pub const PAGE_FLAG_EXECUTE_READWRITE: PageProtectionFlag =
    (libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC) as PageProtectionFlag;

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

/// Changes protection on the pages covering `[addr, addr + size)`.
///
/// `mprotect` cannot report the previous protection, so the returned
/// "previous" flags equal the requested ones: a [`super::MemoryProtector`]
/// restore is a no-op here and pages it touched keep the lifted protection.
pub fn vprotect<T>(
    addr: *const T,
    size: usize,
    flag: PageProtectionFlag,
) -> Result<PageProtectionFlag, DetourError> {
    let page = page_size();
    let start = (addr as usize) & !(page - 1);
    let len = (addr as usize + size).next_multiple_of(page) - start;
    if (unsafe { libc::mprotect(start as *mut c_void, len, flag as i32) }) != 0 {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        return Err(DetourError::new(DetourErrorKind::Os(code as usize)));
    }
    Ok(flag)
}

/// x86 keeps the instruction cache coherent with data writes on the same
/// core; nothing to do here.
pub fn flush_instruction_cache(_addr: *const c_void, _size: usize) -> Result<(), DetourError> {
    Ok(())
}
