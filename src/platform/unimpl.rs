use crate::error::DetourError;
use crate::platform::comm::PageProtectionFlag;
use std::ffi::c_void;

pub const PAGE_FLAG_EXECUTE_READWRITE: PageProtectionFlag = 0;

pub fn vprotect<T>(
    _addr: *const T,
    _size: usize,
    _flag: PageProtectionFlag,
) -> Result<PageProtectionFlag, DetourError> {
    unimplemented!()
}

pub fn flush_instruction_cache(_addr: *const c_void, _size: usize) -> Result<(), DetourError> {
    unimplemented!()
}
