#[cfg(windows)]
mod win;
#[cfg(windows)]
pub use win::*;

#[cfg(unix)]
mod nix;
#[cfg(unix)]
pub use nix::*;

#[cfg(not(any(windows, unix)))]
mod unimpl;
#[cfg(not(any(windows, unix)))]
pub use unimpl::*;

mod comm;
pub use comm::*;
