//! Inline function detouring: redirect a compiled callable to a replacement
//! by overwriting its machine-code entry point with an unconditional jump.
//!
//! The patch is architecture-fixed by host pointer width. 64-bit hosts get a
//! 12-byte destructive stub (`mov rax, imm64; jmp rax`), 32-bit hosts a
//! 5-byte near relative jump. The write assumes the target page is already
//! writable and executable and that the stub fits inside the original
//! instruction run; neither is verified, which is the usual bargain for
//! entry-point patching.
//!
//! # Example
//!
//! ```no_run
//! use sidetour_rs::{DetourRegistry, DetourRequest, Expr, MethodHandle, MethodTable};
//! use sidetour_rs::resolve_call;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The host's introspection facility knows where compiled bodies
//!     // live, including non-public ones.
//!     let mut host = MethodTable::new();
//!     host.insert_function(MethodHandle {
//!         name: "create_dropdown".into(),
//!         entry: 0x7ffe_1000,
//!         public: false,
//!     });
//!     host.insert_function(MethodHandle {
//!         name: "replacement".into(),
//!         entry: 0x7ffe_2000,
//!         public: true,
//!     });
//!
//!     let source = resolve_call(&Expr::Call("create_dropdown".into()), &host)?;
//!     let destination = resolve_call(&Expr::Call("replacement".into()), &host)?;
//!
//!     let request = DetourRequest::new(source, destination)
//!         .named("create_dropdown", "replacement");
//!     let mut registry = DetourRegistry::new();
//!     unsafe { registry.apply(&request)? };
//!     Ok(())
//! }
//! ```

mod detours;
mod disassembly;
mod error;
#[macro_use]
pub mod ext;
mod mem;
pub(crate) mod platform;
mod resolve;
mod stub;

pub use detours::{DetourRegistry, DetourRequest, apply_detour};
pub use disassembly::follow_jump_chain;
pub use error::{DetourError, DetourErrorKind, ResolutionError};
pub use mem::{ExecutableMemoryRegion, NativeAddress, raw_read, raw_write};
pub use platform::MemoryProtector;
pub use resolve::{
    AddressResolvable, DirectFunction, Expr, Introspect, MethodHandle, MethodTable,
    PropertyGetter, PropertyHandle, PropertySetter, resolve_call, resolve_getter,
    resolve_setter,
};
pub use stub::{ABS64_STUB_SIZE, REL32_STUB_SIZE, STUB_SIZE, jmp_abs64, jmp_rel32};
