//! Architecture abstraction for OS-supplied machine contexts.
//!
//! The translator only asks for a [`RegisterSnapshot`]; how registers are
//! laid out inside `ucontext_t` is the business of the per-architecture
//! modules below.
//!
//! # Supported Architectures
//!
//! - `x86_64` Linux: full support (the SGX target)
//! - `aarch64` Linux: register snapshot only, for host-side testing

use core::ffi::c_void;

use crate::context::RegisterSnapshot;

pub mod traits;
pub use traits::*;

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub mod x86_64;
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub use x86_64 as current;

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
pub mod aarch64;
#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
pub use aarch64 as current;

/// Snapshot registers from the third argument of an `SA_SIGINFO` handler
///
/// A null context yields an all-zero snapshot.
///
/// # Safety
/// `ucontext` must be null or point to the `ucontext_t` the kernel passed
/// to the running signal handler.
#[inline]
pub unsafe fn snapshot(ucontext: *const c_void) -> RegisterSnapshot {
    if ucontext.is_null() {
        return RegisterSnapshot::default();
    }
    // SAFETY: caller guarantees this is the kernel-supplied context
    let context = unsafe { &*(ucontext as *const libc::ucontext_t) };
    context.register_snapshot()
}
