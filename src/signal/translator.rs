//! The multiplexing signal handler
//!
//! Runs on whichever thread took the signal, possibly nested inside an
//! earlier invocation (the handler is installed with `SA_NODEFER`). Only
//! stack locals and the read-only registry are touched here.

use core::ffi::c_void;

use libc::{c_int, siginfo_t};

use super::catalog;
use super::registry;
use super::resolver;
use crate::arch_impl;
use crate::context::ExceptionContext;
use crate::runtime::ExceptionVerdict;

/// Signal number the enclave sees for a delivered signal
///
/// Fault signals other than SIGSEGV report 0. Optional signals, SIGSEGV and
/// signals outside the catalog report their real number.
#[inline]
pub fn reported_signal_number(signo: c_int) -> u64 {
    match catalog::lookup(signo) {
        Some(entry) => entry.reported_signal_number(),
        None => signo as u64,
    }
}

/// Build the exception record for one delivery
///
/// # Safety
/// `info` and `ucontext` must be null or the pointers the kernel passed to
/// the running `SA_SIGINFO` handler.
pub unsafe fn build_context(
    signo: c_int,
    info: *const siginfo_t,
    ucontext: *const c_void,
) -> ExceptionContext {
    // SAFETY: forwarded from the caller
    let registers = unsafe { arch_impl::snapshot(ucontext) };

    // Enclave page faults arrive with the low 12 bits of si_addr cleared.
    // Pass it through as is.
    let faulting_address = if info.is_null() {
        0
    } else {
        // SAFETY: non-null kernel-supplied siginfo
        unsafe { (*info).si_addr() as u64 }
    };

    ExceptionContext::new(&registers, reported_signal_number(signo), faulting_address)
}

/// Installed as the `sa_sigaction` of every cataloged signal
pub(crate) extern "C" fn handle_signal(signo: c_int, info: *mut siginfo_t, ucontext: *mut c_void) {
    // SAFETY: arguments come straight from the kernel
    let context = unsafe { build_context(signo, info, ucontext) };

    let verdict = match registry::runtime() {
        Some(runtime) => runtime.submit_host_exception(context),
        None => ExceptionVerdict::NotHandled,
    };

    if verdict == ExceptionVerdict::Continue {
        return;
    }

    // Decide on the real signal number, not the reported one
    let resolution = resolver::resolve(
        signo,
        catalog::lookup(signo),
        registry::saved_disposition(signo).as_ref(),
    );
    resolver::apply(resolution, signo, info, ucontext);
}
