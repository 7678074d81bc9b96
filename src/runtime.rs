//! Boundary to the enclave runtime's exception entry point
//!
//! The core only owns the request side: build an [`ExceptionContext`], submit
//! it, act on the verdict. What the enclave does with the exception is its
//! own business.

use crate::context::ExceptionContext;

/// Wire code: the enclave handled the exception, resume execution
pub const EXCEPTION_CONTINUE_EXECUTION: u64 = 0xFFFF_FFFF;
/// Wire code: the enclave did not handle the exception
pub const EXCEPTION_CONTINUE_SEARCH: u64 = 0;

/// Outcome of submitting an exception to the enclave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionVerdict {
    /// Exception resolved; return from the handler and resume
    Continue,
    /// Exception declined; the disposition resolver decides
    NotHandled,
}

impl ExceptionVerdict {
    /// Decode a wire code. Anything other than
    /// [`EXCEPTION_CONTINUE_EXECUTION`] is treated as not handled.
    #[inline]
    pub const fn from_code(code: u64) -> Self {
        if code == EXCEPTION_CONTINUE_EXECUTION {
            ExceptionVerdict::Continue
        } else {
            ExceptionVerdict::NotHandled
        }
    }

    #[inline]
    pub const fn code(self) -> u64 {
        match self {
            ExceptionVerdict::Continue => EXCEPTION_CONTINUE_EXECUTION,
            ExceptionVerdict::NotHandled => EXCEPTION_CONTINUE_SEARCH,
        }
    }
}

/// The enclave runtime as seen from the signal handler
///
/// `submit_host_exception` runs inside a signal handler on the faulting
/// thread, possibly re-entrantly and on several threads at once.
/// Implementations must be async-signal-safe.
pub trait IsolatedRuntime: Sync {
    /// Offer an exception to the enclave and block until it decides
    fn submit_host_exception(&self, context: ExceptionContext) -> ExceptionVerdict;
}

/// C entry point taking the wire context and returning a wire code
pub type ForeignEntry = unsafe extern "C" fn(context: *mut ExceptionContext) -> u64;

/// [`IsolatedRuntime`] backed by a C-ABI entry point
pub struct ForeignRuntime {
    entry: ForeignEntry,
}

impl ForeignRuntime {
    /// # Safety
    /// `entry` must be async-signal-safe and must not keep the context
    /// pointer past its return.
    pub const unsafe fn new(entry: ForeignEntry) -> Self {
        ForeignRuntime { entry }
    }
}

impl IsolatedRuntime for ForeignRuntime {
    fn submit_host_exception(&self, mut context: ExceptionContext) -> ExceptionVerdict {
        // SAFETY: the context lives on this stack frame for the whole call;
        // the constructor contract covers the callee
        let code = unsafe { (self.entry)(&mut context) };
        ExceptionVerdict::from_code(code)
    }
}
