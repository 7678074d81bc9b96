//! Saved signal dispositions

use core::ffi::c_void;

use libc::{c_int, siginfo_t};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet};

/// Handler that was registered for a signal before interception
#[derive(Debug, Clone, Copy)]
pub enum PriorHandler {
    /// `SIG_DFL`
    Default,
    /// `SIG_IGN`
    Ignore,
    /// Plain `sa_handler` taking only the signal number
    Simple(extern "C" fn(c_int)),
    /// `sa_sigaction` registered with `SA_SIGINFO`
    Extended(extern "C" fn(c_int, *mut siginfo_t, *mut c_void)),
}

impl PriorHandler {
    /// Check if handler is the default action
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, PriorHandler::Default)
    }

    /// Check if handler ignores the signal
    #[inline]
    pub fn is_ignore(&self) -> bool {
        matches!(self, PriorHandler::Ignore)
    }

    /// Check if handler is a callable function
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, PriorHandler::Simple(_) | PriorHandler::Extended(_))
    }
}

impl From<SigHandler> for PriorHandler {
    fn from(handler: SigHandler) -> Self {
        match handler {
            SigHandler::SigDfl => PriorHandler::Default,
            SigHandler::SigIgn => PriorHandler::Ignore,
            SigHandler::Handler(f) => PriorHandler::Simple(f),
            SigHandler::SigAction(f) => PriorHandler::Extended(f),
        }
    }
}

/// OS-level disposition captured for one signal at install time
///
/// Matches the fields of `struct sigaction` that matter for chaining.
#[derive(Debug, Clone, Copy)]
pub struct SignalDisposition {
    /// Previous handler (SIG_DFL, SIG_IGN, or a function)
    pub handler: PriorHandler,
    /// Signals the previous handler wanted blocked while it runs
    pub mask: SigSet,
    /// Registration flags (SA_NODEFER, SA_RESETHAND, SA_SIGINFO, ...)
    pub flags: SaFlags,
}

impl SignalDisposition {
    /// Whether the previous handler asked not to block its own signal
    #[inline]
    pub fn no_defer(&self) -> bool {
        self.flags.contains(SaFlags::SA_NODEFER)
    }

    /// Whether the previous handler was registered one-shot
    #[inline]
    pub fn reset_on_delivery(&self) -> bool {
        self.flags.contains(SaFlags::SA_RESETHAND)
    }
}

impl Default for SignalDisposition {
    fn default() -> Self {
        SignalDisposition {
            handler: PriorHandler::Default,
            mask: SigSet::empty(),
            flags: SaFlags::empty(),
        }
    }
}

impl From<SigAction> for SignalDisposition {
    fn from(action: SigAction) -> Self {
        SignalDisposition {
            handler: action.handler().into(),
            mask: action.mask(),
            flags: action.flags(),
        }
    }
}
