//! What happens to a signal the enclave declined
//!
//! Three outcomes, chosen from the disposition saved at install time:
//! - Swallow: optional signal nobody on the host asked for
//! - Re-raise with the default action: faults, SIGABRT, unknown signals
//! - Chain: call the previous handler the way the kernel would have

use core::ffi::c_void;

use libc::{c_int, siginfo_t};
use nix::sys::signal::{self, raise, SigHandler, SigSet, SigmaskHow, Signal};

use super::catalog::{CatalogEntry, SignalClass};
use super::types::{PriorHandler, SignalDisposition};

/// Previous handler together with its calling convention
#[derive(Debug, Clone, Copy)]
pub enum ChainTarget {
    Simple(extern "C" fn(c_int)),
    Extended(extern "C" fn(c_int, *mut siginfo_t, *mut c_void)),
}

/// Everything needed to invoke a previous handler
#[derive(Debug, Clone, Copy)]
pub struct ChainPlan {
    pub target: ChainTarget,
    /// Thread mask while the previous handler runs
    pub mask: SigSet,
    /// Reset the live disposition to `SIG_DFL` afterwards (`SA_RESETHAND`)
    pub reset_after: bool,
}

/// Decision for an unhandled signal
#[derive(Debug, Clone, Copy)]
pub enum Resolution {
    /// Return as if the signal was never delivered
    Swallow,
    /// Reinstall `SIG_DFL` and deliver the signal again
    ReraiseDefault,
    /// Invoke the previous handler
    Chain(ChainPlan),
}

/// Choose the outcome for a signal the enclave did not handle
///
/// # Arguments
/// * `signo` - The signal number actually delivered
/// * `entry` - Its catalog row, `None` if it is not cataloged
/// * `saved` - Disposition captured at install time; `None` is treated as
///   the default action
pub fn resolve(
    signo: c_int,
    entry: Option<&CatalogEntry>,
    saved: Option<&SignalDisposition>,
) -> Resolution {
    let Some(entry) = entry else {
        return Resolution::ReraiseDefault;
    };
    let saved = saved.copied().unwrap_or_default();

    match saved.handler {
        PriorHandler::Default if entry.swallow_if_unclaimed => Resolution::Swallow,
        PriorHandler::Default => Resolution::ReraiseDefault,
        // The host chose to ignore it. Hardware faults cannot be ignored.
        PriorHandler::Ignore => match entry.class {
            SignalClass::Optional => Resolution::Swallow,
            SignalClass::Mandatory => Resolution::ReraiseDefault,
        },
        PriorHandler::Simple(f) => {
            Resolution::Chain(chain_plan(signo, ChainTarget::Simple(f), &saved))
        }
        PriorHandler::Extended(f) => {
            Resolution::Chain(chain_plan(signo, ChainTarget::Extended(f), &saved))
        }
    }
}

fn chain_plan(signo: c_int, target: ChainTarget, saved: &SignalDisposition) -> ChainPlan {
    let mut mask = saved.mask;
    // Block the signal during its own handler, as the kernel would
    if !saved.no_defer() {
        if let Ok(signal) = Signal::try_from(signo) {
            mask.add(signal);
        }
    }
    ChainPlan {
        target,
        mask,
        reset_after: saved.reset_on_delivery(),
    }
}

/// Carry out a resolution from inside the signal handler
pub(crate) fn apply(
    resolution: Resolution,
    signo: c_int,
    info: *mut siginfo_t,
    ucontext: *mut c_void,
) {
    match resolution {
        Resolution::Swallow => {}
        Resolution::ReraiseDefault => reraise_default(signo),
        Resolution::Chain(plan) => chain(&plan, signo, info, ucontext),
    }
}

/// Hand the signal to the kernel's default action
///
/// The translator is uninstalled for this signal first, so the re-raise
/// cannot come back here.
fn reraise_default(signo: c_int) {
    let Ok(signal) = Signal::try_from(signo) else {
        std::process::abort();
    };
    // SAFETY: installing SIG_DFL has no handler safety requirements
    if unsafe { signal::signal(signal, SigHandler::SigDfl) }.is_err() || raise(signal).is_err() {
        // Returning would re-run a faulting instruction forever
        std::process::abort();
    }
}

fn chain(plan: &ChainPlan, signo: c_int, info: *mut siginfo_t, ucontext: *mut c_void) {
    let previous_mask = plan.mask.thread_swap_mask(SigmaskHow::SIG_SETMASK).ok();

    match plan.target {
        ChainTarget::Extended(handler) => handler(signo, info, ucontext),
        ChainTarget::Simple(handler) => handler(signo),
    }

    if let Some(mask) = previous_mask {
        let _ = mask.thread_set_mask();
    }

    if plan.reset_after {
        if let Ok(signal) = Signal::try_from(signo) {
            // SAFETY: installing SIG_DFL has no handler safety requirements
            let _ = unsafe { signal::signal(signal, SigHandler::SigDfl) };
        }
    }
}
