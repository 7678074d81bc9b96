//! Registry of pre-existing dispositions and the one-time installer
//!
//! Installation swaps the translator onto every cataloged signal and keeps
//! whatever was there before, one slot per catalog row. Slots are written
//! once during installation and only read afterwards, so the signal path
//! never takes a lock.

use core::sync::atomic::{AtomicU8, Ordering};

use conquer_once::spin::OnceCell;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow};

use super::catalog::{self, CATALOG_LEN};
use super::translator;
use super::types::SignalDisposition;
use crate::error::InterceptError;
use crate::runtime::IsolatedRuntime;

/// Dispositions saved at install time, indexed by catalog slot
static REGISTRY: [OnceCell<SignalDisposition>; CATALOG_LEN] =
    [const { OnceCell::uninit() }; CATALOG_LEN];

/// Enclave runtime the translator submits to
static RUNTIME: OnceCell<&'static dyn IsolatedRuntime> = OnceCell::uninit();

const STATE_UNINIT: u8 = 0;
const STATE_INSTALLING: u8 = 1;
const STATE_INSTALLED: u8 = 2;
const STATE_FAILED: u8 = 3;

static STATE: AtomicU8 = AtomicU8::new(STATE_UNINIT);

/// Result of a successful installer call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    /// Handlers were installed by this call
    Installed,
    /// An earlier call already installed them; nothing changed
    AlreadyInstalled,
}

/// Arm enclave exception interception for this process
///
/// Must run once, before any thread can enter the enclave. For every
/// cataloged signal this captures the current disposition and installs the
/// translator with `SA_SIGINFO | SA_NODEFER | SA_RESTART`. The handler mask
/// is the caller's signal mask with the catalog signals removed.
///
/// Cataloged signals are blocked on the calling thread until every saved
/// disposition is recorded, and the caller's mask is restored on return.
/// Other threads are not covered: a cataloged signal they take during
/// installation may resolve as if its previous disposition were the
/// default action.
///
/// Any failure aborts the process. Calling it again after a successful
/// installation does nothing.
pub fn initialize_host_exception_interception(runtime: &'static dyn IsolatedRuntime) {
    if let Err(e) = try_initialize_host_exception_interception(runtime) {
        log::error!("Enclave exception interception could not be installed: {}", e);
        std::process::abort();
    }
}

/// Non-aborting form of [`initialize_host_exception_interception`]
///
/// # Returns
/// * `Ok(Installation::Installed)` on the first successful call
/// * `Ok(Installation::AlreadyInstalled)` on later calls; the runtime
///   argument is ignored and the saved dispositions are left untouched
/// * `Err(_)` if any registration failed. Signals registered before the
///   failure stay intercepted and the layer is unusable.
pub fn try_initialize_host_exception_interception(
    runtime: &'static dyn IsolatedRuntime,
) -> Result<Installation, InterceptError> {
    match STATE.compare_exchange(
        STATE_UNINIT,
        STATE_INSTALLING,
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => {}
        Err(STATE_INSTALLED) => {
            log::warn!("Enclave exception interception already installed; ignoring repeat call");
            return Ok(Installation::AlreadyInstalled);
        }
        Err(_) => return Err(InterceptError::Incomplete),
    }

    match install(runtime) {
        Ok(()) => {
            STATE.store(STATE_INSTALLED, Ordering::Release);
            Ok(Installation::Installed)
        }
        Err(e) => {
            STATE.store(STATE_FAILED, Ordering::Release);
            Err(e)
        }
    }
}

fn install(runtime: &'static dyn IsolatedRuntime) -> Result<(), InterceptError> {
    RUNTIME.init_once(|| runtime);

    let mut cataloged = SigSet::empty();
    for (_, entry) in catalog::intercepted() {
        cataloged.add(entry.signal);
    }

    // Hold cataloged signals on this thread until every slot is written
    let caller_mask = cataloged
        .thread_swap_mask(SigmaskHow::SIG_BLOCK)
        .map_err(InterceptError::MaskQuery)?;

    // Honor the caller's mask, but never hold back a cataloged signal
    // while the translator runs.
    let mut handler_mask = caller_mask;
    for (_, entry) in catalog::intercepted() {
        handler_mask.remove(entry.signal);
    }

    let registered = register_all(SigAction::new(
        SigHandler::SigAction(translator::handle_signal),
        SaFlags::SA_SIGINFO | SaFlags::SA_NODEFER | SaFlags::SA_RESTART,
        handler_mask,
    ));

    // Anything that arrived meanwhile is delivered here, against a full registry
    let restored = caller_mask.thread_set_mask().map_err(InterceptError::MaskQuery);
    registered?;
    restored?;

    log::info!(
        "Enclave exception interception installed for {} signals",
        catalog::intercepted().count()
    );
    Ok(())
}

fn register_all(action: SigAction) -> Result<(), InterceptError> {
    for (slot, entry) in catalog::intercepted() {
        // SAFETY: the translator is async-signal-safe and only reads state
        // that is fully written before it can observe it
        let previous = unsafe { sigaction(entry.signal, &action) }.map_err(|source| {
            InterceptError::Register {
                signal: catalog::signal_name(entry.signal as i32),
                source,
            }
        })?;

        let saved = SignalDisposition::from(previous);
        log::debug!(
            "Intercepting {} ({:?}), previous handler {:?}, flags {:?}",
            catalog::signal_name(entry.signal as i32),
            entry.class,
            saved.handler,
            saved.flags
        );
        REGISTRY[slot].init_once(|| saved);
    }
    Ok(())
}

/// Check whether installation has completed
#[inline]
pub fn is_installed() -> bool {
    STATE.load(Ordering::Acquire) == STATE_INSTALLED
}

/// Disposition a signal had before interception
///
/// Returns `None` for signals outside the catalog, or before installation.
/// Safe to call from a signal handler.
#[inline]
pub fn saved_disposition(signo: libc::c_int) -> Option<SignalDisposition> {
    catalog::slot_of(signo).and_then(|slot| REGISTRY[slot].get().copied())
}

/// The bound enclave runtime, if installation has started
#[inline]
pub(crate) fn runtime() -> Option<&'static dyn IsolatedRuntime> {
    RUNTIME.get().copied()
}
