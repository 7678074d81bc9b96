//! Installation error type.
//!
//! Only installation can fail in a reportable way. Everything on the signal
//! path is async-signal context and has no one to report to.

use nix::errno::Errno;
use thiserror::Error;

/// Why the interception layer could not be armed.
///
/// Every variant is fatal for [`crate::initialize_host_exception_interception`]:
/// a partly installed layer would break the enclave's fault semantics.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// Reading or changing the caller's signal mask failed.
    #[error("failed to update the thread signal mask: {0}")]
    MaskQuery(#[source] Errno),

    /// `sigaction` refused one of the catalog signals.
    #[error("failed to install handler for signal {signal}: {source}")]
    Register {
        signal: &'static str,
        #[source]
        source: Errno,
    },

    /// An earlier installation attempt failed part-way.
    #[error("a previous installation attempt did not complete")]
    Incomplete,
}
