//! Host-side hardware exception interception for enclave runtimes.
//!
//! When code running inside an enclave faults, the CPU exits to the host and
//! the kernel delivers an ordinary POSIX signal to the host process. This
//! crate owns that signal path:
//!
//! - Installs one multiplexing handler for a fixed catalog of signals,
//!   remembering whatever disposition each signal had before
//! - Translates every delivery into a fixed-layout [`ExceptionContext`] and
//!   hands it synchronously to the enclave runtime
//! - When the enclave declines the exception, swallows it, re-raises it with
//!   the default action, or chains to the previously installed handler
//!
//! The entry point is [`initialize_host_exception_interception`], called once
//! before any thread can enter the enclave.

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
compile_error!("enclave-host-signals supports Linux on x86_64 and aarch64 only");

pub mod arch_impl;
pub mod context;
pub mod error;
pub mod runtime;
pub mod signal;

pub use context::{ExceptionContext, RegisterSnapshot};
pub use error::InterceptError;
pub use runtime::{ExceptionVerdict, ForeignRuntime, IsolatedRuntime};
pub use signal::catalog::{SignalClass, MANDATORY_SIGNALS, OPTIONAL_SIGNALS};
pub use signal::registry::{
    initialize_host_exception_interception, try_initialize_host_exception_interception,
    Installation,
};
pub use signal::types::{PriorHandler, SignalDisposition};
