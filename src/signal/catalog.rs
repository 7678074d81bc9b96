//! Catalog of intercepted signals and their forwarding policy

use nix::sys::signal::Signal;

/// How a signal relates to enclave execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass {
    /// Raised by hardware faults the enclave hardware can report.
    /// Always intercepted.
    Mandatory,
    /// Asynchronous process signals the enclave may opt into. When the
    /// enclave declines one and the host never installed a handler, the
    /// delivery is dropped as if it had never been intercepted.
    Optional,
}

/// One row of the interception table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The signal this row describes
    pub signal: Signal,
    /// Mandatory or optional forwarding
    pub class: SignalClass,
    /// Whether the enclave sees the real signal number.
    ///
    /// Enclave faults reach the host mainly as SIGSEGV; the other fault
    /// signals arrive incidentally and are reported as 0.
    pub reports_signal_number: bool,
    /// Drop the delivery when the enclave declines it and the saved
    /// disposition is the default action
    pub swallow_if_unclaimed: bool,
}

impl CatalogEntry {
    const fn mandatory(signal: Signal, reports_signal_number: bool) -> Self {
        CatalogEntry {
            signal,
            class: SignalClass::Mandatory,
            reports_signal_number,
            swallow_if_unclaimed: false,
        }
    }

    const fn optional(signal: Signal, swallow_if_unclaimed: bool) -> Self {
        CatalogEntry {
            signal,
            class: SignalClass::Optional,
            reports_signal_number: true,
            swallow_if_unclaimed,
        }
    }

    /// The number reported to the enclave for this signal
    #[inline]
    pub const fn reported_signal_number(&self) -> u64 {
        if self.reports_signal_number {
            self.signal as i32 as u64
        } else {
            0
        }
    }
}

/// Number of rows in [`CATALOG`]
pub const CATALOG_LEN: usize = 12;

/// The full interception table. Row order is also the registry slot order.
pub const CATALOG: [CatalogEntry; CATALOG_LEN] = [
    CatalogEntry::mandatory(Signal::SIGBUS, false),
    CatalogEntry::mandatory(Signal::SIGFPE, false),
    CatalogEntry::mandatory(Signal::SIGILL, false),
    CatalogEntry::mandatory(Signal::SIGSEGV, true),
    CatalogEntry::mandatory(Signal::SIGTRAP, false),
    CatalogEntry::optional(Signal::SIGHUP, true),
    // SIGABRT is expected to take the host down
    CatalogEntry::optional(Signal::SIGABRT, false),
    CatalogEntry::optional(Signal::SIGALRM, true),
    CatalogEntry::optional(Signal::SIGPIPE, true),
    // SIGPOLL is SIGIO on Linux
    CatalogEntry::optional(Signal::SIGIO, true),
    CatalogEntry::optional(Signal::SIGUSR1, true),
    CatalogEntry::optional(Signal::SIGUSR2, true),
];

/// Signals raised by hardware faults
pub const MANDATORY_SIGNALS: [Signal; 5] = [
    Signal::SIGBUS,
    Signal::SIGFPE,
    Signal::SIGILL,
    Signal::SIGSEGV,
    Signal::SIGTRAP,
];

/// Signals forwarded only when the enclave opts in
pub const OPTIONAL_SIGNALS: [Signal; 7] = [
    Signal::SIGHUP,
    Signal::SIGABRT,
    Signal::SIGALRM,
    Signal::SIGPIPE,
    Signal::SIGIO,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
];

/// Registry slot for a raw signal number, if it is in the catalog
#[inline]
pub const fn slot_of(signo: libc::c_int) -> Option<usize> {
    match signo {
        libc::SIGBUS => Some(0),
        libc::SIGFPE => Some(1),
        libc::SIGILL => Some(2),
        libc::SIGSEGV => Some(3),
        libc::SIGTRAP => Some(4),
        libc::SIGHUP => Some(5),
        libc::SIGABRT => Some(6),
        libc::SIGALRM => Some(7),
        libc::SIGPIPE => Some(8),
        libc::SIGIO => Some(9),
        libc::SIGUSR1 => Some(10),
        libc::SIGUSR2 => Some(11),
        _ => None,
    }
}

/// Look up the catalog row for a raw signal number
///
/// Returns `None` for signals this crate never intercepts.
#[inline]
pub fn lookup(signo: libc::c_int) -> Option<&'static CatalogEntry> {
    slot_of(signo).map(|slot| &CATALOG[slot])
}

/// Iterate every row the installer covers, with its registry slot
pub fn intercepted() -> impl Iterator<Item = (usize, &'static CatalogEntry)> {
    CATALOG.iter().enumerate()
}

/// Get signal name for logging
pub fn signal_name(signo: libc::c_int) -> &'static str {
    match lookup(signo) {
        Some(entry) if entry.signal == Signal::SIGIO => "SIGPOLL",
        Some(entry) => entry.signal.as_str(),
        None => "UNKNOWN",
    }
}
