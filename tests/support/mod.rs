//! Shared test infrastructure for the interception tests
//!
//! Each `tests/*.rs` file is its own process, so installation happens once
//! per file. Scenarios that end with the process being killed re-run the
//! current test binary filtered to a single child test and inspect how it
//! died.

#![allow(dead_code)]

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, Once};

use anyhow::{Context, Result};
use enclave_host_signals::{
    try_initialize_host_exception_interception, ExceptionContext, ExceptionVerdict, Installation,
    IsolatedRuntime,
};

/// Environment variable naming the child test that should actually run
pub const CHILD_ENV: &str = "ENCLAVE_HOST_SIGNALS_CHILD";

/// Stderr markers written from signal context
pub mod markers {
    pub const SUBMIT: &str = "MARKER: submit";
    pub const SUBMIT_SIG0: &str = "MARKER: submit sig=0";
    pub const SUBMIT_SEGV: &str = "MARKER: submit sig=11";
    pub const SURVIVED: &str = "MARKER: survived";
}

/// Enclave stand-in that records what it was given
pub struct RecordingRuntime {
    handled: AtomicBool,
    announce: AtomicBool,
    deliveries: AtomicUsize,
    last_signal: AtomicU64,
    last_pc: AtomicU64,
    last_address: AtomicU64,
}

impl RecordingRuntime {
    pub const fn new(verdict: ExceptionVerdict) -> Self {
        RecordingRuntime {
            handled: AtomicBool::new(matches!(verdict, ExceptionVerdict::Continue)),
            announce: AtomicBool::new(false),
            deliveries: AtomicUsize::new(0),
            last_signal: AtomicU64::new(u64::MAX),
            last_pc: AtomicU64::new(0),
            last_address: AtomicU64::new(0),
        }
    }

    /// Write a marker to stderr on every submission
    pub fn announce(&self) {
        self.announce.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.deliveries.store(0, Ordering::SeqCst);
        self.last_signal.store(u64::MAX, Ordering::SeqCst);
        self.last_pc.store(0, Ordering::SeqCst);
        self.last_address.store(0, Ordering::SeqCst);
    }

    pub fn deliveries(&self) -> usize {
        self.deliveries.load(Ordering::SeqCst)
    }

    pub fn last_signal(&self) -> u64 {
        self.last_signal.load(Ordering::SeqCst)
    }

    pub fn last_pc(&self) -> u64 {
        self.last_pc.load(Ordering::SeqCst)
    }

    pub fn last_address(&self) -> u64 {
        self.last_address.load(Ordering::SeqCst)
    }
}

impl IsolatedRuntime for RecordingRuntime {
    fn submit_host_exception(&self, context: ExceptionContext) -> ExceptionVerdict {
        self.deliveries.fetch_add(1, Ordering::SeqCst);
        self.last_signal.store(context.signal_number, Ordering::SeqCst);
        self.last_pc.store(context.rip, Ordering::SeqCst);
        self.last_address.store(context.faulting_address, Ordering::SeqCst);

        if self.announce.load(Ordering::SeqCst) {
            match context.signal_number {
                0 => write_marker(markers::SUBMIT_SIG0),
                11 => write_marker(markers::SUBMIT_SEGV),
                _ => write_marker(markers::SUBMIT),
            }
        }

        if self.handled.load(Ordering::SeqCst) {
            ExceptionVerdict::Continue
        } else {
            ExceptionVerdict::NotHandled
        }
    }
}

static INSTALL: Once = Once::new();
static SERIAL: Mutex<()> = Mutex::new(());

/// Run `setup`, then install interception bound to `runtime`, once per process
pub fn install_with(runtime: &'static dyn IsolatedRuntime, setup: impl FnOnce()) {
    INSTALL.call_once(|| {
        setup();
        let installation = try_initialize_host_exception_interception(runtime)
            .expect("interception should install");
        assert_eq!(installation, Installation::Installed);
    });
}

pub fn install(runtime: &'static dyn IsolatedRuntime) {
    install_with(runtime, || {});
}

/// Tests in one file share the runtime's counters; run them one at a time
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// Async-signal-safe write of one line to stderr
pub fn write_marker(marker: &str) {
    // SAFETY: write(2) on valid buffers is async-signal-safe
    unsafe {
        libc::write(2, marker.as_ptr().cast(), marker.len());
        libc::write(2, b"\n".as_ptr().cast(), 1);
    }
}

/// Current OS handler for `signo`, read without changing it
pub fn live_handler(signo: libc::c_int) -> libc::sighandler_t {
    live_action(signo).sa_sigaction
}

/// Current OS `struct sigaction` for `signo`
pub fn live_action(signo: libc::c_int) -> libc::sigaction {
    // SAFETY: a null new action only queries
    unsafe {
        let mut current: libc::sigaction = std::mem::zeroed();
        assert_eq!(libc::sigaction(signo, std::ptr::null(), &mut current), 0);
        current
    }
}

/// Whether `signo` is in a raw `sigset_t`
pub fn sigset_contains(set: &libc::sigset_t, signo: libc::c_int) -> bool {
    // SAFETY: set is a valid sigset_t
    unsafe { libc::sigismember(set, signo) == 1 }
}

/// Keep killed children from writing core files
pub fn disable_core_dumps() {
    let limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: valid rlimit pointer
    unsafe {
        libc::setrlimit(libc::RLIMIT_CORE, &limit);
    }
}

/// True when this process was spawned to run the child test `name`
pub fn is_child(name: &str) -> bool {
    std::env::var(CHILD_ENV).map_or(false, |v| v == name)
}

/// Result of a child run, containing output and helper methods
pub struct ChildRun {
    pub output: Output,
}

impl ChildRun {
    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Signal that terminated the child, if any
    pub fn terminating_signal(&self) -> Option<i32> {
        self.output.status.signal()
    }

    /// Count occurrences of a marker line in stderr
    pub fn count_marker(&self, marker: &str) -> usize {
        self.stderr_str()
            .lines()
            .filter(|line| line.trim_end() == marker)
            .count()
    }

    /// Assert that a marker appears exactly N times
    pub fn assert_count(&self, marker: &str, expected: usize) {
        let actual = self.count_marker(marker);
        assert_eq!(
            actual,
            expected,
            "expected {} occurrences of '{}', found {} in:\n{}",
            expected,
            marker,
            actual,
            self.stderr_str()
        );
    }

    /// Assert the child was killed by `signo`
    pub fn assert_killed_by(&self, signo: libc::c_int) {
        assert_eq!(
            self.terminating_signal(),
            Some(signo),
            "child exited with {:?}, stderr:\n{}",
            self.output.status,
            self.stderr_str()
        );
    }
}

/// Re-run this test binary with only the child test `name`
pub fn run_child(name: &str) -> Result<ChildRun> {
    let exe = std::env::current_exe().context("failed to locate test binary")?;
    let output = Command::new(exe)
        .args([name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, name)
        .output()
        .with_context(|| format!("failed to run child test {}", name))?;
    Ok(ChildRun { output })
}
