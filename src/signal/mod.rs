//! Signal interception for enclave exceptions
//!
//! This module implements the host half of enclave exception handling:
//! - The catalog of intercepted signals and their forwarding policy
//! - The registry of dispositions that existed before installation
//! - The translator installed as the signal handler
//! - The resolver deciding what happens when the enclave declines
//!
//! Everything reachable from [`translator`] runs inside a signal handler and
//! must stay async-signal-safe: no allocation, no locks, no logging.

pub mod catalog;
pub mod registry;
pub mod resolver;
pub mod translator;
pub mod types;

pub use types::*;
