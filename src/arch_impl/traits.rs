//! Architecture-agnostic traits for machine contexts.

use crate::context::RegisterSnapshot;

/// Saved CPU state handed to a signal handler.
///
/// Each architecture implements this for its `ucontext_t`.
pub trait MachineContext {
    /// Returns the instruction pointer (RIP on x86, PC on ARM).
    fn instruction_pointer(&self) -> u64;

    /// Returns the first general-purpose register (RAX on x86, X0 on ARM).
    fn accumulator(&self) -> u64;

    /// Returns the second fault-relevant register (RBX on x86, X1 on ARM).
    fn base(&self) -> u64;

    /// Collects the named registers the enclave runtime consumes.
    #[inline]
    fn register_snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            program_counter: self.instruction_pointer(),
            accumulator: self.accumulator(),
            base: self.base(),
        }
    }
}
