//! Exception record handed to the enclave runtime

/// Registers the enclave runtime needs to recognize and retry a fault
///
/// Produced by the [`crate::arch_impl::MachineContext`] adapter. On x86_64,
/// `accumulator`/`base` are RAX/RBX, which hold the ENCLU leaf and TCS
/// address after an asynchronous enclave exit. On aarch64 they are X0/X1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// Address of the interrupted instruction
    pub program_counter: u64,
    /// RAX / X0
    pub accumulator: u64,
    /// RBX / X1
    pub base: u64,
}

/// Exception record passed across the enclave boundary
///
/// The layout is an ABI contract with the enclave runtime: five `u64`
/// fields in this order, 40 bytes total. Do not reorder.
///
/// Built fresh for each delivery and consumed by value, so it is
/// deliberately neither `Clone` nor `Copy`.
#[derive(Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ExceptionContext {
    pub rax: u64,
    pub rbx: u64,
    pub rip: u64,
    /// Real signal number, or 0 for fault signals other than SIGSEGV
    pub signal_number: u64,
    /// `si_addr`. For enclave page faults the hardware clears the low
    /// 12 bits; the value is passed through as delivered.
    pub faulting_address: u64,
}

impl ExceptionContext {
    /// Size of the wire structure in bytes
    pub const SIZE: usize = 40;

    pub fn new(registers: &RegisterSnapshot, signal_number: u64, faulting_address: u64) -> Self {
        ExceptionContext {
            rax: registers.accumulator,
            rbx: registers.base,
            rip: registers.program_counter,
            signal_number,
            faulting_address,
        }
    }
}
