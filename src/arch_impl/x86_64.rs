//! x86_64 Linux machine context.

use libc::{ucontext_t, REG_RAX, REG_RBX, REG_RIP};

use super::traits::MachineContext;

impl MachineContext for ucontext_t {
    #[inline]
    fn instruction_pointer(&self) -> u64 {
        self.uc_mcontext.gregs[REG_RIP as usize] as u64
    }

    #[inline]
    fn accumulator(&self) -> u64 {
        self.uc_mcontext.gregs[REG_RAX as usize] as u64
    }

    #[inline]
    fn base(&self) -> u64 {
        self.uc_mcontext.gregs[REG_RBX as usize] as u64
    }
}
