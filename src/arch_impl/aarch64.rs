//! aarch64 Linux machine context.

use libc::ucontext_t;

use super::traits::MachineContext;

impl MachineContext for ucontext_t {
    #[inline]
    fn instruction_pointer(&self) -> u64 {
        self.uc_mcontext.pc
    }

    #[inline]
    fn accumulator(&self) -> u64 {
        self.uc_mcontext.regs[0]
    }

    #[inline]
    fn base(&self) -> u64 {
        self.uc_mcontext.regs[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch_impl::snapshot;

    #[test]
    fn reads_pc_and_x0_x1() {
        // SAFETY: ucontext_t is plain data; all-zero is a valid value
        let mut context: ucontext_t = unsafe { core::mem::zeroed() };
        context.uc_mcontext.pc = 0xffff_0000_4000;
        context.uc_mcontext.regs[0] = 7;
        context.uc_mcontext.regs[1] = 9;

        let regs = unsafe { snapshot(&context as *const ucontext_t as *const _) };
        assert_eq!(regs.program_counter, 0xffff_0000_4000);
        assert_eq!(regs.accumulator, 7);
        assert_eq!(regs.base, 9);
    }
}
