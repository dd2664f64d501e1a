use core::arch::{asm, naked_asm};
use core::convert::Infallible;
use core::ops::ControlFlow;

use riscv::register::mie::{self, Mie};
use riscv::register::mstatus::{self, Mstatus};
use riscv::register::{mepc, mhartid, pmpaddr0, pmpcfg0};

use super::{HartContext, Resume};
use crate::csr::{InterruptMask, PmpEntry, Status};
use crate::trap::{self, TrapVector};

/// Parks the calling hart forever.
///
/// Runs without a stack, so it is also where harts that lose the election go straight
/// from the reset vector.
#[unsafe(naked)]
pub unsafe extern "C" fn park() -> ! {
    naked_asm!("1:", "wfi", "j 1b")
}

/// The machine-mode registers of the hart running the boot sequence.
pub struct MachineHart {
    _private: (),
}

impl MachineHart {
    /// # Safety
    /// The caller must be the boot sequence, in machine mode, after the reset vector has
    /// set up `gp`, `.bss` and the stack. Only one value may exist per hart.
    pub unsafe fn take() -> Self {
        Self { _private: () }
    }
}

impl HartContext for MachineHart {
    type Halt = Infallible;

    fn hart_id(&self) -> usize {
        mhartid::read()
    }

    unsafe fn write_status(&mut self, status: Status) {
        unsafe { mstatus::write(Mstatus::from_bits(status.bits())) }
    }

    unsafe fn write_epc(&mut self, entry: usize) {
        unsafe { mepc::write(entry) }
    }

    unsafe fn write_trap_vector(&mut self, vector: TrapVector) {
        unsafe { trap::set_trap_vector(vector) }
    }

    unsafe fn write_interrupt_enable(&mut self, mask: InterruptMask) {
        unsafe { mie::write(Mie::from_bits(mask.bits())) }
    }

    unsafe fn write_pmp(&mut self, entry: PmpEntry) {
        // Address first: the entry is live as soon as its A field is written.
        unsafe {
            pmpaddr0::write(entry.address);
            pmpcfg0::write(entry.cfg_bits());
        }
    }

    unsafe fn privilege_return(&mut self, resume: Resume) -> ControlFlow<Infallible> {
        match resume {
            // The entered routine is an ordinary `extern "C"` function: it comes back
            // through `ra` to the label below with callee-saved registers intact.
            Resume::Caller => unsafe {
                asm!("la ra, 1f", "mret", "1:", clobber_abi("C"));
            },
            Resume::Idle => unsafe {
                asm!("la ra, {park}", "mret", park = sym park, options(noreturn));
            },
        }
        ControlFlow::Continue(())
    }

    fn wait_for_interrupt(&mut self) -> ControlFlow<Infallible> {
        #[allow(unused_unsafe)]
        unsafe {
            riscv::asm::wfi();
        }
        ControlFlow::Continue(())
    }
}
