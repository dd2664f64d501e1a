//! Default trap vector: report the trap and park the hart.
//!
//! Nothing is delegated, so every trap arrives here in machine mode, whichever mode
//! it was taken from.

use core::arch::naked_asm;

use arch::TrapCause;
use arch::hart::park;

use crate::console;

#[unsafe(naked)]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text.trap")]
pub unsafe extern "C" fn trap_vector() -> ! {
    naked_asm!(
        "csrr    a0, mcause",
        "csrr    a1, mepc",
        "csrr    a2, mtval",
        "tail    {handler}",
        handler = sym fatal_trap,
    )
}

extern "C" fn fatal_trap(mcause: usize, mepc: usize, mtval: usize) -> ! {
    // SAFETY: the trapped code is never resumed.
    unsafe { console::reclaim() };
    let cause = TrapCause::from_bits(mcause);
    log::error!("unhandled {} at {:#x}, mtval {:#x}", cause, mepc, mtval);
    // SAFETY: parking only stops this hart.
    unsafe { park() }
}
