//! Hand-off from the reset vector into the privilege descent.

use arch::TrapVector;
use arch::hart::MachineHart;
use boot::{BootLayout, BssRegion, Sequencer};
use config::mm::{bss_end, bss_start, global_pointer, stack_end};

// The collaborators are bound by symbol name, so a downstream image can supply its own.
unsafe extern "C" {
    /// Machine mode, interrupts masked; returns.
    fn kinit();
    /// Supervisor mode, interrupts enabled; not expected to return.
    fn kmain();
    fn trap_vector();
}

pub fn boot_layout() -> BootLayout {
    BootLayout {
        global_pointer: global_pointer(),
        bss: BssRegion::new(bss_start(), bss_end()),
        stack_end: stack_end(),
        early_init: kinit as usize,
        main: kmain as usize,
        trap_vector: TrapVector::direct(trap_vector as usize),
    }
}

/// Tail-called by `_start` on the boot hart, in machine mode, on the boot stack.
pub extern "C" fn boot_descend() -> ! {
    let layout = boot_layout();
    // SAFETY: only the elected hart reaches this point, once, after the prologue.
    let mut hart = unsafe { MachineHart::take() };
    match Sequencer::after_prologue(&mut hart, &layout).descend() {}
}
