//! Default early init routine.

use core::ptr;

use config::device::CLINT_MTIMECMP;
use riscv::register::mhartid;

use crate::{console, handoff};

#[unsafe(no_mangle)]
pub extern "C" fn kinit() {
    console::init();
    logger::init();

    // `mtimecmp` is not reset to a known value; keep the machine timer quiet until the
    // main routine programs it.
    // SAFETY: CLINT is identity mapped and this is hart 0's comparator.
    unsafe { ptr::write_volatile(CLINT_MTIMECMP as *mut u64, u64::MAX) };

    let layout = handoff::boot_layout();
    log::info!("hart {}: early init", mhartid::read());
    log::info!(".bss {:#x} - {:#x}", layout.bss.start(), layout.bss.end());
    log::info!("boot stack top {:#x}", layout.stack_end);
    log::info!("global pointer {:#x}", layout.global_pointer);
    log::info!("trap vector {:#x}", layout.trap_vector.address);
    log::info!("main routine {:#x}", layout.main);
    if let Err(err) = layout.validate() {
        log::error!("boot layout: {}", err);
    }
}
