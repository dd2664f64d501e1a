#![no_std]
#![no_main]

mod console;
mod entry;
mod handoff;
mod init;
mod lang_item;
mod logging;
mod trap;

/// Default main routine.
///
/// Entered in supervisor mode with software, timer and external interrupts unmasked.
/// Returning parks the hart for good.
#[unsafe(no_mangle)]
pub extern "C" fn kmain() {
    log::info!("kmain: running in supervisor mode");
    log::warn!("kmain: nothing left to run, parking");
}
