use core::panic::PanicInfo;

use arch::hart::park;

use crate::console;

#[panic_handler]
fn panic_handler(info: &PanicInfo) -> ! {
    // SAFETY: a panicking hart never returns to the panicking code.
    unsafe { console::reclaim() };
    log::error!("{}", info);
    // SAFETY: parking only stops this hart.
    unsafe { park() }
}
