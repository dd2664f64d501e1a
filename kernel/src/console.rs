use core::fmt;

use config::device::UART_BASE;
use driver::Console;
use uart_16550::MmioSerialPort;

static CONSOLE: Console<MmioSerialPort> = Console::new();

pub fn init() {
    // SAFETY: `UART_BASE` is the board's 16550, reachable with translation off.
    let mut port = unsafe { MmioSerialPort::new(UART_BASE) };
    port.init();
    CONSOLE.install(port);
}

/// Prints to the console once it is up; before that output is dropped.
pub fn print(args: fmt::Arguments) {
    CONSOLE.print(args);
}

/// Frees the console for a handler that never returns to the code it interrupted.
///
/// # Safety
/// See [`Console::reclaim`].
pub unsafe fn reclaim() {
    // SAFETY: forwarded from the caller.
    if unsafe { CONSOLE.reclaim() } {
        print(format_args!("\n"));
    }
}

#[macro_export]
macro_rules! print {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!($fmt $(, $($arg)+)?))
    }
}

#[macro_export]
macro_rules! println {
    ($fmt: literal $(, $($arg: tt)+)?) => {
        $crate::console::print(format_args!(concat!($fmt, "\n") $(, $($arg)+)?))
    }
}
