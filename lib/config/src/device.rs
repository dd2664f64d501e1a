/// Base address of the 16550 UART on the QEMU `virt` board.
pub const UART_BASE: usize = 0x1000_0000;

/// Base address of the core-local interruptor.
pub const CLINT_BASE: usize = 0x0200_0000;
/// `mtimecmp` of hart 0.
pub const CLINT_MTIMECMP: usize = CLINT_BASE + 0x4000;
