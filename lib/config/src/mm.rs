//! Module defining constants related to the memory layout of the boot image.

/// Start of physical memory
pub const RAM_START: usize = 0x8000_0000;

/// Address the reset vector is placed at. QEMU `virt` jumps here with `-bios none`.
pub const KERNEL_START_PHYS: usize = RAM_START;

/// Size of the boot hart's stack. The linker script reserves it right after `.bss`.
pub const BOOT_STACK_SIZE: usize = 64 * 1024;

// The addresses below come from `kernel/linker.ld`. They only exist in the final
// image, so the accessors are only compiled for bare-metal targets.

/// Value loaded into `gp`.
#[cfg(target_os = "none")]
pub fn global_pointer() -> usize {
    __global_pointer as usize
}
/// Start of the bss section, 8-byte aligned
#[cfg(target_os = "none")]
pub fn bss_start() -> usize {
    _bss_start as usize
}
/// End of the bss section, 8-byte aligned
#[cfg(target_os = "none")]
pub fn bss_end() -> usize {
    _bss_end as usize
}
/// Upper bound of the boot stack
#[cfg(target_os = "none")]
pub fn stack_end() -> usize {
    _stack_end as usize
}

#[cfg(target_os = "none")]
unsafe extern "C" {
    #[link_name = "__global_pointer$"]
    fn __global_pointer();
    fn _bss_start();
    fn _bss_end();
    fn _stack_end();
}
