//! Module for the entry point of the image.
//!
//! `_start` is placed at the load address and is the first code every hart runs after
//! reset. Nothing is defined yet except `mhartid` and `pc`, so it is written without a
//! stack:
//!
//! 1. every hart except the boot hart parks at once,
//! 2. address translation is switched off,
//! 3. `gp` is loaded,
//! 4. `.bss` is cleared word by word,
//! 5. `sp` is set to the top of the boot stack,
//!
//! after which the boot hart tail-calls [`boot_descend`] to run the privilege descent
//! in Rust.

use core::arch::naked_asm;

use arch::hart::park;
use config::boot::{BOOT_HART_ID, BSS_WORD};

use crate::handoff::boot_descend;

#[unsafe(naked)]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text.entry")]
unsafe extern "C" fn _start() -> ! {
    naked_asm!(
        // Losers of the election touch nothing shared.
        "
        csrr    t0, mhartid
        li      t1, {boot_hart}
        beq     t0, t1, 1f
        tail    {park}
    1:
        ",
        // satp = Bare
        "
        csrw    satp, zero
        ",
        // `gp` is the base of relaxed addressing; loading it through a relaxed `la`
        // would use the register being loaded.
        "
        .option push
        .option norelax
        la      gp, __global_pointer$
        .option pop
        ",
        // Empty or inverted bounds skip the loop entirely.
        "
        la      t0, _bss_start
        la      t1, _bss_end
        bgeu    t0, t1, 3f
    2:
        sd      zero, 0(t0)
        addi    t0, t0, {word}
        bltu    t0, t1, 2b
    3:
        ",
        "
        la      sp, _stack_end
        tail    {descend}
        ",
        boot_hart = const BOOT_HART_ID,
        word = const BSS_WORD,
        park = sym park,
        descend = sym boot_descend,
    )
}
