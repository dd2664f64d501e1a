//! Constants of the reset sequence itself.

/// The only hart that performs one-time setup. Every other hart parks.
pub const BOOT_HART_ID: usize = 0;

/// Granularity of the BSS clearing loop, in bytes.
pub const BSS_WORD: usize = 8;

/// Required alignment of the trap vector base in Direct mode.
pub const TRAP_VECTOR_ALIGN: usize = 4;

/// Upper bound written to `pmpaddr0` for the boot-time PMP entry.
///
/// `pmpaddr` holds bits 55..2 of a physical address on RV64, so 54 set bits is the
/// broadest top-of-range bound the register can represent.
pub const PMP_ADDR_ALL: usize = usize::MAX >> 10;
