use riscv::register::mtvec::{self, Mtvec, TrapMode as RiscvTrapMode};

use super::{TrapMode, TrapVector};

impl From<TrapMode> for RiscvTrapMode {
    fn from(mode: TrapMode) -> Self {
        match mode {
            TrapMode::Direct => RiscvTrapMode::Direct,
            TrapMode::Vectored => RiscvTrapMode::Vectored,
        }
    }
}

/// Set the machine trap vector.
///
/// # Safety
/// Must run in machine mode. `vector.address` must point at code able to handle any
/// trap taken on this hart from now on.
pub unsafe fn set_trap_vector(vector: TrapVector) {
    let mut mtvec = Mtvec::from_bits(0);
    mtvec.set_address(vector.address);
    mtvec.set_trap_mode(vector.mode.into());
    unsafe {
        mtvec::write(mtvec);
    }
}
