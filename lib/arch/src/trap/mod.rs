use core::fmt;

use bit_field::BitField;
use config::boot::TRAP_VECTOR_ALIGN;
use strum::{Display, FromRepr};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        mod riscv64;
        pub use riscv64::*;
    }
}

/// An abstract representation of the trap mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapMode {
    /// Traps into a specific address.
    Direct,
    /// Traps into a vector table.
    Vectored,
}

/// The value installed into `mtvec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapVector {
    pub address: usize,
    pub mode: TrapMode,
}

impl TrapVector {
    pub const fn direct(address: usize) -> Self {
        Self {
            address,
            mode: TrapMode::Direct,
        }
    }

    /// Whether `address` satisfies the base alignment `mtvec` requires.
    pub const fn is_aligned(&self) -> bool {
        self.address % TRAP_VECTOR_ALIGN == 0
    }

    pub fn bits(&self) -> usize {
        let mode = match self.mode {
            TrapMode::Direct => 0,
            TrapMode::Vectored => 1,
        };
        self.address | mode
    }
}

/// Asynchronous trap causes.
#[derive(FromRepr, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Interrupt {
    SupervisorSoft = 1,
    MachineSoft = 3,
    SupervisorTimer = 5,
    MachineTimer = 7,
    SupervisorExternal = 9,
    MachineExternal = 11,
}

/// Synchronous trap causes.
#[derive(FromRepr, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Exception {
    InstructionMisaligned = 0,
    InstructionFault = 1,
    IllegalInstruction = 2,
    Breakpoint = 3,
    LoadMisaligned = 4,
    LoadFault = 5,
    StoreMisaligned = 6,
    StoreFault = 7,
    UserEnvCall = 8,
    SupervisorEnvCall = 9,
    MachineEnvCall = 11,
    InstructionPageFault = 12,
    LoadPageFault = 13,
    StorePageFault = 15,
}

/// A decoded `mcause`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapCause {
    Interrupt(Interrupt),
    Exception(Exception),
    Unknown { interrupt: bool, code: usize },
}

impl TrapCause {
    pub fn from_bits(mcause: usize) -> Self {
        // The trap is async if the top bit of the cause register is set.
        let interrupt = mcause.get_bit(usize::BITS as usize - 1);
        let code = mcause.get_bits(0..usize::BITS as usize - 1);
        let decoded = if interrupt {
            Interrupt::from_repr(code).map(Self::Interrupt)
        } else {
            Exception::from_repr(code).map(Self::Exception)
        };
        decoded.unwrap_or(Self::Unknown { interrupt, code })
    }

    pub fn is_interrupt(&self) -> bool {
        match self {
            Self::Interrupt(_) => true,
            Self::Exception(_) => false,
            Self::Unknown { interrupt, .. } => *interrupt,
        }
    }
}

impl fmt::Display for TrapCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Interrupt(irq) => write!(f, "interrupt {irq}"),
            Self::Exception(exc) => write!(f, "exception {exc}"),
            Self::Unknown { interrupt: true, code } => write!(f, "unknown interrupt {code}"),
            Self::Unknown { interrupt: false, code } => write!(f, "unknown exception {code}"),
        }
    }
}
