//! The link-time inputs of the boot sequence.

use core::fmt::{self, Display};

use arch::TrapVector;
use config::boot::BSS_WORD;

/// Errors in a boot layout. The sequence itself never checks these at runtime; they are
/// link-time contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// A bound that must be 8-byte aligned is not.
    Misaligned { what: &'static str, addr: usize },
    /// `.bss` ends before it starts.
    Inverted { start: usize, end: usize },
    /// The stack top lies inside `.bss`, so clearing would run over live stack.
    StackInsideBss { stack_end: usize },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutError::Misaligned { what, addr } => write!(f, "{what} {addr:#x} is misaligned"),
            LayoutError::Inverted { start, end } => {
                write!(f, "bss end {end:#x} is below start {start:#x}")
            }
            LayoutError::StackInsideBss { stack_end } => {
                write!(f, "stack end {stack_end:#x} lies inside bss")
            }
        }
    }
}

/// `[start, end)` of the zero-initialized statics.
///
/// `start >= end` is an empty region: clearing it writes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BssRegion {
    start: usize,
    end: usize,
}

impl BssRegion {
    /// Takes the bounds as the linker gave them.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Takes the bounds only if they are word aligned and ordered.
    pub fn checked(start: usize, end: usize) -> Result<Self, LayoutError> {
        if start % BSS_WORD != 0 {
            return Err(LayoutError::Misaligned {
                what: "bss start",
                addr: start,
            });
        }
        if end % BSS_WORD != 0 {
            return Err(LayoutError::Misaligned {
                what: "bss end",
                addr: end,
            });
        }
        if end < start {
            return Err(LayoutError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Size in bytes; zero for an empty region.
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr < self.end
    }
}

/// Every address the boot sequence needs, resolved at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootLayout {
    /// Loaded into `gp`.
    pub global_pointer: usize,
    pub bss: BssRegion,
    /// Initial `sp`. The stack grows down from here with no guard below it.
    pub stack_end: usize,
    /// Entered in machine mode with interrupts masked; returns.
    pub early_init: usize,
    /// Entered in supervisor mode with interrupts enabled; is not expected to return.
    pub main: usize,
    pub trap_vector: TrapVector,
}

impl BootLayout {
    pub fn validate(&self) -> Result<(), LayoutError> {
        BssRegion::checked(self.bss.start, self.bss.end)?;
        // A stack top equal to `bss.start` is fine: the first push lands below it.
        if self.bss.start < self.stack_end && self.stack_end <= self.bss.end {
            return Err(LayoutError::StackInsideBss {
                stack_end: self.stack_end,
            });
        }
        if !self.trap_vector.is_aligned() {
            return Err(LayoutError::Misaligned {
                what: "trap vector",
                addr: self.trap_vector.address,
            });
        }
        Ok(())
    }
}
