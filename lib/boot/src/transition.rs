//! Entering a routine through `mret`.
//!
//! Both privilege transitions of the boot sequence are the same register choreography
//! with different values, so they are described as a [`Transition`] and carried out by
//! one [`enter`].

use core::ops::ControlFlow;

use arch::{
    AddressMatching, HartContext, InterruptMask, PmpConfig, PmpEntry, PmpPermissions,
    PrivilegeMode, Resume, Status, StatusFlags, TrapVector,
};
use config::boot::PMP_ADDR_ALL;

use crate::layout::BootLayout;

/// `mstatus` for the early init routine: it runs in machine mode and `mret` turns
/// `MIE` on, while `mie` keeps every source masked.
pub const EARLY_INIT_STATUS: Status = Status::new(
    PrivilegeMode::Machine,
    StatusFlags::MPIE.union(StatusFlags::MIE),
);

/// `mstatus` for the main routine: supervisor mode, interrupts live after `mret`.
pub const MAIN_STATUS: Status = Status::new(
    PrivilegeMode::Supervisor,
    StatusFlags::MPIE.union(StatusFlags::SPIE),
);

/// Sources unmasked for the main routine: software, timer and external.
pub const MAIN_INTERRUPTS: InterruptMask = InterruptMask::MSIE
    .union(InterruptMask::MTIE)
    .union(InterruptMask::MEIE);

/// Read/write/execute over the whole address space, unlocked.
pub const OPEN_PMP: PmpEntry = PmpEntry {
    config: PmpConfig {
        permissions: PmpPermissions::all(),
        matching: AddressMatching::Tor,
        locked: false,
    },
    address: PMP_ADDR_ALL,
};

/// One `mret` into a routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// `mstatus` before `mret`; its `MPP` is the privilege the routine runs in.
    pub status: Status,
    pub entry: usize,
    /// All of `mie` is cleared instead of unmasking [`MAIN_INTERRUPTS`].
    pub interrupts_masked: bool,
    /// Where the routine goes when it returns.
    pub resume: Resume,
    /// Installed before interrupts are touched, if set.
    pub trap_vector: Option<TrapVector>,
    /// Programmed after interrupts, if set.
    pub pmp: Option<PmpEntry>,
}

impl Transition {
    /// Operation 6: machine mode, masked, comes back to the sequencer.
    pub fn early_init(layout: &BootLayout) -> Self {
        Self {
            status: EARLY_INIT_STATUS,
            entry: layout.early_init,
            interrupts_masked: true,
            resume: Resume::Caller,
            trap_vector: Some(layout.trap_vector),
            pmp: None,
        }
    }

    /// Operation 7: supervisor mode, unmasked, returns into the idle loop.
    pub fn main(layout: &BootLayout) -> Self {
        Self {
            status: MAIN_STATUS,
            entry: layout.main,
            interrupts_masked: false,
            resume: Resume::Idle,
            trap_vector: None,
            pmp: Some(OPEN_PMP),
        }
    }

    pub fn mode(&self) -> PrivilegeMode {
        self.status.previous
    }

    pub fn interrupt_enable(&self) -> InterruptMask {
        if self.interrupts_masked {
            InterruptMask::empty()
        } else {
            MAIN_INTERRUPTS
        }
    }
}

/// Writes the registers `transition` describes and executes `mret`.
///
/// Returns `Continue` once a [`Resume::Caller`] routine returns. A [`Resume::Idle`]
/// routine does not come back here on hardware.
///
/// # Safety
/// Must run in machine mode with `transition.entry` pointing at a routine that is
/// valid to enter in `transition.mode()`.
pub unsafe fn enter<H: HartContext>(hart: &mut H, transition: &Transition) -> ControlFlow<H::Halt> {
    log::trace!(
        "hart {}: mret to {:#x} in {:?} mode",
        hart.hart_id(),
        transition.entry,
        transition.mode()
    );
    unsafe {
        hart.write_status(transition.status);
        hart.write_epc(transition.entry);
        if let Some(vector) = transition.trap_vector {
            hart.write_trap_vector(vector);
        }
        hart.write_interrupt_enable(transition.interrupt_enable());
        if let Some(pmp) = transition.pmp {
            hart.write_pmp(pmp);
        }
        hart.privilege_return(transition.resume)
    }
}
