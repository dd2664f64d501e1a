//! The hardware context of one hart during bring-up.
//!
//! A context value is owned by the sequence running on its hart and passed down by
//! `&mut`. There is no global accessor: nothing outside the boot sequence reads these
//! registers back.

use core::ops::ControlFlow;

use crate::csr::{InterruptMask, PmpEntry, Status};
use crate::trap::TrapVector;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        mod riscv64;
        pub use riscv64::*;
    }
}

/// Where `ra` points when `mret` enters a routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// The routine returns into the code that executed `mret`.
    Caller,
    /// The routine returns into the idle loop.
    Idle,
}

/// Register writes and control transfers the privilege descent needs.
///
/// Every method acts on the calling hart only. `Halt` is what a context yields when it
/// stops executing the sequence: hardware never stops, so it uses
/// [`Infallible`](core::convert::Infallible).
pub trait HartContext {
    type Halt;

    fn hart_id(&self) -> usize;

    /// # Safety
    /// Changes the privilege `mret` switches to and the global interrupt enables.
    unsafe fn write_status(&mut self, status: Status);

    /// # Safety
    /// `entry` becomes the target of the next `mret`.
    unsafe fn write_epc(&mut self, entry: usize);

    /// # Safety
    /// Every trap on this hart is redirected to `vector` from now on.
    unsafe fn write_trap_vector(&mut self, vector: TrapVector);

    /// # Safety
    /// Unmasking a source lets pending interrupts of that class trap immediately.
    unsafe fn write_interrupt_enable(&mut self, mask: InterruptMask);

    /// Programs PMP entry 0 and switches entries 1..8 off.
    ///
    /// # Safety
    /// Lower privilege levels lose access to memory `entry` does not cover.
    unsafe fn write_pmp(&mut self, entry: PmpEntry);

    /// Executes `mret` with `ra` set according to `resume`.
    ///
    /// With [`Resume::Caller`] this behaves like a call: it comes back once the entered
    /// routine returns. With [`Resume::Idle`] hardware never comes back.
    ///
    /// # Safety
    /// `mstatus` and `mepc` must describe a valid target.
    unsafe fn privilege_return(&mut self, resume: Resume) -> ControlFlow<Self::Halt>;

    fn wait_for_interrupt(&mut self) -> ControlFlow<Self::Halt>;
}

/// The stackless steps that run between reset and the first call.
///
/// On hardware these live in the reset vector itself, since no stack exists yet to run
/// Rust on. Simulated harts implement them so the whole sequence is testable.
pub trait ResetContext: HartContext {
    /// # Safety
    /// Switches address translation off (`satp` = Bare).
    unsafe fn disable_translation(&mut self);

    /// # Safety
    /// `gp` is the base of relaxed global addressing for all later code.
    unsafe fn load_global_pointer(&mut self, gp: usize);

    /// # Safety
    /// `addr` must be 8-byte aligned and writable.
    unsafe fn zero_word(&mut self, addr: usize);

    /// # Safety
    /// `sp` becomes the only stack of this hart.
    unsafe fn load_stack_pointer(&mut self, sp: usize);
}
