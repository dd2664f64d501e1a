//! The reset sequence of the boot hart.
//!
//! [`Sequencer`] takes one hart from reset to supervisor-mode execution of the main
//! routine: hart election, the stackless prologue (translation off, `gp`, `.bss`,
//! stack), then two `mret` transitions, first into the early init routine and then into
//! the main routine. Harts that lose the election, and the boot hart once the main
//! routine returns, park in the idle loop.

#![no_std]

pub mod layout;
pub mod sequencer;
pub mod stage;
pub mod transition;

pub use layout::{BootLayout, BssRegion, LayoutError};
pub use sequencer::{Sequencer, is_boot_hart};
pub use stage::BootStage;
pub use transition::{Transition, enter};
