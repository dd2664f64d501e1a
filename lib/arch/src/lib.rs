#![no_std]

#[cfg(feature = "sim")]
extern crate alloc;

pub mod csr;
pub mod hart;
pub mod trap;

#[cfg(feature = "sim")]
pub mod sim;

pub use csr::{
    AddressMatching, InterruptMask, PmpConfig, PmpEntry, PmpPermissions, PrivilegeMode, Status,
    StatusFlags,
};
pub use hart::{HartContext, ResetContext, Resume};
pub use trap::{TrapCause, TrapMode, TrapVector};
