#![no_std]

pub mod boot;
pub mod device;
pub mod mm;
