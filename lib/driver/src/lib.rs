#![no_std]

pub mod console;

pub use console::Console;
