//! A byte sink shared by every printer on the hart.

use core::fmt::{self, Write};

use spin::Mutex;

/// A serial port behind a spin lock. Output before [`Console::install`] is dropped.
pub struct Console<W> {
    port: Mutex<Option<W>>,
}

impl<W: Write> Console<W> {
    pub const fn new() -> Self {
        Self {
            port: Mutex::new(None),
        }
    }

    pub fn install(&self, port: W) {
        *self.port.lock() = Some(port);
    }

    pub fn print(&self, args: fmt::Arguments) {
        if let Some(port) = self.port.lock().as_mut() {
            let _ = port.write_fmt(args);
        }
    }

    /// Releases the lock if a print was cut short, so the caller can report.
    ///
    /// Returns whether the lock had to be taken back.
    ///
    /// # Safety
    /// Only for paths that never return to the code they interrupted, such as the fatal
    /// trap handler and the panic handler. Whoever held the lock must not touch the port
    /// again.
    pub unsafe fn reclaim(&self) -> bool {
        if !self.port.is_locked() {
            return false;
        }
        // SAFETY: the holder is suspended for good, per the caller.
        unsafe { self.port.force_unlock() };
        true
    }
}

impl<W: Write> Default for Console<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::mem;
    use std::string::String;

    use super::*;

    fn written(console: &Console<String>) -> String {
        console.port.lock().clone().unwrap_or_default()
    }

    #[test]
    fn output_before_install_is_dropped() {
        let console = Console::<String>::new();
        console.print(format_args!("lost"));
        console.install(String::new());
        console.print(format_args!("kept {}", 1));
        assert_eq!(written(&console), "kept 1");
    }

    #[test]
    fn reclaim_is_a_no_op_on_a_free_lock() {
        let console = Console::<String>::new();
        // SAFETY: nothing holds the lock.
        assert!(!unsafe { console.reclaim() });
        assert!(!console.port.is_locked());
    }

    #[test]
    fn print_gets_through_a_lock_held_by_an_interrupted_printer() {
        let console = Console::new();
        console.install(String::from("half a line"));
        // The interrupted printer's guard is never dropped.
        mem::forget(console.port.lock());
        assert!(console.port.try_lock().is_none());

        // SAFETY: the guard above is gone for good.
        assert!(unsafe { console.reclaim() });
        console.print(format_args!(" | trap report"));
        assert_eq!(written(&console), "half a line | trap report");
    }
}
