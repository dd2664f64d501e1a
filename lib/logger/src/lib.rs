#![no_std]

use crate_interface::call_interface;
use log::{Level, LevelFilter};

struct SimpleLogger;

/// Forwards every enabled record to whichever crate implements [`LogInterface`].
impl log::Log for SimpleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }
    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        call_interface!(LogInterface::print_log(record));
    }
    fn flush(&self) {}
}

/// Output side of the logger.
///
/// The image implements it with `#[crate_interface::impl_interface]`, so this crate
/// does not depend on any console driver.
#[crate_interface::def_interface]
pub trait LogInterface: Send + Sync {
    fn print_log(record: &log::Record);
}

/// Installs the logger with the level chosen at build time through `LOG`.
///
/// Until this runs every `log` macro is a no-op, which is what the code before the
/// early init routine relies on.
pub fn init() {
    static LOGGER: SimpleLogger = SimpleLogger;
    log::set_logger(&LOGGER).ok();
    log::set_max_level(level_filter(option_env!("LOG")));
}

pub fn level_filter(level: Option<&str>) -> LevelFilter {
    match level {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

/// ANSI color code for a level.
pub fn level2color(level: Level) -> u8 {
    match level {
        Level::Error => 31, // Red
        Level::Warn => 93,  // BrightYellow
        Level::Info => 36,  // Blue
        Level::Debug => 32, // Green
        Level::Trace => 90, // BrightBlack
    }
}
