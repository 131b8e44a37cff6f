use crate::{Console, Writer};
use core::fmt::Write;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// [`log`] backend printing `"[LEVEL] target: message"` lines to a console.
///
/// The console is copied for every record, so it must be a cheap handle
/// (the BIOS console is a handful of bytes of configuration).
pub struct ConsoleLogger<C> {
    console: C,
    max_level: LevelFilter,
}

impl<C> ConsoleLogger<C>
where
    C: Console + Copy + Send + Sync + 'static,
{
    #[must_use]
    pub const fn new(console: C, max_level: LevelFilter) -> Self {
        Self { console, max_level }
    }

    /// Install as the global logger. Call this once during early setup.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl<C> Log for ConsoleLogger<C>
where
    C: Console + Copy + Send + Sync,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut console = self.console;
        // Best-effort: the console cannot fail.
        let _ = writeln!(
            Writer(&mut console),
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}
