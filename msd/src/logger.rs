use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

static LOGGER: Logger = Logger;

/// Installs the process wide logger. `verbosity` counts `-v` occurrences.
pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    Ok(())
}

/// Prints info records plain on stdout and everything else labelled on
/// stderr, so decrypted file listings stay pipeable.
struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if log::max_level() >= LevelFilter::Debug {
            let location = match (record.file(), record.line()) {
                (Some(file), Some(line)) => format!("[{}:{}]", file, line).dimmed(),
                _ => "[unk]".dimmed(),
            };
            eprintln!("{} {} {}", label(record.level()), location, record.args());
        } else if record.level() == Level::Info {
            println!("{}", record.args());
        } else {
            eprintln!("{} {}", label(record.level()), record.args());
        }
    }

    fn flush(&self) {}
}

fn label(level: Level) -> ColoredString {
    match level {
        Level::Debug => "debug:".bold().blue(),
        Level::Error => "error:".bold().red(),
        Level::Info => "info:".bold().green(),
        Level::Trace => "trace:".bold().purple(),
        Level::Warn => "warning:".bold().yellow(),
    }
}
