use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use simple_logger::SimpleLogger;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use time::macros::format_description;
use time::OffsetDateTime;

/// Console logging through `simple_logger`, mirrored line by line into a log file.
struct RunLogger {
    console: SimpleLogger,
    file: Option<Mutex<BufWriter<File>>>,
    level: LevelFilter,
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.console.log(record);

        if let Some(file) = &self.file {
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            let timestamp = now
                .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
                .unwrap_or_default();
            if let Ok(mut writer) = file.lock() {
                let _ = writeln!(writer, "{} - {} - {}", timestamp, record.level(), record.args());
                let _ = writer.flush();
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            if let Ok(mut writer) = file.lock() {
                let _ = writer.flush();
            }
        }
    }
}

pub fn parse_level(log_level_str: &str) -> LevelFilter {
    match log_level_str.to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        other => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", other);
            LevelFilter::Info
        }
    }
}

/// Installs the global logger. The log file, when given, is truncated.
pub fn setup_logging(log_level_str: &str, log_file: Option<&Path>) -> Result<()> {
    let level = parse_level(log_level_str);

    let console = SimpleLogger::new()
        .with_level(level)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"));

    let file = match log_file {
        Some(path) => {
            let handle = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            Some(Mutex::new(BufWriter::new(handle)))
        }
        None => None,
    };

    log::set_boxed_logger(Box::new(RunLogger { console, file, level }))
        .context("Logger already initialized")?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("Warning"), LevelFilter::Warn);
        assert_eq!(parse_level("ERROR"), LevelFilter::Error);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }
}
