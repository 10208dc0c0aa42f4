use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Keeps recent log records and echoes them to stderr
#[derive(Clone)]
pub struct StatusLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
}

impl StatusLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            max_entries,
            level,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.entries().clone()
    }

    /// Warnings and errors recorded so far
    pub fn problems(&self) -> Vec<LogEntry> {
        self.get_entries()
            .into_iter()
            .filter(|entry| entry.level <= Level::Warn)
            .collect()
    }
}

impl log::Log for StatusLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: format!("{}", record.args()),
        };
        eprintln!(
            "{} {:<5} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.message
        );

        let mut entries = self.entries();
        entries.push(entry);

        // Keep only the most recent entries
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(0..excess);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(logger: &StatusLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("test")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_keeps_most_recent_entries() {
        let logger = StatusLogger::new(2, LevelFilter::Info);
        record(&logger, Level::Info, "one");
        record(&logger, Level::Info, "two");
        record(&logger, Level::Warn, "three");

        let entries = logger.get_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "two");

        let problems = logger.problems();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "three");
    }

    #[test]
    fn test_filters_below_level() {
        let logger = StatusLogger::new(10, LevelFilter::Warn);
        record(&logger, Level::Info, "quiet");
        record(&logger, Level::Error, "loud");
        let entries = logger.get_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "loud");
    }
}
