// 📝 Progress Log
// Append-only milestone log: one `YYYY-MM-DD-HH-MM-SS: <message>` line per stage.
// Every line is mirrored to the `log` facade at info level.

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Format one log line (without the trailing newline)
pub fn format_entry(at: DateTime<Local>, message: &str) -> String {
    format!("{}: {}", at.format(TIMESTAMP_FORMAT), message)
}

#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with the current local time
    pub fn log(&self, message: &str) -> io::Result<()> {
        log::info!("{}", message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_entry(Local::now(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_format() {
        let at = Local.with_ymd_and_hms(2023, 9, 8, 9, 16, 35).unwrap();
        assert_eq!(
            format_entry(at, "Process Complete"),
            "2023-09-08-09-16-35: Process Complete"
        );
    }

    #[test]
    fn test_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code_log.txt");
        std::fs::write(&path, "earlier run\n").unwrap();

        let progress = ProgressLog::new(&path);
        progress.log("Data saved to CSV file").unwrap();
        progress.log("SQL Connection initiated").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier run");
        assert!(lines[1].ends_with(": Data saved to CSV file"));
        assert!(lines[2].ends_with(": SQL Connection initiated"));

        // YYYY-MM-DD-HH-MM-SS is 19 characters
        let stamp = &lines[1][..19];
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
    }
}
