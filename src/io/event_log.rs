//! Append-only CSV log of periodic snapshots.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::sim::types::{ChargingLabels, PERSIST_DECIMALS, Snapshot};

use super::error::PersistResult;

/// Timestamp format of the first log column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Columns always present.
const BASE_HEADER: [&str; 5] = [
    "timestamp",
    "current_price",
    "charging",
    "battery_capacity_kwh",
    "battery_capacity_percent",
];

/// Columns present when consumption logging is enabled.
const CONSUMPTION_HEADER: [&str; 2] = ["facility_consumption_rate", "total_consumption_kwh"];

/// Appends one CSV row per call to a log file that is never truncated.
///
/// The header row is written only when the file does not exist yet.
#[derive(Debug, Clone)]
pub struct EventLogger {
    path: PathBuf,
    labels: ChargingLabels,
    include_consumption: bool,
}

impl EventLogger {
    /// Creates a logger writing to `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Log file path
    /// * `labels` - Charging flag rendering
    /// * `include_consumption` - Append consumption rate and total columns
    pub fn new(path: impl Into<PathBuf>, labels: ChargingLabels, include_consumption: bool) -> Self {
        Self {
            path: path.into(),
            labels,
            include_consumption,
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header columns in output order.
    pub fn header(&self) -> Vec<&'static str> {
        let mut cols = BASE_HEADER.to_vec();
        if self.include_consumption {
            cols.extend(CONSUMPTION_HEADER);
        }
        cols
    }

    /// Appends one row for `snapshot` stamped with `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns a `PersistError` if the file cannot be opened or written.
    pub fn append(&self, timestamp: NaiveDateTime, snapshot: &Snapshot) -> PersistResult<()> {
        let is_new = !self.path.exists();
        if is_new {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new().from_writer(file);

        if is_new {
            wtr.write_record(self.header())?;
        }

        let record = snapshot.to_record(&self.labels, PERSIST_DECIMALS);
        let mut row = vec![
            timestamp.format(TIMESTAMP_FORMAT).to_string(),
            record.current_price.to_string(),
            record.charging,
            record.battery_capacity_kwh.to_string(),
            record.battery_capacity_percent.to_string(),
        ];
        if self.include_consumption {
            row.push(record.facility_consumption_rate.to_string());
            row.push(record.total_consumption_kwh.to_string());
        }
        wtr.write_record(&row)?;
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(12, minute, 0))
            .expect("valid timestamp")
    }

    fn snapshot(stored: f64, charging: bool) -> Snapshot {
        Snapshot {
            price: 24.12345,
            charging,
            stored_energy: stored,
            stored_energy_percent: stored / 230.0 * 100.0,
            facility_consumption_rate: 0.25,
            total_consumption: 7.5,
        }
    }

    #[test]
    fn header_written_once_across_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        let logger = EventLogger::new(&path, ChargingLabels::default(), false);
        logger.append(ts(0), &snapshot(23.0, true)).expect("append");
        logger.append(ts(1), &snapshot(24.0, false)).expect("append");

        let content = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,current_price,charging,battery_capacity_kwh,battery_capacity_percent"
        );
        assert_eq!(lines[1], "2024-03-09 12:00:00,24.123,Ein,23,10");
        assert!(lines[2].starts_with("2024-03-09 12:01:00,24.123,Aus,24,"));
    }

    #[test]
    fn reopening_existing_log_does_not_repeat_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        EventLogger::new(&path, ChargingLabels::default(), true)
            .append(ts(0), &snapshot(50.0, true))
            .expect("first process");
        EventLogger::new(&path, ChargingLabels::default(), true)
            .append(ts(5), &snapshot(51.0, true))
            .expect("second process");

        let content = std::fs::read_to_string(&path).expect("read");
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("timestamp"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn consumption_columns_follow_header_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        let logger = EventLogger::new(&path, ChargingLabels::default(), true);
        logger.append(ts(0), &snapshot(46.0, false)).expect("append");

        let mut rdr = csv::ReaderBuilder::new()
            .from_path(&path)
            .expect("open log");
        let headers = rdr.headers().expect("headers").clone();
        assert_eq!(headers.len(), 7);
        let row = rdr
            .records()
            .next()
            .expect("one row")
            .expect("parseable row");
        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .map(|i| row[i].to_string())
        };
        assert_eq!(col("facility_consumption_rate").as_deref(), Some("0.25"));
        assert_eq!(col("total_consumption_kwh").as_deref(), Some("7.5"));
        assert_eq!(col("battery_capacity_percent").as_deref(), Some("20"));
    }
}
