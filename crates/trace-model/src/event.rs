//! Detected motion events and their CSV output.
//!
//! One event is one full traversal of the motion-node sequence. The result
//! table is written as comma-delimited text:
//!
//! ```text
//! Motion, Start Frame, End Frame, Length (sec)
//! 1, 112, 398, 2.86
//! ```

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Header line of the result table.
pub const CSV_HEADER: &str = "Motion, Start Frame, End Frame, Length (sec)";

/// A completed traversal of the motion-node sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// 1-based emission index.
    pub index: u32,

    /// Frame of closest approach to the first node.
    pub start_frame: u64,

    /// Frame of closest approach to the last node.
    pub end_frame: u64,

    /// `(end_frame - start_frame) / frequency`, rounded to 2 decimals.
    pub duration_secs: f64,
}

impl MotionEvent {
    /// Build an event, deriving its duration from the sampling frequency.
    pub fn new(index: u32, start_frame: u64, end_frame: u64, frequency: u32) -> Self {
        let frames = end_frame.saturating_sub(start_frame) as f64;
        Self {
            index,
            start_frame,
            end_frame,
            duration_secs: round2(frames / f64::from(frequency.max(1))),
        }
    }

    /// One CSV data row (without line terminator).
    pub fn csv_row(&self) -> String {
        format!(
            "{}, {}, {}, {:.2}",
            self.index, self.start_frame, self.end_frame, self.duration_secs
        )
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render the full result table.
pub fn render_events_csv<'a>(events: impl IntoIterator<Item = &'a MotionEvent>) -> String {
    let mut output = String::from(CSV_HEADER);
    output.push('\n');
    for event in events {
        output.push_str(&event.csv_row());
        output.push('\n');
    }
    output
}

/// Write the result table to `path`.
///
/// The table is written to a sibling temporary file first and then renamed
/// into place, so `path` either receives the whole table or is untouched.
pub fn write_events_csv<'a>(
    path: &Path,
    events: impl IntoIterator<Item = &'a MotionEvent>,
) -> std::io::Result<()> {
    let rendered = render_events_csv(events);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "events.csv".to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(rendered.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_rounded() {
        let event = MotionEvent::new(1, 100, 387, 100);
        assert!((event.duration_secs - 2.87).abs() < 1e-12);

        let event = MotionEvent::new(2, 10, 11, 3);
        assert!((event.duration_secs - 0.33).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_event() {
        let event = MotionEvent::new(1, 50, 50, 120);
        assert_eq!(event.duration_secs, 0.0);
        assert_eq!(event.csv_row(), "1, 50, 50, 0.00");
    }

    #[test]
    fn test_render_table() {
        let events = vec![MotionEvent::new(1, 112, 398, 100), MotionEvent::new(2, 450, 700, 100)];
        let csv = render_events_csv(&events);
        assert_eq!(
            csv,
            "Motion, Start Frame, End Frame, Length (sec)\n1, 112, 398, 2.86\n2, 450, 700, 2.50\n"
        );
    }

    #[test]
    fn test_render_empty_table_has_header() {
        let csv = render_events_csv(&Vec::<MotionEvent>::new());
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_event_json_shape() {
        let event = MotionEvent::new(3, 10, 60, 50);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"index\":3"));
        assert!(json.contains("\"start_frame\":10"));
        assert!(json.contains("\"duration_secs\":1.0"));
    }

    #[test]
    fn test_write_events_csv() {
        let dir = std::env::temp_dir().join(format!("mocap-events-write-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trial_events.csv");

        let events = vec![MotionEvent::new(1, 1, 201, 100)];
        write_events_csv(&path, &events).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_events_csv(&events));
        assert!(!dir.join(".trial_events.csv.tmp").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let path = std::env::temp_dir()
            .join("mocap-events-no-such-dir")
            .join("out.csv");
        let events = vec![MotionEvent::new(1, 1, 2, 100)];
        assert!(write_events_csv(&path, &events).is_err());
        assert!(!path.exists());
    }
}
