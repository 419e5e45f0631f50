//! Frames and the tab-delimited trace reader.
//!
//! A trace export starts with header rows keyed by their first field
//! (`NO_OF_FRAMES`, `FREQUENCY`, `MARKER_NAMES`, ...) followed by one data
//! row per frame. Data rows hold contiguous `x, y, z` triples, one per
//! marker, in `MARKER_NAMES` order.
//!
//! [`TraceReader`] parses the header eagerly and then yields frames lazily.
//! It never rewinds; re-open the input to read it again.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::point::Point3D;
use crate::registry::MarkerRegistry;

pub const KEY_FRAME_COUNT: &str = "NO_OF_FRAMES";
pub const KEY_FREQUENCY: &str = "FREQUENCY";
pub const KEY_MARKER_NAMES: &str = "MARKER_NAMES";

/// Errors that can occur while reading a trace export.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing header row: {key}")]
    MissingHeader { key: &'static str },

    #[error("Malformed header row {key}: {value:?}")]
    MalformedHeader { key: &'static str, value: String },

    #[error("Line {line}, column {column}: not a number: {value:?}")]
    MalformedRow {
        line: usize,
        column: usize,
        value: String,
    },

    #[error("Line {line}: expected {expected} coordinate columns, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Parsed header of a trace export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Declared number of frames. Advisory only.
    pub frame_count: u64,

    /// Sampling frequency in Hz.
    pub frequency: u32,

    /// Marker names exactly as declared (may contain repeats).
    pub marker_names: Vec<String>,

    /// Other header rows, in file order, as `(key, tab-joined values)`.
    pub extra: Vec<(String, String)>,
}

impl TraceHeader {
    /// Build the marker registry for this header.
    pub fn registry(&self) -> MarkerRegistry {
        MarkerRegistry::from_names(&self.marker_names)
    }

    /// Number of coordinate columns a data row must provide.
    pub fn row_width(&self) -> usize {
        self.marker_names.len() * 3
    }
}

/// One captured frame: a 1-based ordinal plus the raw coordinate row.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    coords: Vec<f64>,
}

impl Frame {
    pub fn new(index: u64, coords: Vec<f64>) -> Self {
        Self { index, coords }
    }

    /// Build a frame from per-marker points in registry order.
    pub fn from_points(index: u64, points: &[Point3D]) -> Self {
        let coords = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self { index, coords }
    }

    /// Position of the marker at a registry offset.
    ///
    /// Returns `None` if the row does not cover that offset.
    pub fn position(&self, offset: usize) -> Option<Point3D> {
        let base = offset.checked_mul(3)?;
        match self.coords.get(base..base + 3) {
            Some(&[x, y, z]) => Some(Point3D::new(x, y, z)),
            _ => None,
        }
    }
}

/// Lazy, forward-only frame reader over a trace export.
pub struct TraceReader<R> {
    reader: R,
    path: PathBuf,
    header: TraceHeader,
    registry: MarkerRegistry,
    /// First data row, consumed while scanning the header.
    pending: Option<(usize, String)>,
    line_number: usize,
    next_index: u64,
    finished: bool,
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file and parse its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| TraceError::Io {
            path: path.clone(),
            source: e,
        })?;
        Self::with_path(BufReader::new(file), path)
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Parse the header from an arbitrary buffered reader.
    pub fn new(reader: R) -> Result<Self, TraceError> {
        Self::with_path(reader, PathBuf::from("<stream>"))
    }

    fn with_path(mut reader: R, path: PathBuf) -> Result<Self, TraceError> {
        let mut frame_count = None;
        let mut frequency = None;
        let mut marker_names = None;
        let mut extra = Vec::new();
        let mut pending = None;
        let mut line_number = 0;
        let mut buf = String::new();

        loop {
            buf.clear();
            let read = reader.read_line(&mut buf).map_err(|e| TraceError::Io {
                path: path.clone(),
                source: e,
            })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let line = buf.trim_end_matches(['\r', '\n']);
            if is_blank_line(line) {
                continue;
            }

            let mut fields = line.split('\t');
            let key = fields.next().unwrap_or_default().trim();
            // Once markers are declared, a blank leading cell is an uncaptured
            // first marker, not a header key.
            let starts_data =
                key.parse::<f64>().is_ok() || (key.is_empty() && marker_names.is_some());
            if starts_data {
                pending = Some((line_number, line.to_string()));
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let values: Vec<&str> = fields.map(str::trim).filter(|v| !v.is_empty()).collect();
            match key {
                KEY_FRAME_COUNT => frame_count = Some(parse_header_int(KEY_FRAME_COUNT, &values)?),
                KEY_FREQUENCY => {
                    let hz = parse_header_int(KEY_FREQUENCY, &values)?;
                    let hz = u32::try_from(hz)
                        .ok()
                        .filter(|hz| *hz > 0)
                        .ok_or_else(|| TraceError::MalformedHeader {
                            key: KEY_FREQUENCY,
                            value: values.join("\t"),
                        })?;
                    frequency = Some(hz);
                }
                KEY_MARKER_NAMES => {
                    if values.is_empty() {
                        return Err(TraceError::MalformedHeader {
                            key: KEY_MARKER_NAMES,
                            value: String::new(),
                        });
                    }
                    marker_names = Some(values.iter().map(|v| v.to_string()).collect::<Vec<_>>());
                }
                other => {
                    tracing::debug!(key = other, "keeping unrecognized header row");
                    extra.push((other.to_string(), values.join("\t")));
                }
            }
        }

        let header = TraceHeader {
            frame_count: frame_count.ok_or(TraceError::MissingHeader {
                key: KEY_FRAME_COUNT,
            })?,
            frequency: frequency.ok_or(TraceError::MissingHeader { key: KEY_FREQUENCY })?,
            marker_names: marker_names.ok_or(TraceError::MissingHeader {
                key: KEY_MARKER_NAMES,
            })?,
            extra,
        };
        let registry = header.registry();

        Ok(Self {
            reader,
            path,
            header,
            registry,
            pending,
            line_number,
            next_index: 1,
            finished: false,
        })
    }

    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn frequency(&self) -> u32 {
        self.header.frequency
    }

    /// Declared frame count (an upper bound, not a guarantee).
    pub fn frame_count(&self) -> u64 {
        self.header.frame_count
    }

    fn next_data_line(&mut self) -> Result<Option<(usize, String)>, TraceError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }

        let mut buf = String::new();
        loop {
            buf.clear();
            let read = self
                .reader
                .read_line(&mut buf)
                .map_err(|e| TraceError::Io {
                    path: self.path.clone(),
                    source: e,
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = buf.trim_end_matches(['\r', '\n']);
            if !is_blank_line(line) {
                return Ok(Some((self.line_number, line.to_string())));
            }
        }
    }

    fn parse_row(&self, line_number: usize, line: &str) -> Result<Vec<f64>, TraceError> {
        let expected = self.header.row_width();
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < expected {
            return Err(TraceError::ShortRow {
                line: line_number,
                expected,
                found: fields.len(),
            });
        }

        fields
            .iter()
            .take(expected)
            .enumerate()
            .map(|(column, raw)| {
                let raw = raw.trim();
                // Blank cells are treated as an uncaptured marker.
                if raw.is_empty() {
                    return Ok(0.0);
                }
                raw.parse::<f64>().map_err(|_| TraceError::MalformedRow {
                    line: line_number,
                    column: column + 1,
                    value: raw.to_string(),
                })
            })
            .collect()
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Frame, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_data_line().and_then(|line| match line {
            Some((line_number, line)) => self.parse_row(line_number, &line).map(Some),
            None => Ok(None),
        });

        match result {
            Ok(Some(coords)) => {
                let frame = Frame::new(self.next_index, coords);
                self.next_index += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// A line with no cells at all. Rows of empty cells still carry frames.
fn is_blank_line(line: &str) -> bool {
    !line.contains('\t') && line.trim().is_empty()
}

fn parse_header_int(key: &'static str, values: &[&str]) -> Result<u64, TraceError> {
    values
        .first()
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| TraceError::MalformedHeader {
            key,
            value: values.join("\t"),
        })
}
