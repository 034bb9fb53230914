//! Report generation for analysis results
//!
//! [`Report`] is the flat record a run produces: frame count, the mean
//! high-frequency score, summary statistics, and one score per frame. Radial
//! profiles are kept out of it and go to a separate [`ProfileTable`].
//!
//! Both are encoded by an [`OutputFormat`]:
//!
//! - **JSON**: pretty-printed, machine-readable
//! - **CSV**: spreadsheet-compatible tables
//!
//! # Usage
//!
//! ```ignore
//! use video_fft::report::{OutputFormat, Report, ReportEncoder};
//!
//! let report = Report::from_result(&result, Some("clip.mp4"));
//! OutputFormat::Json.write_report(&mut std::io::stdout(), &report)?;
//!
//! // Picks the format from the extension
//! report::save_profiles("profiles.csv", &ProfileTable::from_result(&result))?;
//! ```

pub mod csv;
pub mod json;

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::analyzer::SequenceResult;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameScore {
    pub frame_index: usize,
    pub high_frequency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    pub frame_count: usize,
    pub mean_high_frequency_score: f64,
    pub min_high_frequency_score: f64,
    pub max_high_frequency_score: f64,
    pub median_high_frequency_score: f64,
    pub pct_05: f64,
    pub pct_95: f64,
    pub per_frame: Vec<FrameScore>,
}

impl Report {
    /// Project a finished run onto the flat record. No values are recomputed.
    pub fn from_result(result: &SequenceResult, input_file: Option<&str>) -> Self {
        Self {
            input_file: input_file.map(str::to_string),
            frame_count: result.frame_count,
            mean_high_frequency_score: result.mean_high_frequency_score,
            min_high_frequency_score: result.statistics.min,
            max_high_frequency_score: result.statistics.max,
            median_high_frequency_score: result.statistics.median,
            pct_05: result.statistics.pct_05,
            pct_95: result.statistics.pct_95,
            per_frame: result
                .frame_results
                .iter()
                .map(|f| FrameScore {
                    frame_index: f.frame_index,
                    high_frequency_score: f.high_frequency_score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameProfile {
    pub frame_index: usize,
    pub profile: Vec<f64>,
}

/// Radial profiles as plain numeric arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileTable {
    pub mean: Vec<f64>,
    pub frames: Vec<FrameProfile>,
}

impl ProfileTable {
    pub fn from_result(result: &SequenceResult) -> Self {
        Self {
            mean: result.mean_radial_profile.clone(),
            frames: result
                .frame_results
                .iter()
                .map(|f| FrameProfile {
                    frame_index: f.frame_index,
                    profile: f.radial_profile.clone(),
                })
                .collect(),
        }
    }
}

/// Encodes reports and profile tables into one text format.
pub trait ReportEncoder {
    fn write_report(&self, writer: &mut dyn Write, report: &Report) -> Result<()>;
    fn write_profiles(&self, writer: &mut dyn Write, table: &ProfileTable) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Format matching the file extension; anything unknown is CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }

    fn encoder(self) -> &'static dyn ReportEncoder {
        match self {
            OutputFormat::Json => &json::JsonEncoder,
            OutputFormat::Csv => &csv::CsvEncoder,
        }
    }
}

impl ReportEncoder for OutputFormat {
    fn write_report(&self, writer: &mut dyn Write, report: &Report) -> Result<()> {
        self.encoder().write_report(writer, report)
    }

    fn write_profiles(&self, writer: &mut dyn Write, table: &ProfileTable) -> Result<()> {
        self.encoder().write_profiles(writer, table)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Wrong output format '{}', must be 'json' or 'csv'", other)),
        }
    }
}

/// Write a profile table, choosing the format from the file extension.
pub fn save_profiles<P: AsRef<Path>>(path: P, table: &ProfileTable) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    OutputFormat::from_path(path).write_profiles(&mut file, table)?;
    file.flush()?;
    Ok(())
}
