//! CSV encoding
//!
//! A report is two tables separated by a blank line: the one-row summary, then
//! one row per frame. Profiles are one row per radius with a column per frame.

use std::io::Write;

use super::{ProfileTable, Report, ReportEncoder};
use crate::error::Result;

pub struct CsvEncoder;

impl ReportEncoder for CsvEncoder {
    fn write_report(&self, writer: &mut dyn Write, report: &Report) -> Result<()> {
        writeln!(
            writer,
            "input_file,frame_count,mean_high_frequency_score,min_high_frequency_score,\
             max_high_frequency_score,median_high_frequency_score,pct_05,pct_95"
        )?;
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            escape_csv(report.input_file.as_deref().unwrap_or("")),
            report.frame_count,
            report.mean_high_frequency_score,
            report.min_high_frequency_score,
            report.max_high_frequency_score,
            report.median_high_frequency_score,
            report.pct_05,
            report.pct_95,
        )?;

        writeln!(writer)?;
        writeln!(writer, "frame_index,high_frequency_score")?;
        for frame in &report.per_frame {
            writeln!(writer, "{},{}", frame.frame_index, frame.high_frequency_score)?;
        }
        Ok(())
    }

    fn write_profiles(&self, writer: &mut dyn Write, table: &ProfileTable) -> Result<()> {
        let mut header = String::from("radius,mean");
        for frame in &table.frames {
            header.push_str(&format!(",frame_{}", frame.frame_index));
        }
        writeln!(writer, "{}", header)?;

        for (radius, mean) in table.mean.iter().enumerate() {
            let mut row = format!("{},{}", radius, mean);
            for frame in &table.frames {
                match frame.profile.get(radius) {
                    Some(v) => row.push_str(&format!(",{}", v)),
                    None => row.push(','),
                }
            }
            writeln!(writer, "{}", row)?;
        }
        Ok(())
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FrameProfile, FrameScore};

    // ==========================================================================
    // REPORT LAYOUT TESTS
    // ==========================================================================

    #[test]
    fn test_report_layout() {
        let report = Report {
            input_file: Some("clip.mp4".to_string()),
            frame_count: 2,
            mean_high_frequency_score: 1.5,
            min_high_frequency_score: 1.0,
            max_high_frequency_score: 2.0,
            median_high_frequency_score: 1.5,
            pct_05: 1.05,
            pct_95: 1.95,
            per_frame: vec![
                FrameScore { frame_index: 0, high_frequency_score: 1.0 },
                FrameScore { frame_index: 1, high_frequency_score: 2.0 },
            ],
        };

        let mut out = Vec::new();
        CsvEncoder.write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "input_file,frame_count,mean_high_frequency_score,min_high_frequency_score,\
             max_high_frequency_score,median_high_frequency_score,pct_05,pct_95"
        );
        assert_eq!(lines[1], "clip.mp4,2,1.5,1,2,1.5,1.05,1.95");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "frame_index,high_frequency_score");
        assert_eq!(&lines[4..], &["0,1", "1,2"]);
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain.mp4"), "plain.mp4");
        assert_eq!(escape_csv("a,b.mp4"), "\"a,b.mp4\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    // ==========================================================================
    // PROFILE TABLE TESTS
    // ==========================================================================

    #[test]
    fn test_profiles_one_row_per_radius() {
        let table = ProfileTable {
            mean: vec![4.0, 2.5, 0.5],
            frames: vec![
                FrameProfile { frame_index: 0, profile: vec![5.0, 3.0, 1.0] },
                FrameProfile { frame_index: 7, profile: vec![3.0, 2.0, 0.0] },
            ],
        };

        let mut out = Vec::new();
        CsvEncoder.write_profiles(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "radius,mean,frame_0,frame_7\n0,4,5,3\n1,2.5,3,2\n2,0.5,1,0\n"
        );
    }
}
