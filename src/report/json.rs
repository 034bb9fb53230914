//! JSON encoding

use std::io::Write;

use super::{ProfileTable, Report, ReportEncoder};
use crate::error::Result;

pub struct JsonEncoder;

impl ReportEncoder for JsonEncoder {
    fn write_report(&self, writer: &mut dyn Write, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_profiles(&self, writer: &mut dyn Write, table: &ProfileTable) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, table)?;
        writeln!(writer)?;
        Ok(())
    }
}
