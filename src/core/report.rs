//! Run report output (CSV or JSON)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{Failure, Success};

/// Report format requested by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    /// Explicitly switched off
    Disabled,
    /// Anything else; produces a warning and no report
    Unrecognized(String),
}

impl From<&str> for ReportFormat {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "csv" => ReportFormat::Csv,
            "json" => ReportFormat::Json,
            "" | "none" => ReportFormat::Disabled,
            _ => ReportFormat::Unrecognized(value.to_string()),
        }
    }
}

impl ReportFormat {
    /// File name written for this format
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Csv => Some("report.csv"),
            ReportFormat::Json => Some("report.json"),
            ReportFormat::Disabled | ReportFormat::Unrecognized(_) => None,
        }
    }
}

/// One report line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow<'a> {
    pub status: &'static str,
    pub group: &'a str,
    pub project: &'a str,
}

/// Successes first, then failures
pub fn report_rows<'a>(successes: &'a [Success], failures: &'a [Failure]) -> Vec<ReportRow<'a>> {
    let ok = successes.iter().map(|s| ReportRow {
        status: "SUCCESS",
        group: &s.group_name,
        project: &s.project_name,
    });
    let failed = failures.iter().map(|f| ReportRow {
        status: "FAILURE",
        group: &f.group_name,
        project: &f.project.name,
    });
    ok.chain(failed).collect()
}

/// Write the report into `dir`; returns the written path, if any
pub fn write_report(
    successes: &[Success],
    failures: &[Failure],
    format: &ReportFormat,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    let path = match format {
        ReportFormat::Disabled => return Ok(None),
        ReportFormat::Unrecognized(raw) => {
            warn!("Invalid report format '{raw}'. No report generated");
            return Ok(None);
        }
        ReportFormat::Csv | ReportFormat::Json => dir.join(format.file_name().unwrap_or("report")),
    };
    let rows = report_rows(successes, failures);

    if *format == ReportFormat::Csv {
        let mut writer = csv::Writer::from_path(&path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writer.flush()?;
    }

    info!("Report saved as '{}'", path.display());
    Ok(Some(path))
}
