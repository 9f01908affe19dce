use std::{fmt::Display, io::Write, str::FromStr};

use serde::Serialize;

use crate::summary::{Result, SummaryError};

/// Output styles supported by the summary writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Comma separated lines without a header row.
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format `{other}` (expected csv|json)")),
        }
    }
}

/// Write records to `out` and return how many were written.
///
/// CSV output is streamed record by record; JSON needs the full list before it can
/// be encoded. Either way the first error stops the output.
pub fn write_records<W, T, I>(out: &mut W, records: I, format: OutputFormat) -> Result<usize>
where
    W: Write,
    T: Display + Serialize,
    I: IntoIterator<Item = Result<T>>,
{
    match format {
        OutputFormat::Csv => {
            let mut written = 0;
            for record in records {
                writeln!(out, "{}", record?).map_err(SummaryError::Write)?;
                written += 1;
            }
            Ok(written)
        }
        OutputFormat::Json => {
            let records = records.into_iter().collect::<Result<Vec<_>>>()?;
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out).map_err(SummaryError::Write)?;
            Ok(records.len())
        }
    }
}

/// Render records into a string, mainly for tests and small reports.
pub fn render_records<T, I>(records: I, format: OutputFormat) -> Result<String>
where
    T: Display + Serialize,
    I: IntoIterator<Item = Result<T>>,
{
    let mut buffer = Vec::new();
    write_records(&mut buffer, records, format)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{PackageSummary, UsageRecord};

    fn sample_records() -> Vec<UsageRecord> {
        vec![
            UsageRecord {
                package: "java.util".into(),
                class_name: "Optional".into(),
                occurrence_count: Some("3".into()),
            },
            UsageRecord {
                package: "java.util".into(),
                class_name: "Weird".into(),
                occurrence_count: None,
            },
        ]
    }

    #[test]
    fn csv_has_no_header_row() {
        let output = render_records(sample_records().into_iter().map(Ok), OutputFormat::Csv)
            .unwrap();
        assert_eq!(output, "java.util,Optional,3\njava.util,Weird\n");
    }

    #[test]
    fn json_output_serializes_counts_as_text() {
        let output =
            render_records(sample_records().into_iter().map(Ok), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["class_name"], "Optional");
        assert_eq!(value[0]["occurrence_count"], "3");
        assert!(value[1]["occurrence_count"].is_null());
    }

    #[test]
    fn package_summaries_render_two_fields() {
        let packages = vec![Ok(PackageSummary {
            package: "java.lang".into(),
            occurrence_count: Some("40".into()),
        })];
        assert_eq!(
            render_records(packages, OutputFormat::Csv).unwrap(),
            "java.lang,40\n"
        );
    }

    #[test]
    fn csv_stops_at_first_error() {
        let records = vec![
            Ok(sample_records().remove(0)),
            Err(SummaryError::UngroupedClassLine {
                line_number: 2,
                line: "Orphan.java".into(),
            }),
        ];
        let mut out = Vec::new();
        let err = write_records(&mut out, records, OutputFormat::Csv).unwrap_err();
        assert!(matches!(err, SummaryError::UngroupedClassLine { .. }));
        assert_eq!(String::from_utf8(out).unwrap(), "java.util,Optional,3\n");
    }

    #[test]
    fn formats_parse_from_cli_strings() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
