use std::{fmt, io, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classifier;
pub mod extract;
pub mod grouping;
pub mod source;
pub mod summarizer;

pub type Result<T> = std::result::Result<T, SummaryError>;

/// Boxed lazy line sequence handed out by a [`ReportSource`].
pub type ReportLines<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Errors raised while reading, grouping or emitting a report summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to read report at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ungrouped class line {line_number} (no preceding package line): `{}`", line.trim())]
    UngroupedClassLine { line_number: usize, line: String },
    #[error("package indent ({package_indent}) must be smaller than class indent ({class_indent})")]
    InvalidLayout {
        package_indent: usize,
        class_indent: usize,
    },
    #[error("at least one trial is required")]
    NoTrials,
    #[error("failed to write summary output: {0}")]
    Write(#[source] io::Error),
    #[error("failed to encode summary as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Classification of a single report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Package,
    Class,
    Other,
}

/// Leading-space columns at which package and class lines are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentLayout {
    pub package_indent: usize,
    pub class_indent: usize,
}

impl Default for IndentLayout {
    fn default() -> Self {
        Self {
            package_indent: 16,
            class_indent: 20,
        }
    }
}

impl IndentLayout {
    /// Construct a layout, validating that class lines nest below package lines.
    pub fn new(package_indent: usize, class_indent: usize) -> Result<Self> {
        let layout = Self {
            package_indent,
            class_indent,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.package_indent >= self.class_indent {
            return Err(SummaryError::InvalidLayout {
                package_indent: self.package_indent,
                class_indent: self.class_indent,
            });
        }
        Ok(())
    }
}

/// How measured indentation is compared against an [`IndentLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentMode {
    /// Indentation must equal the layout column exactly.
    #[default]
    Exact,
    /// Package lines sit anywhere in `package_indent..class_indent`, class lines at or
    /// beyond `class_indent`.
    Nested,
}

impl FromStr for IndentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "nested" => Ok(Self::Nested),
            other => Err(format!("unknown indent mode `{other}` (expected exact|nested)")),
        }
    }
}

/// Interchangeable by-class summarization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Lazy classify → group → emit pipeline.
    #[default]
    Streaming,
    /// Read every line, build the package table, then emit.
    Collected,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" => Ok(Self::Streaming),
            "collected" => Ok(Self::Collected),
            other => Err(format!(
                "unknown strategy `{other}` (expected streaming|collected)"
            )),
        }
    }
}

/// A package or class line kept after classification, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub line_number: usize,
    pub text: String,
}

/// One usage count for a class, attributed to its package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub package: String,
    pub class_name: String,
    /// Count exactly as written in the report; `None` when the line carried none.
    pub occurrence_count: Option<String>,
}

impl UsageRecord {
    /// Numeric view of the textual count, when it is a plain integer.
    pub fn occurrences(&self) -> Option<u64> {
        self.occurrence_count.as_deref()?.parse().ok()
    }
}

impl fmt::Display for UsageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.package, self.class_name)?;
        if let Some(count) = &self.occurrence_count {
            write!(f, ",{count}")?;
        }
        Ok(())
    }
}

/// Total usage count reported on a package line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub package: String,
    pub occurrence_count: Option<String>,
}

impl fmt::Display for PackageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if let Some(count) = &self.occurrence_count {
            write!(f, ",{count}")?;
        }
        Ok(())
    }
}

/// A package line together with the class lines that immediately follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub package_line: ClassifiedLine,
    pub class_lines: Vec<ClassifiedLine>,
}

impl Run {
    pub fn package_name(&self) -> &str {
        extract::extract_package_name(&self.package_line.text)
    }

    /// Emit one record per class line, in file order.
    pub fn into_records(self) -> Vec<UsageRecord> {
        let package = self.package_name().to_string();
        self.class_lines
            .iter()
            .map(|line| extract::usage_record(&package, &line.text))
            .collect()
    }
}

/// Abstraction over where report lines come from (files, in-memory text).
pub trait ReportSource {
    /// Open a fresh single pass over the report. The underlying handle lives as long
    /// as the returned iterator.
    fn lines(&self) -> Result<ReportLines<'_>>;

    /// Short human-readable label used in logs.
    fn describe(&self) -> String;
}
