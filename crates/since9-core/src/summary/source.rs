use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{ReportLines, ReportSource, Result, SummaryError};

/// Reads a report from disk, opening a new handle for every pass.
#[derive(Debug, Clone)]
pub struct FileReportSource {
    path: PathBuf,
}

impl FileReportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SummaryError {
        SummaryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReportSource for FileReportSource {
    fn lines(&self) -> Result<ReportLines<'_>> {
        let file = File::open(&self.path).map_err(|err| self.io_error(err))?;
        debug!(path = %self.path.display(), "opened report");
        // The reader is owned by the iterator, so the handle closes whenever the
        // iterator is dropped, including after an early error.
        let lines = BufReader::new(file)
            .lines()
            .map(move |line| line.map_err(|err| self.io_error(err)));
        Ok(Box::new(lines))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory report text, mostly useful for tests and piping.
#[derive(Debug, Clone, Default)]
pub struct TextReportSource {
    text: String,
}

impl TextReportSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ReportSource for TextReportSource {
    fn lines(&self) -> Result<ReportLines<'_>> {
        Ok(Box::new(self.text.lines().map(|line| Ok(line.to_string()))))
    }

    fn describe(&self) -> String {
        format!("<{} bytes of text>", self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_source_reads_lines_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("report.txt");
        fs::write(&path, "first\r\nsecond\nthird").unwrap();

        let source = FileReportSource::new(&path);
        let lines: Vec<String> = source.lines().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.txt");
        let err = match FileReportSource::new(&path).lines() {
            Ok(_) => panic!("opening a missing report should fail"),
            Err(err) => err,
        };
        assert!(matches!(&err, SummaryError::Io { path: p, .. } if p == &path));
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn invalid_utf8_surfaces_as_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("binary.txt");
        fs::write(&path, [b'o', b'k', b'\n', 0xff, 0xfe, b'\n']).unwrap();

        let source = FileReportSource::new(&path);
        let mut lines = source.lines().unwrap();
        assert_eq!(lines.next().unwrap().unwrap(), "ok");
        assert!(matches!(lines.next(), Some(Err(SummaryError::Io { .. }))));
    }

    #[test]
    fn text_source_is_repeatable() {
        let source = TextReportSource::new("a\nb\n");
        for _ in 0..2 {
            let lines: Vec<String> = source.lines().unwrap().collect::<Result<_>>().unwrap();
            assert_eq!(lines, vec!["a", "b"]);
        }
    }
}
