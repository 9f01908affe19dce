use std::vec;

use tracing::{debug, instrument};

use super::{
    classifier::{ClassifiedLines, LineClassifier},
    extract::{self, extract_package_info},
    grouping::Runs,
    LineKind, PackageSummary, ReportSource, Result, Strategy, SummaryError, UsageRecord,
};

/// Turns a report into package/class usage records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSummarizer {
    classifier: LineClassifier,
}

impl ReportSummarizer {
    pub fn new(classifier: LineClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Lazily emit one record per class line: classify, group into package runs,
    /// then flatten each run.
    #[instrument(name = "by_class", skip_all, fields(source = %source.describe()))]
    pub fn by_class<'a, S>(&self, source: &'a S) -> Result<ClassRecords<'a>>
    where
        S: ReportSource + ?Sized,
    {
        let lines = self.classifier.classify_lines(source.lines()?);
        Ok(ClassRecords {
            runs: Runs::new(lines),
            current: Vec::new().into_iter(),
        })
    }

    /// Read the whole report into an ordered package table before emitting anything.
    ///
    /// Every package line opens a new table entry, so the output is identical to
    /// [`ReportSummarizer::by_class`].
    #[instrument(name = "by_class_collected", skip_all, fields(source = %source.describe()))]
    pub fn by_class_collected<S>(&self, source: &S) -> Result<Vec<UsageRecord>>
    where
        S: ReportSource + ?Sized,
    {
        let lines = source.lines()?.collect::<Result<Vec<_>>>()?;
        let mut table: Vec<(String, Vec<&str>)> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            match self.classifier.classify(line) {
                LineKind::Package => {
                    table.push((extract::extract_package_name(line).to_string(), Vec::new()))
                }
                LineKind::Class => match table.last_mut() {
                    Some((_, classes)) => classes.push(line),
                    None => {
                        return Err(SummaryError::UngroupedClassLine {
                            line_number: idx + 1,
                            line: line.clone(),
                        })
                    }
                },
                LineKind::Other => {}
            }
        }

        let records: Vec<_> = table
            .iter()
            .flat_map(|(package, classes)| {
                classes
                    .iter()
                    .map(move |line| extract::usage_record(package, line))
            })
            .collect();
        debug!(
            packages = table.len(),
            records = records.len(),
            "collected summary"
        );
        Ok(records)
    }

    /// Run the chosen strategy to completion.
    pub fn by_class_with<S>(&self, source: &S, strategy: Strategy) -> Result<Vec<UsageRecord>>
    where
        S: ReportSource + ?Sized,
    {
        match strategy {
            Strategy::Streaming => self.by_class(source)?.collect(),
            Strategy::Collected => self.by_class_collected(source),
        }
    }

    /// Lazily emit one `package,count` record per package line; class lines are
    /// never grouped in this mode.
    #[instrument(name = "by_package", skip_all, fields(source = %source.describe()))]
    pub fn by_package<'a, S>(&self, source: &'a S) -> Result<PackageRecords<'a>>
    where
        S: ReportSource + ?Sized,
    {
        Ok(PackageRecords {
            lines: self.classifier.classify_lines(source.lines()?),
        })
    }
}

/// Lazy by-class output; stops after the first error.
pub struct ClassRecords<'a> {
    runs: Runs<ClassifiedLines<'a>>,
    current: vec::IntoIter<UsageRecord>,
}

impl Iterator for ClassRecords<'_> {
    type Item = Result<UsageRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            match self.runs.next()? {
                Ok(run) => self.current = run.into_records().into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Lazy by-package output.
pub struct PackageRecords<'a> {
    lines: ClassifiedLines<'a>,
}

impl Iterator for PackageRecords<'_> {
    type Item = Result<PackageSummary>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.kind == LineKind::Package => {
                    return Some(Ok(extract_package_info(&line.text)))
                }
                Ok(_) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
