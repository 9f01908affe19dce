use std::iter::Enumerate;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::{ClassifiedLine, IndentLayout, IndentMode, LineKind, ReportLines, Result};

/// Source file token that opens a class line, e.g. `module-info.java`.
static CLASS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z-]+\.java").expect("class token pattern is valid"));

/// Decides whether a report line names a package, a class, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineClassifier {
    layout: IndentLayout,
    mode: IndentMode,
}

impl LineClassifier {
    pub fn new(layout: IndentLayout, mode: IndentMode) -> Result<Self> {
        layout.validate()?;
        Ok(Self { layout, mode })
    }

    pub fn layout(&self) -> IndentLayout {
        self.layout
    }

    pub fn mode(&self) -> IndentMode {
        self.mode
    }

    pub fn classify(&self, line: &str) -> LineKind {
        let indent = leading_spaces(line);
        let rest = &line[indent..];
        let IndentLayout {
            package_indent,
            class_indent,
        } = self.layout;
        let (package_depth, class_depth) = match self.mode {
            IndentMode::Exact => (indent == package_indent, indent == class_indent),
            IndentMode::Nested => (
                (package_indent..class_indent).contains(&indent),
                indent >= class_indent,
            ),
        };

        if package_depth && rest.starts_with(|c: char| c.is_ascii_lowercase()) {
            LineKind::Package
        } else if class_depth && CLASS_TOKEN.is_match(rest) {
            LineKind::Class
        } else {
            LineKind::Other
        }
    }

    pub fn is_package_line(&self, line: &str) -> bool {
        self.classify(line) == LineKind::Package
    }

    pub fn is_class_line(&self, line: &str) -> bool {
        self.classify(line) == LineKind::Class
    }

    /// Lazily drop every line that is neither a package nor a class line.
    pub fn classify_lines<'a>(&self, lines: ReportLines<'a>) -> ClassifiedLines<'a> {
        ClassifiedLines {
            lines: lines.enumerate(),
            classifier: *self,
        }
    }
}

/// Indentation depth in columns; only plain spaces count.
pub fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ').count()
}

/// Iterator over the package and class lines of a report, in file order.
pub struct ClassifiedLines<'a> {
    lines: Enumerate<ReportLines<'a>>,
    classifier: LineClassifier,
}

impl Iterator for ClassifiedLines<'_> {
    type Item = Result<ClassifiedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            let text = match line {
                Ok(text) => text,
                Err(err) => return Some(Err(err)),
            };
            match self.classifier.classify(&text) {
                LineKind::Other => trace!(line_number = idx + 1, "skipping unclassified line"),
                kind => {
                    return Some(Ok(ClassifiedLine {
                        kind,
                        line_number: idx + 1,
                        text,
                    }))
                }
            }
        }
    }
}
