use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::summary::{classifier::LineClassifier, IndentLayout, IndentMode};

pub const DEFAULT_REPORT_PATH: &str = "etc/jdk9ea-since9-report.txt";

/// Where the report lives and how its indentation is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub report: PathBuf,
    pub indent_mode: IndentMode,
    pub package_indent: usize,
    pub class_indent: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        let layout = IndentLayout::default();
        Self {
            report: PathBuf::from(DEFAULT_REPORT_PATH),
            indent_mode: IndentMode::default(),
            package_indent: layout.package_indent,
            class_indent: layout.class_indent,
        }
    }
}

impl SummarySettings {
    const REPORT_ENV: &'static str = "SINCE9_REPORT";
    const INDENT_MODE_ENV: &'static str = "SINCE9_INDENT_MODE";
    const PACKAGE_INDENT_ENV: &'static str = "SINCE9_PACKAGE_INDENT";
    const CLASS_INDENT_ENV: &'static str = "SINCE9_CLASS_INDENT";

    /// Defaults overridden by environment variables.
    ///
    /// * `SINCE9_REPORT`         — Report path (default: `etc/jdk9ea-since9-report.txt`).
    /// * `SINCE9_INDENT_MODE`    — `exact` or `nested`.
    /// * `SINCE9_PACKAGE_INDENT` — Package line column (default: 16).
    /// * `SINCE9_CLASS_INDENT`   — Class line column (default: 20).
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Apply environment overrides on top of already loaded settings.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(&std::env::vars().collect())
    }

    fn with_overrides(mut self, vars: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        if let Some(report) = lookup(Self::REPORT_ENV) {
            self.report = PathBuf::from(report);
        }
        if let Some(mode) = lookup(Self::INDENT_MODE_ENV) {
            self.indent_mode = mode
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid {}", Self::INDENT_MODE_ENV))?;
        }
        if let Some(indent) = lookup(Self::PACKAGE_INDENT_ENV) {
            self.package_indent = indent
                .parse()
                .with_context(|| format!("invalid {} `{indent}`", Self::PACKAGE_INDENT_ENV))?;
        }
        if let Some(indent) = lookup(Self::CLASS_INDENT_ENV) {
            self.class_indent = indent
                .parse()
                .with_context(|| format!("invalid {} `{indent}`", Self::CLASS_INDENT_ENV))?;
        }
        Ok(self)
    }

    pub fn layout(&self) -> IndentLayout {
        IndentLayout {
            package_indent: self.package_indent,
            class_indent: self.class_indent,
        }
    }

    /// Build the classifier described by these settings, validating the layout.
    pub fn classifier(&self) -> Result<LineClassifier> {
        LineClassifier::new(self.layout(), self.indent_mode)
            .context("invalid indentation settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_documented_layout() {
        let settings = SummarySettings::default()
            .with_overrides(&HashMap::new())
            .unwrap();
        assert_eq!(settings.report, PathBuf::from(DEFAULT_REPORT_PATH));
        assert_eq!(settings.indent_mode, IndentMode::Exact);
        assert_eq!(settings.layout(), IndentLayout::default());
        assert!(settings.classifier().is_ok());
    }

    #[test]
    fn overrides_apply_and_blank_values_are_ignored() {
        let settings = SummarySettings::default()
            .with_overrides(&vars(&[
                (SummarySettings::REPORT_ENV, "etc/other.txt"),
                (SummarySettings::INDENT_MODE_ENV, "nested"),
                (SummarySettings::PACKAGE_INDENT_ENV, " 12 "),
                (SummarySettings::CLASS_INDENT_ENV, "  "),
            ]))
            .unwrap();
        assert_eq!(settings.report, PathBuf::from("etc/other.txt"));
        assert_eq!(settings.indent_mode, IndentMode::Nested);
        assert_eq!(settings.package_indent, 12);
        assert_eq!(settings.class_indent, 20);
    }

    #[test]
    fn non_numeric_indent_is_rejected() {
        let err = SummarySettings::default()
            .with_overrides(&vars(&[(SummarySettings::CLASS_INDENT_ENV, "deep")]))
            .unwrap_err();
        assert!(err.to_string().contains(SummarySettings::CLASS_INDENT_ENV));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = SummarySettings::default()
            .with_overrides(&vars(&[(SummarySettings::INDENT_MODE_ENV, "fuzzy")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("fuzzy"));
    }

    #[test]
    fn inverted_layout_fails_classifier_construction() {
        let settings = SummarySettings {
            package_indent: 20,
            class_indent: 16,
            ..SummarySettings::default()
        };
        let err = settings.classifier().unwrap_err();
        assert!(format!("{err:#}").contains("must be smaller"));
    }
}
