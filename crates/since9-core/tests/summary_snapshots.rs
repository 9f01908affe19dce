use std::path::PathBuf;

use insta::assert_snapshot;
use since9_core::{
    render_records, FileReportSource, IndentLayout, IndentMode, LineClassifier, OutputFormat,
    ReportSummarizer, Strategy,
};

fn fixture(name: &str) -> FileReportSource {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    FileReportSource::new(path)
}

fn module_summarizer() -> ReportSummarizer {
    let layout = IndentLayout::new(12, 16).expect("module layout is valid");
    let classifier =
        LineClassifier::new(layout, IndentMode::Exact).expect("module classifier is valid");
    ReportSummarizer::new(classifier)
}

#[test]
fn by_class_snapshot() {
    let source = fixture("since9-report.txt");
    let summarizer = ReportSummarizer::default();
    let records = summarizer
        .by_class(&source)
        .unwrap_or_else(|err| panic!("failed to open fixture: {err}"));
    let output = render_records(records, OutputFormat::Csv).expect("fixture is well formed");
    assert_snapshot!("by_class", output);
}

#[test]
fn collected_strategy_matches_streaming_snapshot() {
    let source = fixture("since9-report.txt");
    let records = ReportSummarizer::default()
        .by_class_with(&source, Strategy::Collected)
        .expect("fixture is well formed");
    let output = render_records(records.into_iter().map(Ok), OutputFormat::Csv).unwrap();
    assert_snapshot!("by_class", output);
}

#[test]
fn by_package_snapshot() {
    let source = fixture("since9-report.txt");
    let packages = ReportSummarizer::default()
        .by_package(&source)
        .unwrap_or_else(|err| panic!("failed to open fixture: {err}"));
    let output = render_records(packages, OutputFormat::Csv).unwrap();
    assert_snapshot!("by_package", output);
}

#[test]
fn by_module_json_snapshot() {
    let source = fixture("since9-report.txt");
    let modules = module_summarizer()
        .by_package(&source)
        .unwrap_or_else(|err| panic!("failed to open fixture: {err}"));
    let output = render_records(modules, OutputFormat::Json).unwrap();
    assert_snapshot!("by_module_json", output);
}
