pub mod perf;
pub mod render;
pub mod settings;
pub mod summary;

pub use render::{render_records, write_records, OutputFormat};
pub use settings::SummarySettings;
pub use summary::{
    classifier::LineClassifier, source::FileReportSource, source::TextReportSource,
    summarizer::ReportSummarizer, IndentLayout, IndentMode, LineKind, PackageSummary,
    ReportSource, Strategy, SummaryError, UsageRecord,
};
