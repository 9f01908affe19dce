use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use since9_core::{
    perf::{self, DEFAULT_TRIALS},
    write_records, FileReportSource, IndentMode, OutputFormat, ReportSummarizer, Strategy,
    SummarySettings,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "since9",
    author,
    version,
    about = "Summarize '@since 9' usage reports by package and class"
)]
struct Cli {
    /// Report to summarize [default: etc/jdk9ea-since9-report.txt]
    #[arg(long, value_name = "PATH", global = true)]
    report: Option<PathBuf>,

    /// Settings file (TOML, YAML or JSON); environment and flags take precedence
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// How indentation is matched: exact columns or nested depth ranges
    #[arg(long = "indent-mode", value_name = "MODE", global = true)]
    indent_mode: Option<IndentMode>,

    /// Column of package lines
    #[arg(long = "package-indent", value_name = "N", global = true)]
    package_indent: Option<usize>,

    /// Column of class lines
    #[arg(long = "class-indent", value_name = "N", global = true)]
    class_indent: Option<usize>,

    /// Output format (csv or json)
    #[arg(long, value_name = "FORMAT", default_value = "csv", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Emit `package,class,count` for every class line
    ByClass {
        /// streaming or collected
        #[arg(long, default_value = "streaming")]
        strategy: Strategy,
    },
    /// Emit `package,count` for every package line
    ByPackage,
    /// Time repeated by-class runs and print the average
    Perf {
        /// Number of back-to-back runs
        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: u32,
        /// streaming or collected
        #[arg(long, default_value = "collected")]
        strategy: Strategy,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let summarizer = ReportSummarizer::new(settings.classifier()?);
    let source = FileReportSource::new(&settings.report);
    let format = cli.format;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let command = cli.command.unwrap_or(Commands::ByClass {
        strategy: Strategy::Streaming,
    });
    match command {
        Commands::ByClass { strategy } => {
            by_class(&summarizer, &source, strategy, format, &mut out)?
        }
        Commands::ByPackage => by_package(&summarizer, &source, format, &mut out)?,
        Commands::Perf { trials, strategy } => {
            let report = perf::measure(trials, || {
                let records = summarizer.by_class_with(&source, strategy)?;
                write_records(&mut io::sink(), records.into_iter().map(Ok), format)
            })
            .with_context(|| format!("perf run over {} failed", source.path().display()))?;
            writeln!(out, "{report}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn by_class(
    summarizer: &ReportSummarizer,
    source: &FileReportSource,
    strategy: Strategy,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let written = match strategy {
        Strategy::Streaming => write_records(out, summarizer.by_class(source)?, format),
        Strategy::Collected => {
            let records = summarizer.by_class_collected(source)?;
            write_records(out, records.into_iter().map(Ok), format)
        }
    }
    .with_context(|| format!("failed to summarize {}", source.path().display()))?;
    info!(records = written, ?strategy, "by-class summary written");
    Ok(())
}

fn by_package(
    summarizer: &ReportSummarizer,
    source: &FileReportSource,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let written = write_records(out, summarizer.by_package(source)?, format)
        .with_context(|| format!("failed to summarize {}", source.path().display()))?;
    info!(packages = written, "by-package summary written");
    Ok(())
}

/// Defaults, then the optional settings file, then `SINCE9_*` variables, then flags.
fn load_settings(cli: &Cli) -> Result<SummarySettings> {
    let settings = match &cli.config {
        Some(path) => config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<SummarySettings>())
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => SummarySettings::default(),
    };
    let mut settings = settings.with_env()?;
    if let Some(report) = &cli.report {
        settings.report = report.clone();
    }
    if let Some(mode) = cli.indent_mode {
        settings.indent_mode = mode;
    }
    if let Some(indent) = cli.package_indent {
        settings.package_indent = indent;
    }
    if let Some(indent) = cli.class_indent {
        settings.class_indent = indent;
    }
    Ok(settings)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}
