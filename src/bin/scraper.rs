use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use podscrape::error::ScraperError;
use podscrape::types::Source;
use podscrape::utils::ScrapeReport;
use podscrape::{apj, therapy_theology, writer};

#[derive(Parser)]
#[command(name = "scraper")]
#[command(about = "Scrape podcast episode listings to CSV files", long_about = None)]
struct Cli {
    #[arg(value_enum, default_value = "all", help = "Which source(s) to scrape")]
    source: SourceArg,

    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum number of listing pages to fetch per source"
    )]
    max_pages: Option<u32>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for the output CSV files (default: $PODSCRAPE_OUT_DIR, then the working directory)"
    )]
    out_dir: Option<PathBuf>,

    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        help = "Set the logging level"
    )]
    log_level: LogLevel,
}

#[derive(Debug, Clone, ValueEnum)]
enum SourceArg {
    Apj,
    Tt,
    All,
}

impl SourceArg {
    fn sources(&self) -> Vec<Source> {
        match self {
            SourceArg::Apj => vec![Source::AskPastorJohn],
            SourceArg::Tt => vec![Source::TherapyTheology],
            SourceArg::All => vec![Source::AskPastorJohn, Source::TherapyTheology],
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn scrape(source: Source, max_pages: Option<u32>) -> Result<ScrapeReport, ScraperError> {
    match source {
        Source::AskPastorJohn => apj::WebScraper::new()?.fetch_episodes(max_pages),
        Source::TherapyTheology => therapy_theology::WebScraper::new()?.fetch_episodes(max_pages),
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let out_dir = cli
        .out_dir
        .or_else(|| std::env::var_os("PODSCRAPE_OUT_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut failed = false;

    // Sources run sequentially and independently: one failing does not stop
    // the other, but any failure makes the exit code non-zero.
    for source in cli.source.sources() {
        let report = match scrape(source, cli.max_pages) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Scraping {} failed: {}", source, e);
                failed = true;
                continue;
            }
        };

        let path = out_dir.join(source.output_filename());
        if let Err(e) = writer::write_episodes(&path, &report.episodes) {
            log::error!("Writing {} failed: {}", path.display(), e);
            failed = true;
            continue;
        }

        log::info!(
            "Wrote {} episodes to {}",
            report.episodes.len(),
            path.display()
        );
        print!("{}", report);
    }

    if failed {
        process::exit(1);
    }
}
