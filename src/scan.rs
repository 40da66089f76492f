use log::{debug, info};

use ballot_labels::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{self, Write};

pub mod chart;
pub mod chat;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod report;

use crate::scan::config_reader::{InputType, ScanSettings};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScanError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find worksheet {name:?} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Cannot find the column {column:?} in the header {header:?}"))]
    MissingTextColumn { column: String, header: Vec<String> },
    #[snafu(display("Cannot read the cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("No input file, use --input or set input.filePath in the configuration"))]
    MissingInput {},
    #[snafu(display("Unknown input type {input_type:?}, expected xlsx or csv"))]
    UnknownInputType { input_type: String },
    #[snafu(display("The file contains no data or the text column is empty."))]
    EmptyDataset {},
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Labeling { source: LabelingErrors },
    #[snafu(display("Error writing chart {path}"))]
    WritingChart {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Unsupported chart format for {path}, use a .png or .svg file"))]
    UnsupportedChartFormat { path: String },
    #[snafu(display("The environment variable {var} is not set"))]
    MissingApiKey { var: String },
    #[snafu(display("{source}"))]
    ChatTransport { source: reqwest::Error },
    #[snafu(display("API error ({status}): {message}"))]
    ChatApi { status: u16, message: String },
    #[snafu(display("Error reading the answer stream"))]
    ChatStream { source: std::io::Error },
    #[snafu(display("Cannot decode a chunk of the answer: {line}"))]
    ChatChunk {
        source: serde_json::Error,
        line: String,
    },
    #[snafu(display("Error reading the question"))]
    Prompt { source: dialoguer::Error },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// The message shown to the user, prefixed by the stage that failed.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::OpeningExcel { .. }
            | ScanError::EmptyExcel { .. }
            | ScanError::MissingWorksheet { .. }
            | ScanError::MissingTextColumn { .. }
            | ScanError::ExcelWrongCellType { .. }
            | ScanError::CsvOpen { .. }
            | ScanError::CsvLineParse { .. } => {
                format!("Error processing the file: {}", self.with_sources())
            }
            ScanError::ChatTransport { source } if source.is_connect() || source.is_timeout() => {
                format!(
                    "Connection error while processing the question: {}",
                    self.with_sources()
                )
            }
            ScanError::MissingApiKey { .. }
            | ScanError::ChatTransport { .. }
            | ScanError::ChatApi { .. }
            | ScanError::ChatStream { .. }
            | ScanError::ChatChunk { .. } => {
                format!("Error processing the question: {}", self.with_sources())
            }
            _ => self.with_sources(),
        }
    }

    // The display of this error followed by the chain of causes.
    fn with_sources(&self) -> String {
        let mut res = self.to_string();
        let mut cur: Option<&dyn std::error::Error> = std::error::Error::source(self);
        while let Some(e) = cur {
            let msg = e.to_string();
            if !res.contains(&msg) {
                res.push_str(": ");
                res.push_str(&msg);
            }
            cur = e.source();
        }
        res
    }
}

fn read_entries(settings: &ScanSettings) -> ScanResult<Vec<Entry>> {
    info!(
        "Attempting to read {:?} file {:?}",
        settings.input_type, settings.input_path
    );
    match settings.input_type {
        InputType::Xlsx => io_xlsx::read_excel_text(
            &settings.input_path,
            settings.worksheet.as_deref(),
            &settings.column,
        ),
        InputType::Csv => io_csv::read_csv_text(&settings.input_path, &settings.column),
    }
}

/// Runs the whole scan: load, sample, label, report, and then the optional questions.
pub fn run_scan(settings: &ScanSettings) -> ScanResult<()> {
    let labeler = Labeler::new(&settings.rules).context(LabelingSnafu {})?;

    let entries = read_entries(settings)?;
    if entries.is_empty() {
        return EmptyDatasetSnafu {}.fail();
    }
    info!("Read {:?} entries", entries.len());

    let sample_size =
        resolve_sample_size(settings.sample_size, entries.len()).context(LabelingSnafu {})?;
    let sample = draw_sample(&entries, sample_size, settings.seed).context(LabelingSnafu {})?;
    let labeled = labeler.label_all(&sample);
    let summary = SampleSummary::new(entries.len(), &labeled, labeler.rules());
    debug!("run_scan: summary: {:?}", summary);

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        report::print_report(&mut out, &summary, &labeled, &labeler)
            .context(WritingFileSnafu { path: "stdout" })?;
        out.flush().context(WritingFileSnafu { path: "stdout" })?;
    }

    if let Some(chart_path) = settings.chart_path.as_deref() {
        chart::write_chart(chart_path, &summary.counts, &labeler)?;
        println!("Chart written to {}", chart_path);
    }

    let summary_js = report::build_summary_js(&summary, &labeler, settings);
    let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    match settings.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js),
        Some(out_path) => {
            fs::write(out_path, &pretty_js).context(WritingFileSnafu { path: out_path })?;
            info!("Summary written to {:?}", out_path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = settings.reference.as_deref() {
        report::check_reference(reference_path, &pretty_js)?;
    }

    chat::ask_questions(
        &settings.questions,
        settings.interactive,
        &settings.chat,
        &summary,
    )
}
