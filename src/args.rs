use clap::Parser;

/// Labels a spreadsheet of free-text ballots by keyword, and reports on a random sample.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the labeling rules, the sampling and the chat options.
    /// Flags passed on the command line override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The spreadsheet containing the ballots. Overrides input.filePath from the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default, inferred from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default text) The name of the column that holds the ballots, as written in the first row.
    #[clap(long, value_parser)]
    pub column: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 5000) The number of ballots to draw for the statistics. Capped to the size of the file.
    #[clap(long, value_parser)]
    pub sample_size: Option<usize>,

    /// (default 42) The seed of the random sample.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    /// (file path ending in .png or .svg) If specified, the bar chart of the sample is written there.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// (file path or 'stdout') If specified, the summary of the sample will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a summary in JSON format. If provided, votescan will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// A question about the results, answered by the chat model. Can be repeated.
    #[clap(short, long, value_parser)]
    pub question: Vec<String>,

    /// If passed as an argument, asks for questions in the terminal until an empty line is entered.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    /// The chat model answering the questions.
    #[clap(long, value_parser)]
    pub model: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
