use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "squirrel-tally",
    about = "Sum squirrel census observations per area and export them as a spreadsheet",
    version,
    long_about = None
)]
pub struct Args {
    /// Storage account holding the input and output containers
    #[arg(long, env = "STORAGE_ACCOUNT")]
    pub storage_account: String,

    /// Container holding the census CSV
    #[arg(long, env = "INPUT_CONTAINER")]
    pub input_container: String,

    /// Container receiving the workbook
    #[arg(long, env = "OUTPUT_CONTAINER")]
    pub output_container: String,

    /// CSV file, relative to the input container
    #[arg(long, env = "CSV_FILE")]
    pub csv_file: String,

    /// Local directory backing the storage containers
    #[arg(long, env = "STORAGE_ROOT", default_value = "./storage")]
    pub storage_root: PathBuf,

    /// Workbook name inside the output container
    #[arg(short, long, default_value = "squirrel_output.xlsx")]
    pub output_file: String,

    /// Number of top areas to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
