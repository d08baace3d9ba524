use anyhow::Result;
use clap::Parser;
use tracing::error;

use squirrel_tally::{pipeline, utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    utils::validate_args(&args)?;

    match pipeline::run_job(&args) {
        Ok(result) => {
            pipeline::print_job_summary(&result, args.top);
            Ok(())
        }
        Err(e) => {
            error!(action = "fail", component = "job", error = %format_args!("{e:#}"), "Job failed");
            std::process::exit(1);
        }
    }
}
