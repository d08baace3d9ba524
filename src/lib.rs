pub mod aggregate;
pub mod args;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod records;
pub mod schema;
pub mod stats;
pub mod storage;
pub mod utils;
pub mod writer;

pub use aggregate::{aggregate, aggregate_with_stats};
pub use args::Args;
pub use error::{Result, TallyError};
pub use pipeline::{print_job_summary, run_job};
pub use records::{AggregatedRow, InputRow};
pub use stats::{AggregationStats, JobResult, ReadStats};
