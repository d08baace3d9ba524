use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use crate::storage::{ContainerUri, MountMode, MountTable};
use crate::utils::{format_minutes, format_number};
use crate::{aggregate, reader, writer, Args, JobResult};

pub const INPUT_MOUNT: &str = "/mnt/input";
pub const OUTPUT_MOUNT: &str = "/mnt/output";

/// Mounts both containers, aggregates the census CSV and writes the workbook.
pub fn run_job(args: &Args) -> Result<JobResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "job", csv_file = %args.csv_file, "Starting squirrel census aggregation");

    let mut mounts = MountTable::new(&args.storage_root);
    let input_source = ContainerUri::new(&args.storage_account, &args.input_container);
    let output_source = ContainerUri::new(&args.storage_account, &args.output_container);

    mounts
        .mount(input_source, INPUT_MOUNT, MountMode::ReadOnly)
        .context("Failed to mount input container")?;
    mounts
        .mount(output_source, OUTPUT_MOUNT, MountMode::ReadWrite)
        .context("Failed to mount output container")?;

    let input_path = mounts.resolve_path(&format!("{INPUT_MOUNT}/{}", args.csv_file))?;
    let output_path = mounts.resolve_path(&format!("{OUTPUT_MOUNT}/{}", args.output_file))?;

    let (rows, read_stats) = reader::read_rows(&input_path)
        .with_context(|| format!("Failed to read {}/{}", INPUT_MOUNT, args.csv_file))?;

    let aggregation_start = Instant::now();
    let (aggregated, aggregation_stats) = aggregate::aggregate_with_stats(&rows);
    info!(
        action = "complete",
        component = "aggregation",
        rows_seen = aggregation_stats.rows_seen,
        rows_dropped = aggregation_stats.rows_dropped,
        distinct_areas = aggregation_stats.distinct_areas,
        duration_ms = aggregation_start.elapsed().as_millis(),
        "Aggregation completed"
    );

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    writer::write_workbook(&output_path, &aggregated)
        .with_context(|| format!("Failed to write {}/{}", OUTPUT_MOUNT, args.output_file))?;

    info!(
        action = "complete",
        component = "job",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Job completed successfully"
    );

    Ok(JobResult {
        output_path,
        rows: aggregated,
        read_stats,
        aggregation_stats,
    })
}

pub fn print_job_summary(result: &JobResult, top: Option<usize>) {
    println!("XLSX saved to {}", result.output_path.display());

    println!(
        "Rows read: {} ({} without an area name, {} unparseable cells)",
        format_number(result.read_stats.rows_read as i64),
        format_number(result.aggregation_stats.rows_dropped as i64),
        format_number(result.read_stats.coerced_cells as i64)
    );
    println!(
        "Distinct areas: {}",
        format_number(result.aggregation_stats.distinct_areas as i64)
    );
    println!(
        "Total squirrels: {}",
        format_number(result.aggregation_stats.total_squirrels)
    );

    if let Some(top_count) = top {
        println!(
            "\nTop {} areas by squirrel count:",
            std::cmp::min(top_count, result.rows.len())
        );
        for row in result.rows.iter().take(top_count) {
            println!(
                "- {}: {} squirrels, {} minutes observed",
                row.area_name,
                format_number(row.total_squirrels),
                format_minutes(row.total_observation_time)
            );
        }
    }
}
