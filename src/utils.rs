use std::path::{Component, Path};

use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::storage::{is_valid_account_name, is_valid_container_name};

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if num < 0 {
        formatted.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }
    formatted
}

/// Thousands-separated, one decimal place at most.
pub fn format_minutes(minutes: f64) -> String {
    let rounded = (minutes * 10.0).round() / 10.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let abs = rounded.abs();
    let whole = format_number(abs.trunc() as i64);
    let tenths = (abs.fract() * 10.0).round() as u8;

    if tenths == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{tenths}")
    }
}

fn is_plain_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if !is_valid_account_name(&args.storage_account) {
        anyhow::bail!(
            "--storage-account '{}' must be 3-24 lowercase letters or digits",
            args.storage_account
        );
    }

    for (flag, container) in [
        ("--input-container", &args.input_container),
        ("--output-container", &args.output_container),
    ] {
        if !is_valid_container_name(container) {
            anyhow::bail!(
                "{flag} '{container}' must be 3-63 lowercase letters, digits or single hyphens"
            );
        }
    }

    if !is_plain_relative(&args.csv_file) {
        anyhow::bail!(
            "--csv-file '{}' must be a relative path inside the input container",
            args.csv_file
        );
    }

    if !is_plain_relative(&args.output_file) {
        anyhow::bail!(
            "--output-file '{}' must be a relative path inside the output container",
            args.output_file
        );
    }

    if !args.output_file.to_ascii_lowercase().ends_with(".xlsx") {
        anyhow::bail!("--output-file must end in .xlsx");
    }

    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
    }

    Ok(())
}
