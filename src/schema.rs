use csv::StringRecord;

use crate::error::{Result, TallyError};

pub const AREA_NAME: &str = "Area Name";
pub const SQUIRREL_COUNT: &str = "Number of Squirrels";
pub const OBSERVATION_MINUTES: &str = "Total Time (in minutes, if available)";

pub const REQUIRED_COLUMNS: [&str; 3] = [AREA_NAME, SQUIRREL_COUNT, OBSERVATION_MINUTES];

pub const OUTPUT_HEADERS: [&str; 3] = ["Area Name", "Total Squirrels", "Total Observation Time"];

/// Positions of the required columns within a CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub area_name: usize,
    pub squirrel_count: usize,
    pub observation_minutes: usize,
}

impl ColumnIndex {
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| normalize_header(h) == name);

        match (
            position(AREA_NAME),
            position(SQUIRREL_COUNT),
            position(OBSERVATION_MINUTES),
        ) {
            (Some(area_name), Some(squirrel_count), Some(observation_minutes)) => Ok(Self {
                area_name,
                squirrel_count,
                observation_minutes,
            }),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .filter(|name| position(name).is_none())
                    .map(|name| name.to_string())
                    .collect();
                Err(TallyError::Schema { missing })
            }
        }
    }
}

fn normalize_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Outcome of coercing one raw cell to a declared column type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<T> {
    Present(T),
    Null,
    Unparseable,
}

impl<T> Cell<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Cell::Present(value) => Some(value),
            Cell::Null | Cell::Unparseable => None,
        }
    }
}

pub fn parse_area(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Integers, or floats without a fractional part ("3.0").
pub fn parse_count(raw: &str) -> Cell<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Cell::Present(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Cell::Present(value as i64)
        }
        _ => Cell::Unparseable,
    }
}

pub fn parse_minutes(raw: &str) -> Cell<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Present(value),
        _ => Cell::Unparseable,
    }
}
