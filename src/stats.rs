use std::path::PathBuf;

use crate::records::AggregatedRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub rows_read: usize,
    pub coerced_cells: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub rows_seen: usize,
    /// Rows without an area name.
    pub rows_dropped: usize,
    pub distinct_areas: usize,
    pub total_squirrels: i64,
}

#[derive(Debug)]
pub struct JobResult {
    pub output_path: PathBuf,
    pub rows: Vec<AggregatedRow>,
    pub read_stats: ReadStats,
    pub aggregation_stats: AggregationStats,
}
