use std::collections::HashMap;

use crate::records::{AggregatedRow, InputRow};
use crate::stats::AggregationStats;

/// Sums squirrel counts and observation minutes per area.
///
/// Rows without an area are dropped and null measures count as zero. The
/// result is sorted by `total_squirrels`, largest first; areas with equal
/// totals keep the order in which they first appear in `rows`.
pub fn aggregate(rows: &[InputRow]) -> Vec<AggregatedRow> {
    aggregate_with_stats(rows).0
}

pub fn aggregate_with_stats(rows: &[InputRow]) -> (Vec<AggregatedRow>, AggregationStats) {
    let mut stats = AggregationStats::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<AggregatedRow> = Vec::new();

    for row in rows {
        stats.rows_seen += 1;

        let Some(area_name) = row.area_name.as_deref() else {
            stats.rows_dropped += 1;
            continue;
        };

        let position = *positions.entry(area_name).or_insert_with(|| {
            groups.push(AggregatedRow::new(area_name, 0, 0.0));
            groups.len() - 1
        });

        let group = &mut groups[position];
        let count = row.squirrel_count.unwrap_or(0);
        group.total_squirrels = group.total_squirrels.saturating_add(count);
        group.total_observation_time =
            saturating_add_minutes(group.total_observation_time, row.observation_minutes.unwrap_or(0.0));
        stats.total_squirrels = stats.total_squirrels.saturating_add(count);
    }

    // sort_by is stable: ties stay in first-appearance order
    groups.sort_by(|a, b| b.total_squirrels.cmp(&a.total_squirrels));
    stats.distinct_areas = groups.len();

    (groups, stats)
}

/// Clamps to the largest finite value instead of overflowing to infinity.
fn saturating_add_minutes(total: f64, minutes: f64) -> f64 {
    let sum = total + minutes;
    if sum.is_finite() {
        sum
    } else {
        f64::MAX.copysign(sum)
    }
}
