/// One observation as read from the census CSV.
///
/// Every field is nullable: blank or unparseable cells become `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputRow {
    pub area_name: Option<String>,
    pub squirrel_count: Option<i64>,
    pub observation_minutes: Option<f64>,
}

impl InputRow {
    pub fn new(
        area_name: impl Into<String>,
        squirrel_count: Option<i64>,
        observation_minutes: Option<f64>,
    ) -> Self {
        Self {
            area_name: Some(area_name.into()),
            squirrel_count,
            observation_minutes,
        }
    }
}

/// Per-area totals, one per distinct area name.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub area_name: String,
    pub total_squirrels: i64,
    pub total_observation_time: f64,
}

impl AggregatedRow {
    pub fn new(area_name: impl Into<String>, total_squirrels: i64, total_observation_time: f64) -> Self {
        Self {
            area_name: area_name.into(),
            total_squirrels,
            total_observation_time,
        }
    }
}
