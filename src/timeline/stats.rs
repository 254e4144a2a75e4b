use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::domain::{ExperienceRecord, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TimelineStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub planned_projects: usize,
    pub year_ranges: Vec<YearCount>,
}

/// Counts follow the dates relative to `today`, not the declared status.
/// A record counts toward every calendar year it overlaps.
pub fn calculate_timeline_stats(records: &[ExperienceRecord], today: NaiveDate) -> TimelineStats {
    let mut stats = TimelineStats {
        total_projects: records.len(),
        ..TimelineStats::default()
    };
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();

    for record in records {
        let end = record.end_on(today);

        if record.start > today {
            stats.planned_projects += 1;
        } else if end < today {
            stats.completed_projects += 1;
        } else {
            stats.active_projects += 1;
        }

        let derived = record.derived_status(today);
        if record.status != derived && record.status != Status::Paused {
            debug!(
                "experience '{}' declares {:?} but its dates say {:?}",
                record.id, record.status, derived
            );
        }

        // A planned open-ended record still occupies its start year.
        for year in record.start.year()..=end.max(record.start).year() {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }

    stats.year_ranges = per_year
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();
    stats
}
