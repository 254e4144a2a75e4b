//! Timeline layout engine.
//!
//! Records flow through bounds, stats and per-track positions; the current-time
//! marker is recomputed separately from a fresh instant. Everything here is a
//! pure function of the record list plus an explicit "now".

use std::collections::HashSet;

use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::{
    config::LayoutSettings,
    domain::{EndDate, ExperienceRecord},
    error::{Result, TimelineError},
};

pub mod bounds;
pub mod format;
pub mod grouping;
pub mod marker;
pub mod position;
pub mod progress;
pub mod stats;
pub mod ticker;

pub use bounds::{TimelineBounds, calculate_timeline_bounds};
pub use grouping::{ExperienceGroup, group_experiences};
pub use marker::{MarkerSnapshot, compute_marker};
pub use position::{HorizontalPosition, PositionedExperience, TrackLayout};
pub use progress::{Clock, FixedClock, SystemClock};
pub use stats::{TimelineStats, YearCount, calculate_timeline_stats};
pub use ticker::MarkerTicker;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorizontalEntry<'a> {
    pub experience: &'a ExperienceRecord,
    pub position: HorizontalPosition,
    pub progress: f64,
    pub ongoing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineView<'a> {
    pub bounds: TimelineBounds,
    pub stats: TimelineStats,
    pub tracks: Vec<TrackLayout<'a>>,
    pub horizontal: Vec<HorizontalEntry<'a>>,
    pub groups: Vec<ExperienceGroup<'a>>,
    pub marker: MarkerSnapshot,
}

/// Rejects duplicate ids and fixed ends that precede their start.
pub fn validate_records(records: &[ExperienceRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            return Err(TimelineError::DuplicateId(record.id.to_string()));
        }
        if let EndDate::Fixed(end) = record.end {
            if end < record.start {
                return Err(TimelineError::InvalidRange {
                    id: record.id.to_string(),
                    start: record.start,
                    end,
                });
            }
        }
    }
    Ok(())
}

pub struct Timeline {
    records: Vec<ExperienceRecord>,
    settings: LayoutSettings,
}

impl Timeline {
    pub fn new(records: Vec<ExperienceRecord>, settings: LayoutSettings) -> Result<Self> {
        validate_records(&records)?;
        Ok(Self { records, settings })
    }

    pub fn records(&self) -> &[ExperienceRecord] {
        &self.records
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn bounds(&self, now: NaiveDateTime) -> TimelineBounds {
        calculate_timeline_bounds(&self.records, now.date(), &self.settings)
    }

    pub fn stats(&self, now: NaiveDateTime) -> TimelineStats {
        calculate_timeline_stats(&self.records, now.date())
    }

    pub fn tracks(&self, bounds: &TimelineBounds) -> Vec<TrackLayout<'_>> {
        position::layout_tracks(&self.records, bounds, &self.settings)
    }

    pub fn horizontal(&self, bounds: &TimelineBounds, now: NaiveDateTime) -> Vec<HorizontalEntry<'_>> {
        self.records
            .iter()
            .map(|record| HorizontalEntry {
                experience: record,
                position: position::record_horizontal_position(record, bounds, &self.settings),
                progress: record.progress_at(now),
                ongoing: progress::is_ongoing(record.end),
            })
            .collect()
    }

    pub fn groups(&self) -> Result<Vec<ExperienceGroup<'_>>> {
        group_experiences(&self.records)
    }

    pub fn marker(&self, now: NaiveDateTime, animated: bool) -> MarkerSnapshot {
        compute_marker(&self.records, &self.settings, now, animated)
    }

    /// Full recomputation for one render pass.
    pub fn view(&self, now: NaiveDateTime) -> Result<TimelineView<'_>> {
        let bounds = self.bounds(now);
        let stats = self.stats(now);
        let tracks = self.tracks(&bounds);
        let horizontal = self.horizontal(&bounds, now);
        let groups = self.groups()?;
        let marker = self.marker(now, false);

        debug!(
            "timeline view: {} records, {} tracks, {} groups, {} months",
            self.records.len(),
            tracks.len(),
            groups.len(),
            bounds.total_months
        );

        Ok(TimelineView {
            bounds,
            stats,
            tracks,
            horizontal,
            groups,
            marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Status, Track};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<ExperienceRecord> {
        vec![
            ExperienceRecord::new(
                "a",
                "A",
                date(2023, 1, 1),
                EndDate::Fixed(date(2023, 6, 1)),
                Status::Completed,
                Track::Personal,
            ),
            ExperienceRecord::new(
                "b",
                "B",
                date(2024, 1, 1),
                EndDate::Open,
                Status::Ongoing,
                Track::Community,
            )
            .with_group("lab"),
        ]
    }

    #[test]
    fn test_view_wires_every_stage() {
        let timeline = Timeline::new(sample(), LayoutSettings::default()).unwrap();
        let now = date(2024, 6, 1).and_hms_opt(10, 0, 0).unwrap();
        let view = timeline.view(now).unwrap();

        assert_eq!(view.stats.total_projects, 2);
        assert_eq!(view.tracks.len(), 2);
        assert_eq!(view.horizontal.len(), 2);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.marker.active_count, 1);
        assert!(view.horizontal[1].ongoing);
        assert_eq!(view.horizontal[0].progress, 1.0);
        assert_eq!(view.bounds.current_date, date(2024, 6, 1));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut records = sample();
        records[0].end = EndDate::Fixed(date(2022, 1, 1));

        let err = Timeline::new(records, LayoutSettings::default()).err().unwrap();
        assert!(matches!(err, TimelineError::InvalidRange { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut records = sample();
        records[1].id = records[0].id.clone();

        let err = validate_records(&records).unwrap_err();
        assert!(matches!(err, TimelineError::DuplicateId(id) if id == "a"));
    }
}
