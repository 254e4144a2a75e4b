use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    config::{LayoutSettings, VerticalDirection},
    domain::ExperienceRecord,
};

use super::{bounds::calculate_timeline_bounds, progress::midnight};

/// "Today" within the timeline, recomputed from a fresh instant on every tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerSnapshot {
    pub now: NaiveDateTime,
    pub today: NaiveDate,
    /// Percent from the start of the display range.
    pub position_percent: f64,
    pub is_active_today: bool,
    pub active_count: usize,
    pub animated: bool,
}

impl MarkerSnapshot {
    pub fn vertical_percent(&self, direction: VerticalDirection) -> f64 {
        match direction {
            VerticalDirection::OldestFirst => self.position_percent,
            VerticalDirection::NewestFirst => 100.0 - self.position_percent,
        }
    }

    pub fn top_pixel(&self, direction: VerticalDirection, track_height: f64) -> f64 {
        self.vertical_percent(direction) / 100.0 * track_height
    }
}

pub fn compute_marker(
    records: &[ExperienceRecord],
    settings: &LayoutSettings,
    now: NaiveDateTime,
    animated: bool,
) -> MarkerSnapshot {
    let today = now.date();
    let bounds = calculate_timeline_bounds(records, today, settings);
    let active_count = records
        .iter()
        .filter(|record| record.is_active_on(today))
        .count();

    MarkerSnapshot {
        now,
        today,
        position_percent: bounds.percent_of(today),
        is_active_today: active_count > 0,
        active_count,
        animated,
    }
}

pub fn next_midnight(now: NaiveDateTime) -> NaiveDateTime {
    let tomorrow = now.date().succ_opt().unwrap_or(now.date());
    midnight(tomorrow)
}

pub fn duration_until_midnight(now: NaiveDateTime) -> Duration {
    (next_midnight(now) - now).to_std().unwrap_or_default()
}
