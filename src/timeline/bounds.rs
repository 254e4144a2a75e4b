use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::{config::LayoutSettings, domain::ExperienceRecord};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimelineBounds {
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
    pub current_date: NaiveDate,
    pub total_months: u32,
}

impl TimelineBounds {
    pub fn collapsed(today: NaiveDate) -> Self {
        Self {
            display_start: today,
            display_end: today,
            current_date: today,
            total_months: 0,
        }
    }

    pub fn span_days(&self) -> i64 {
        (self.display_end - self.display_start).num_days()
    }

    /// Position of `date` as a percent of the span, clamped to `[0, 100]`.
    /// Zero-span bounds place everything at 0.
    pub fn percent_of(&self, date: NaiveDate) -> f64 {
        let span = self.span_days();
        if span <= 0 {
            return 0.0;
        }
        let offset = (date - self.display_start).num_days() as f64;
        (offset / span as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.display_start <= date && date <= self.display_end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn calculate_timeline_bounds(
    records: &[ExperienceRecord],
    today: NaiveDate,
    settings: &LayoutSettings,
) -> TimelineBounds {
    let dates = records
        .iter()
        .flat_map(|record| [record.start, record.end_on(today)]);
    let (Some(min), Some(max)) = (dates.clone().min(), dates.max()) else {
        return TimelineBounds::collapsed(today);
    };

    let display_start = first_of_month(min)
        .checked_sub_months(Months::new(settings.months_before))
        .unwrap_or(NaiveDate::MIN);

    // Day 0 of the month `months_after` ahead: the last day of the month before it.
    let display_end = first_of_month(max)
        .checked_add_months(Months::new(settings.months_after))
        .and_then(|date| date.pred_opt())
        .unwrap_or(NaiveDate::MAX)
        .max(max);

    let span_days = (display_end - display_start).num_days() as f64;
    let total_months = if settings.days_per_month > 0.0 {
        (span_days / settings.days_per_month).round().max(0.0) as u32
    } else {
        0
    };

    TimelineBounds {
        display_start,
        display_end,
        current_date: today,
        total_months,
    }
}
