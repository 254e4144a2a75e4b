use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    config::{LayoutSettings, VerticalDirection},
    domain::{ExperienceRecord, Track},
};

use super::bounds::TimelineBounds;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HorizontalPosition {
    pub left_percent: f64,
    pub width_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionedExperience<'a> {
    pub experience: &'a ExperienceRecord,
    /// Temporal position before collision resolution.
    pub top_percent: f64,
    pub top_pixel: f64,
    pub depth_opacity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackLayout<'a> {
    pub track: Track,
    pub height: f64,
    pub items: Vec<PositionedExperience<'a>>,
}

pub fn horizontal_position(
    start: NaiveDate,
    end: NaiveDate,
    bounds: &TimelineBounds,
    settings: &LayoutSettings,
) -> HorizontalPosition {
    let span = bounds.span_days();
    if span <= 0 {
        return HorizontalPosition {
            left_percent: 0.0,
            width_percent: settings.min_width_percent,
        };
    }

    let span = span as f64;
    let left = (start - bounds.display_start).num_days() as f64 / span * 100.0;
    let width = (end - start).num_days() as f64 / span * 100.0;

    HorizontalPosition {
        left_percent: left.clamp(0.0, 100.0),
        width_percent: width.max(settings.min_width_percent),
    }
}

pub fn record_horizontal_position(
    record: &ExperienceRecord,
    bounds: &TimelineBounds,
    settings: &LayoutSettings,
) -> HorizontalPosition {
    horizontal_position(
        record.start,
        record.end_on(bounds.current_date),
        bounds,
        settings,
    )
}

pub fn track_height(bounds: &TimelineBounds, settings: &LayoutSettings) -> f64 {
    settings
        .min_track_height
        .max(bounds.total_months as f64 * settings.px_per_month)
}

pub fn vertical_percent(
    record: &ExperienceRecord,
    bounds: &TimelineBounds,
    settings: &LayoutSettings,
) -> f64 {
    let from_start = bounds.percent_of(record.start);
    if bounds.span_days() <= 0 {
        return from_start;
    }
    match settings.direction {
        VerticalDirection::OldestFirst => from_start,
        VerticalDirection::NewestFirst => 100.0 - from_start,
    }
}

pub fn depth_opacity(percent: f64, settings: &LayoutSettings) -> f64 {
    1.0 - (percent / 100.0).clamp(0.0, 1.0) * settings.depth_fade
}

/// Greedy minimum-gap placement for one track.
///
/// Items are stably sorted by raw offset, then each is pushed down to at least
/// `previous + min_gap`. Offsets come out non-decreasing with consecutive gaps
/// of at least `min_gap`, and the returned height always fits the last item.
pub fn layout_track<'a, I>(
    track: Track,
    records: I,
    bounds: &TimelineBounds,
    settings: &LayoutSettings,
) -> TrackLayout<'a>
where
    I: IntoIterator<Item = &'a ExperienceRecord>,
{
    let base_height = track_height(bounds, settings);

    let mut items: Vec<PositionedExperience<'a>> = records
        .into_iter()
        .map(|record| {
            let percent = vertical_percent(record, bounds, settings);
            PositionedExperience {
                experience: record,
                top_percent: percent,
                top_pixel: percent / 100.0 * base_height,
                depth_opacity: depth_opacity(percent, settings),
            }
        })
        .collect();

    // `sort_by` is stable: ties keep input order.
    items.sort_by(|a, b| a.top_pixel.total_cmp(&b.top_pixel));

    let mut previous: Option<f64> = None;
    for item in &mut items {
        if let Some(prev) = previous {
            if item.top_pixel < prev + settings.min_gap {
                item.top_pixel = prev + settings.min_gap;
            }
        }
        previous = Some(item.top_pixel);
    }

    let height = match previous {
        Some(last) => base_height.max(last + settings.min_gap),
        None => base_height,
    };

    TrackLayout {
        track,
        height,
        items,
    }
}

/// One layout per track that has members, in `Track::ALL` order.
pub fn layout_tracks<'a>(
    records: &'a [ExperienceRecord],
    bounds: &TimelineBounds,
    settings: &LayoutSettings,
) -> Vec<TrackLayout<'a>> {
    Track::ALL
        .iter()
        .filter_map(|&track| {
            let members: Vec<&ExperienceRecord> =
                records.iter().filter(|r| r.track == track).collect();
            if members.is_empty() {
                None
            } else {
                Some(layout_track(track, members, bounds, settings))
            }
        })
        .collect()
}
