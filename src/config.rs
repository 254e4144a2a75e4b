use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{BOUNDS_SETTINGS, HORIZONTAL_SETTINGS, MARKER_SETTINGS, TRACK_SETTINGS};

/// Which end of the bounds sits at the top of a vertical track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalDirection {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub months_before: u32,
    pub months_after: u32,
    pub days_per_month: f64,
    pub min_track_height: f64,
    pub px_per_month: f64,
    pub min_gap: f64,
    pub depth_fade: f64,
    pub min_width_percent: f64,
    pub direction: VerticalDirection,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            months_before: BOUNDS_SETTINGS.months_before,
            months_after: BOUNDS_SETTINGS.months_after,
            days_per_month: BOUNDS_SETTINGS.days_per_month,
            min_track_height: TRACK_SETTINGS.min_track_height,
            px_per_month: TRACK_SETTINGS.px_per_month,
            min_gap: TRACK_SETTINGS.min_gap,
            depth_fade: TRACK_SETTINGS.depth_fade,
            min_width_percent: HORIZONTAL_SETTINGS.min_width_percent,
            direction: VerticalDirection::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub update_interval_ms: u64,
    pub high_precision: bool,
    pub animated: bool,
    pub handle_midnight: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: MARKER_SETTINGS.update_interval_ms,
            high_precision: false,
            animated: true,
            handle_midnight: true,
        }
    }
}

impl MarkerConfig {
    /// High precision overrides the configured cadence with a per-second tick.
    pub fn tick_interval(&self) -> Duration {
        if self.high_precision {
            Duration::from_millis(MARKER_SETTINGS.high_precision_interval_ms)
        } else {
            Duration::from_millis(self.update_interval_ms.max(1))
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub layout: LayoutSettings,
    pub marker: MarkerConfig,
}
