//! Layout engine for an experience timeline: padded date bounds, status and
//! per-year stats, horizontal and per-track vertical positions with collision
//! resolution, grouping, and a timer-driven current-time marker.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod storage;
pub mod timeline;

pub use config::{LayoutSettings, MarkerConfig, TimelineConfig, VerticalDirection};
pub use domain::{EndDate, ExperienceId, ExperienceRecord, Link, Priority, Status, Track};
pub use error::{Result, TimelineError};
pub use timeline::{Timeline, TimelineView};
