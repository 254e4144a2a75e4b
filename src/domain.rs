use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::timeline::progress;

#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceId(pub String);

impl ExperienceId {
    pub fn new(id: impl Into<String>) -> Self {
        ExperienceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Completed,
    Ongoing,
    Planned,
    Paused,
}

/// Parallel lanes of the milestone view, in display order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Personal,
    Social,
    Community,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Personal, Track::Social, Track::Community];

    pub fn as_str(self) -> &'static str {
        match self {
            Track::Personal => "personal",
            Track::Social => "social",
            Track::Community => "community",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

/// End of an engagement. `Open` has no fixed end and resolves to "today".
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum EndDate {
    Fixed(NaiveDate),
    #[default]
    Open,
}

impl EndDate {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            EndDate::Fixed(date) => date,
            EndDate::Open => today,
        }
    }

    pub fn fixed(self) -> Option<NaiveDate> {
        match self {
            EndDate::Fixed(date) => Some(date),
            EndDate::Open => None,
        }
    }
}

const OPEN_END_MARKERS: [&str; 3] = ["open", "present", "now"];
const DATE_FORMAT: &str = "%Y-%m-%d";

impl Serialize for EndDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EndDate::Fixed(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            EndDate::Open => serializer.serialize_str(OPEN_END_MARKERS[0]),
        }
    }
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(EndDate::Open),
            Some(value) => {
                let trimmed = value.trim();
                if OPEN_END_MARKERS
                    .iter()
                    .any(|marker| trimmed.eq_ignore_ascii_case(marker))
                {
                    return Ok(EndDate::Open);
                }
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .map(EndDate::Fixed)
                    .map_err(|e| de::Error::custom(format!("invalid end date '{}': {}", value, e)))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub id: ExperienceId,
    pub title: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub start: NaiveDate,
    #[serde(default)]
    pub end: EndDate,
    pub status: Status,
    pub track: Track,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub gradient: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

fn default_color() -> String {
    "#6366f1".to_string()
}

impl ExperienceRecord {
    /// Builds a record with only the fields the layout engine reads.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDate,
        end: EndDate,
        status: Status,
        track: Track,
    ) -> Self {
        Self {
            id: ExperienceId::new(id),
            title: title.into(),
            position: String::new(),
            organization: String::new(),
            location: String::new(),
            logo: None,
            short_description: String::new(),
            description: String::new(),
            tags: Vec::new(),
            objectives: Vec::new(),
            start,
            end,
            status,
            track,
            group: None,
            priority: Priority::default(),
            color: default_color(),
            gradient: None,
            links: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    pub fn end_on(&self, today: NaiveDate) -> NaiveDate {
        self.end.resolve(today)
    }

    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        progress::is_currently_active(self.start, self.end, today)
    }

    pub fn progress_at(&self, now: NaiveDateTime) -> f64 {
        progress::get_progress(self.start, self.end.resolve(now.date()), now)
    }

    /// Status derived from dates alone; `Paused` is never derived.
    pub fn derived_status(&self, today: NaiveDate) -> Status {
        if self.start > today {
            Status::Planned
        } else if self.end_on(today) < today {
            Status::Completed
        } else {
            Status::Ongoing
        }
    }

    pub fn primary_link(&self) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.primary)
            .or_else(|| self.links.first())
    }
}
