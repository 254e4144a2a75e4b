use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    domain::ExperienceRecord,
    error::{Result, TimelineError},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperienceGroup<'a> {
    /// `None` for a standalone record.
    pub key: Option<String>,
    /// Ascending by start date.
    pub members: Vec<&'a ExperienceRecord>,
    pub color: String,
    pub logo: Option<String>,
    pub earliest_start: NaiveDate,
}

impl<'a> ExperienceGroup<'a> {
    /// The earliest member supplies the group's colour and logo.
    pub fn from_members(key: Option<String>, mut members: Vec<&'a ExperienceRecord>) -> Result<Self> {
        debug_assert!(!members.is_empty(), "experience group built with no members");
        members.sort_by_key(|record| record.start);

        let Some(&first) = members.first() else {
            return Err(TimelineError::EmptyGroup(key.unwrap_or_default()));
        };

        Ok(Self {
            color: first.color.clone(),
            logo: first.logo.clone(),
            earliest_start: first.start,
            key,
            members,
        })
    }

    pub fn is_standalone(&self) -> bool {
        self.key.is_none()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Clusters records by group key, keeps ungrouped records as singletons, and
/// orders everything most recent first by earliest start.
pub fn group_experiences(records: &[ExperienceRecord]) -> Result<Vec<ExperienceGroup<'_>>> {
    let (grouped, standalone): (Vec<&ExperienceRecord>, Vec<&ExperienceRecord>) =
        records.iter().partition(|record| record.group.is_some());

    // `into_group_map` does not keep key order; first-seen order is restored
    // below so ties on earliest start stay deterministic.
    let key_order: Vec<&str> = grouped
        .iter()
        .copied()
        .filter_map(|record| record.group.as_deref())
        .unique()
        .collect();
    let mut by_key = grouped
        .into_iter()
        .filter_map(|record| record.group.clone().map(|key| (key, record)))
        .into_group_map();

    let mut groups = Vec::with_capacity(key_order.len() + standalone.len());
    for key in key_order {
        let members = by_key.remove(key).unwrap_or_default();
        groups.push(ExperienceGroup::from_members(Some(key.to_string()), members)?);
    }
    for record in standalone {
        groups.push(ExperienceGroup::from_members(None, vec![record])?);
    }

    groups.sort_by(|a, b| b.earliest_start.cmp(&a.earliest_start));
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EndDate, Status, Track};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, start: NaiveDate) -> ExperienceRecord {
        ExperienceRecord::new(
            id,
            id,
            start,
            EndDate::Open,
            Status::Ongoing,
            Track::Personal,
        )
    }

    #[test]
    fn test_groups_cluster_and_sort() {
        let records = vec![
            record("hack-2", date(2023, 5, 1))
                .with_group("hackathons")
                .with_color("#222"),
            record("solo", date(2022, 1, 1)),
            record("hack-1", date(2021, 3, 1))
                .with_group("hackathons")
                .with_color("#111")
                .with_logo("hack.png"),
            record("recent", date(2024, 2, 1)),
        ];
        let groups = group_experiences(&records).unwrap();

        let keys: Vec<Option<&str>> = groups.iter().map(|g| g.key.as_deref()).collect();
        assert_eq!(keys, vec![None, None, Some("hackathons")]);
        assert_eq!(groups[0].members[0].id.as_str(), "recent");
        assert_eq!(groups[1].members[0].id.as_str(), "solo");

        let hack = &groups[2];
        assert_eq!(hack.len(), 2);
        assert_eq!(hack.members[0].id.as_str(), "hack-1");
        assert_eq!(hack.members[1].id.as_str(), "hack-2");
        assert_eq!(hack.color, "#111");
        assert_eq!(hack.logo.as_deref(), Some("hack.png"));
        assert_eq!(hack.earliest_start, date(2021, 3, 1));
        assert!(!hack.is_standalone());
    }

    #[test]
    fn test_groups_ordered_most_recent_first() {
        let records = vec![
            record("a", date(2020, 1, 1)).with_group("x"),
            record("b", date(2023, 1, 1)).with_group("y"),
            record("c", date(2021, 1, 1)),
        ];
        let groups = group_experiences(&records).unwrap();

        let starts: Vec<NaiveDate> = groups.iter().map(|g| g.earliest_start).collect();
        assert_eq!(starts, vec![date(2023, 1, 1), date(2021, 1, 1), date(2020, 1, 1)]);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_experiences(&[]).unwrap().is_empty());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_empty_group_is_an_error() {
        let result = ExperienceGroup::from_members(Some("ghost".to_string()), Vec::new());
        assert!(matches!(result, Err(TimelineError::EmptyGroup(key)) if key == "ghost"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no members")]
    fn test_empty_group_fails_fast_in_debug() {
        let _ = ExperienceGroup::from_members(Some("ghost".to_string()), Vec::new());
    }
}
