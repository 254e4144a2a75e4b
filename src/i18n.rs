use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ExperienceRecord;

/// Display strings keyed by id. Unknown keys render as themselves so records
/// can carry either literal text or translation keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(key)
    }

    fn owned_text(&self, key: &str) -> String {
        self.text(key).to_string()
    }

    pub fn localize(&self, record: &ExperienceRecord) -> ExperienceRecord {
        ExperienceRecord {
            title: self.owned_text(&record.title),
            position: self.owned_text(&record.position),
            organization: self.owned_text(&record.organization),
            location: self.owned_text(&record.location),
            short_description: self.owned_text(&record.short_description),
            description: self.owned_text(&record.description),
            objectives: record.objectives.iter().map(|o| self.owned_text(o)).collect(),
            links: record
                .links
                .iter()
                .map(|link| crate::domain::Link {
                    text: self.owned_text(&link.text),
                    ..link.clone()
                })
                .collect(),
            ..record.clone()
        }
    }

    pub fn localize_all(&self, records: &[ExperienceRecord]) -> Vec<ExperienceRecord> {
        records.iter().map(|record| self.localize(record)).collect()
    }
}
