use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::TimelineConfig,
    constants::FILE_NAMES,
    domain::ExperienceRecord,
    error::{Result, TimelineError},
    i18n::Catalog,
    timeline::validate_records,
};

/// `./experiences.json` wins over the per-user data directory.
pub fn get_data_dir() -> PathBuf {
    let local_experiences = Path::new(".").join(FILE_NAMES.experiences);
    if local_experiences.exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "strata", "strata-timeline") {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_config_path() -> PathBuf {
    let local_config = Path::new(".").join(FILE_NAMES.config);
    if local_config.exists() {
        return local_config;
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "strata", "strata-timeline") {
        proj_dirs.config_dir().join(FILE_NAMES.config)
    } else {
        local_config
    }
}

pub fn load_records(path: &Path) -> Result<Vec<ExperienceRecord>> {
    let records: Vec<ExperienceRecord> = read_json(path)?;
    validate_records(&records)?;
    debug!("loaded {} experiences from {}", records.len(), path.display());
    Ok(records)
}

pub fn save_records(path: &Path, records: &[ExperienceRecord]) -> Result<()> {
    validate_records(records)?;
    write_json_atomic(path, &records)
}

/// Missing or unreadable config falls back to defaults.
pub fn load_config(path: &Path) -> TimelineConfig {
    if !path.exists() {
        debug!("no config at {}, using defaults", path.display());
        return TimelineConfig::default();
    }

    match read_json::<TimelineConfig>(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("could not load config {}: {}", path.display(), e);
            TimelineConfig::default()
        }
    }
}

pub fn load_catalog(path: &Path) -> Option<Catalog> {
    if !path.exists() {
        return None;
    }

    match read_json::<Catalog>(path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("could not load translations {}: {}", path.display(), e);
            None
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| TimelineError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, &json)
}

pub fn csv_string<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TimelineError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content)
}

pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TimelineError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| TimelineError::io(&tmp_path, e))?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| TimelineError::io(&tmp_path, e))?;
    tmp_file
        .sync_all()
        .map_err(|e| TimelineError::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| TimelineError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use chrono::NaiveDate;
    use serde::Deserialize;

    use super::*;
    use crate::domain::{EndDate, Status, Track};

    fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}.{}", prefix, now, extension))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_records_save_and_load() {
        let path = unique_path("strata_timeline_records", "json");
        let records = vec![
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
                Track::Social,
            )
            .with_group("lab"),
        ];

        save_records(&path, &records).unwrap();
        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, records);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_records_rejects_inverted_range() {
        let path = unique_path("strata_timeline_inverted", "json");
        let json = r#"[{
            "id": "bad",
            "title": "Bad",
            "start": "2024-05-01",
            "end": "2024-01-01",
            "status": "completed",
            "track": "personal"
        }]"#;
        fs::write(&path, json).unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRange { .. }));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_records_is_io_error() {
        let path = unique_path("strata_timeline_missing", "json");
        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, TimelineError::Io { .. }));
    }

    #[test]
    fn test_config_falls_back_to_defaults() {
        let missing = unique_path("strata_timeline_config_missing", "json");
        assert_eq!(load_config(&missing), TimelineConfig::default());

        let broken = unique_path("strata_timeline_config_broken", "json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_config(&broken), TimelineConfig::default());
        fs::remove_file(broken).ok();
    }

    #[test]
    fn test_config_overrides_marker() {
        let path = unique_path("strata_timeline_config", "json");
        fs::write(&path, r#"{ "marker": { "high_precision": true } }"#).unwrap();

        let config = load_config(&path);
        assert!(config.marker.high_precision);
        assert!(config.marker.handle_midnight);

        fs::remove_file(path).ok();
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: String,
        top: f64,
    }

    #[test]
    fn test_csv_string_has_header() {
        let rows = vec![
            Row {
                id: "a".to_string(),
                top: 0.0,
            },
            Row {
                id: "b".to_string(),
                top: 88.0,
            },
        ];
        let csv = csv_string(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,top"));
        assert_eq!(lines.next(), Some("a,0.0"));
        assert_eq!(lines.next(), Some("b,88.0"));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let path = unique_path("strata_timeline_atomic", "txt");
        write_text_file(&path, "first").unwrap();
        write_text_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!path.with_extension("tmp").exists());

        fs::remove_file(path).ok();
    }
}
