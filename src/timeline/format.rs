use chrono::{Datelike, NaiveDate};

use crate::domain::EndDate;

pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

pub fn format_period(start: NaiveDate, end: EndDate) -> String {
    match end {
        EndDate::Fixed(end) if end.year() == start.year() && end.month() == start.month() => {
            format_month_year(start)
        }
        EndDate::Fixed(end) => format!("{} - {}", format_month_year(start), format_month_year(end)),
        EndDate::Open => format!("{} - Present", format_month_year(start)),
    }
}

/// Whole calendar months from `start` to `end`, counting a started month.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    months.max(0) as u32 + 1
}

pub fn format_duration(start: NaiveDate, end: NaiveDate) -> String {
    let months = months_between(start, end);
    let (years, months) = (months / 12, months % 12);

    let unit = |n: u32, one: &str, many: &str| {
        if n == 1 {
            format!("{} {}", n, one)
        } else {
            format!("{} {}", n, many)
        }
    };

    match (years, months) {
        (0, m) => unit(m, "mo", "mos"),
        (y, 0) => unit(y, "yr", "yrs"),
        (y, m) => format!("{} {}", unit(y, "yr", "yrs"), unit(m, "mo", "mos")),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:5.1}%", value)
}

pub fn truncate_label(value: &str, max_chars: usize) -> String {
    let count = value.chars().count();
    if count <= max_chars {
        return value.to_string();
    }

    if max_chars <= 3 {
        return value.chars().take(max_chars).collect();
    }

    let prefix: String = value.chars().take(max_chars - 3).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_period() {
        let start = date(2023, 1, 15);
        assert_eq!(format_period(start, EndDate::Open), "Jan 2023 - Present");
        assert_eq!(
            format_period(start, EndDate::Fixed(date(2023, 6, 1))),
            "Jan 2023 - Jun 2023"
        );
        assert_eq!(format_period(start, EndDate::Fixed(date(2023, 1, 31))), "Jan 2023");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(date(2023, 1, 1), date(2023, 1, 20)), "1 mo");
        assert_eq!(format_duration(date(2023, 1, 1), date(2023, 6, 1)), "6 mos");
        assert_eq!(format_duration(date(2022, 1, 1), date(2022, 12, 31)), "1 yr");
        assert_eq!(format_duration(date(2021, 3, 1), date(2023, 4, 1)), "2 yrs 2 mos");
        assert_eq!(format_duration(date(2023, 5, 1), date(2023, 1, 1)), "0 mos");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Community", 20), "Community");
        assert_eq!(truncate_label("Open Source Maintainer", 10), "Open So...");
        assert_eq!(truncate_label("abcdef", 2), "ab");
    }
}
