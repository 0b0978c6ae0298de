//! Archive grouping

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{ArchiveEntry, ArchiveYear, MonthCount};

/// Group archive months by year
///
/// Keeps the order the months arrive in (the repository returns newest
/// first) and starts a new group whenever the year changes. Each entry gets
/// the timestamp of the first day of its month; impossible dates get 0.
pub fn extract_data_from_posts(months: &[MonthCount]) -> Vec<ArchiveYear> {
    let mut years: Vec<ArchiveYear> = Vec::new();

    for month in months {
        let entry = ArchiveEntry {
            year: month.year,
            month: month.month,
            count: month.count,
            timestamp: first_of_month_timestamp(month.year, month.month),
        };

        match years.last_mut() {
            Some(group) if group.year == month.year => group.months.push(entry),
            _ => years.push(ArchiveYear {
                year: month.year,
                months: vec![entry],
            }),
        }
    }

    years
}

/// Unix timestamp of the first day of the month at UTC midnight
pub fn first_of_month_timestamp(year: i32, month: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight).timestamp())
        .unwrap_or(0)
}
