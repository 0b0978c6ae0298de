//! Archive models

use serde::Serialize;

/// A month that has published posts, as returned by the post repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub count: i64,
}

/// One month in the archive index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub year: i32,
    pub month: u32,
    pub count: i64,
    /// Unix timestamp of the first day of the month at UTC midnight
    pub timestamp: i64,
}

/// All archive months of one year, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    pub months: Vec<ArchiveEntry>,
}
