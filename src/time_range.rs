use crate::error::CostReportError;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use rusoto_ce::DateInterval;
use std::convert::TryFrom;

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_ZONE_LABEL: &str = "KST";

/// Fixed-offset timezone in which the "current month" is decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingZone {
    offset: FixedOffset,
    hours: i32,
    label: String,
}

impl ReportingZone {
    pub fn from_hours(hours: i32, label: &str) -> Result<Self, CostReportError> {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(CostReportError::InvalidUtcOffset(hours))?;
        Ok(ReportingZone {
            offset,
            hours,
            label: label.to_string(),
        })
    }

    pub fn localize(&self, date_time: DateTime<Utc>) -> DateTime<FixedOffset> {
        date_time.with_timezone(&self.offset)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `2024-07-15 09:00:00 KST`
    pub fn format_local(&self, date_time: &DateTime<FixedOffset>) -> String {
        format!("{} {}", date_time.format("%Y-%m-%d %H:%M:%S"), self.label)
    }

    /// e.g. `KST (UTC+9)`
    pub fn describe(&self) -> String {
        format!("{} (UTC{:+})", self.label, self.hours)
    }
}

impl Default for ReportingZone {
    fn default() -> Self {
        ReportingZone {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
            hours: DEFAULT_UTC_OFFSET_HOURS,
            label: DEFAULT_ZONE_LABEL.to_string(),
        }
    }
}

/// Calendar month as a half-open date range `[start, end)`.
#[derive(Debug, PartialEq, Clone)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TryFrom<DateTime<FixedOffset>> for MonthRange {
    type Error = CostReportError;

    fn try_from(now: DateTime<FixedOffset>) -> Result<Self, Self::Error> {
        let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
            .ok_or(CostReportError::InvalidDate)?;
        let end = Self::first_day_of_next_month(now.year(), now.month())
            .ok_or(CostReportError::InvalidDate)?;
        Ok(MonthRange { start, end })
    }
}

impl MonthRange {
    fn first_day_of_next_month(year: i32, month: u32) -> Option<NaiveDate> {
        if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
    }

    /// `YYYY-MM`, the label stored inside reports.
    pub fn month_label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    /// `YYYYMM`, the form embedded in object keys.
    pub fn compact_label(&self) -> String {
        self.start.format("%Y%m").to_string()
    }

    pub fn to_date_interval(&self) -> DateInterval {
        DateInterval {
            start: self.start.format("%Y-%m-%d").to_string(),
            end: self.end.format("%Y-%m-%d").to_string(),
        }
    }
}
