use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One shift instance as supplied by the caller.
///
/// When both clock times are present the duration is their difference, even
/// if negative. `minutes_worked` is only consulted when a clock time is
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(default)]
    pub clock_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub minutes_worked: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Complete,
    Open,
}

impl ShiftStatus {
    pub fn label(self) -> &'static str {
        match self {
            ShiftStatus::Complete => "Complete",
            ShiftStatus::Open => "Open",
        }
    }
}

impl AttendanceRecord {
    /// Hours for this shift: clock difference first, then `minutes_worked / 60`.
    pub fn duration_hours(&self) -> Option<f64> {
        match (self.clock_in, self.clock_out) {
            (Some(start), Some(end)) => {
                Some(end.signed_duration_since(start).num_seconds() as f64 / 3600.0)
            }
            _ => self.minutes_worked.map(|minutes| minutes / 60.0),
        }
    }

    pub fn status(&self) -> ShiftStatus {
        if self.clock_out.is_some() {
            ShiftStatus::Complete
        } else {
            ShiftStatus::Open
        }
    }

    /// Instant used for the date column.
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.clock_in.or(self.clock_out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub given_names: String,
    pub family_name: String,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_names.trim(), self.family_name.trim())
            .trim()
            .to_string()
    }
}

/// Caller-supplied reporting window shown in the header and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRunInput {
    pub staff: StaffMember,
    /// Most recent first; only the first entries are tabulated.
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    pub range: ReportRange,
    /// Hours worked over the whole record sequence, pre-aggregated upstream.
    #[serde(default)]
    pub total_hours_worked: f64,
    /// Fixes the generation instant; defaults to now.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}
