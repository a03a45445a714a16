use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Monthly aggregate returned by the productivity service.
///
/// Absent fields deserialize to zero/empty so a partial payload still yields
/// a usable summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivitySummary {
    #[serde(default)]
    pub total_appointments: u64,
    #[serde(default)]
    pub completed_appointments: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub specialties: BTreeMap<String, u64>,
}

/// Calendar month used for the productivity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    Low,
}

impl PerformanceTier {
    /// Thresholds are inclusive lower bounds on the attendance rate.
    pub fn from_attendance_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            PerformanceTier::Excellent
        } else if rate >= 75.0 {
            PerformanceTier::Good
        } else if rate >= 60.0 {
            PerformanceTier::Fair
        } else {
            PerformanceTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Fair => "Fair",
            PerformanceTier::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialtyShare<'a> {
    pub name: &'a str,
    pub count: u64,
}

/// Indicators computed fresh for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub scheduled_appointments: u64,
    pub completed_appointments: u64,
    pub total_revenue: f64,
    pub specialties: BTreeMap<String, u64>,
    pub total_hours_worked: f64,
    pub attendance_rate: f64,
    pub patients_per_hour: f64,
    pub revenue_per_hour: f64,
    pub revenue_per_visit: f64,
    pub scheduled_hours: f64,
    pub compliance_rate: f64,
    pub overtime_hours: f64,
    pub performance_tier: PerformanceTier,
}

impl DerivedMetrics {
    /// Specialties ordered by descending count, ties broken by name.
    pub fn specialties_by_count(&self) -> Vec<SpecialtyShare<'_>> {
        let mut shares: Vec<SpecialtyShare<'_>> = self
            .specialties
            .iter()
            .map(|(name, count)| SpecialtyShare {
                name: name.as_str(),
                count: *count,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(b.name)));
        shares
    }

    /// Share of all scheduled appointments, 0 when nothing was scheduled.
    pub fn specialty_percentage(&self, count: u64) -> f64 {
        if self.scheduled_appointments == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.scheduled_appointments as f64
        }
    }

    pub fn is_overtime(&self) -> bool {
        self.overtime_hours >= 0.0
    }
}
