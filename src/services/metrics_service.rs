use std::sync::Arc;

use tracing::debug;

use crate::error::FetchError;
use crate::models::productivity::{
    DerivedMetrics, MonthPeriod, PerformanceTier, ProductivitySummary,
};
use crate::models::settings::DEFAULT_PLANNING_RATIO;
use crate::services::productivity_client::ProductivitySource;

/// Estimates planned hours from hours actually worked.
pub trait ScheduledHoursPolicy: Send + Sync {
    fn scheduled_hours(&self, worked_hours: f64) -> f64;
}

/// Planned hours as a fixed multiple of worked hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningRatioPolicy {
    pub ratio: f64,
}

impl Default for PlanningRatioPolicy {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_PLANNING_RATIO,
        }
    }
}

impl ScheduledHoursPolicy for PlanningRatioPolicy {
    fn scheduled_hours(&self, worked_hours: f64) -> f64 {
        worked_hours * self.ratio
    }
}

/// Merges the fetched summary with caller-supplied hours.
pub struct MetricsService {
    source: Arc<dyn ProductivitySource>,
    policy: Arc<dyn ScheduledHoursPolicy>,
}

impl MetricsService {
    pub fn new(source: Arc<dyn ProductivitySource>, policy: Arc<dyn ScheduledHoursPolicy>) -> Self {
        Self { source, policy }
    }

    /// Issues exactly one fetch for `period`; a failure is returned as-is.
    pub async fn compute(
        &self,
        staff_id: &str,
        total_hours_worked: f64,
        period: MonthPeriod,
    ) -> Result<DerivedMetrics, FetchError> {
        let summary = self.source.monthly_summary(staff_id, period).await?;
        Ok(self.derive(&summary, total_hours_worked))
    }

    /// Metrics for a run whose fetch failed: productivity figures at zero.
    pub fn fallback(&self, total_hours_worked: f64) -> DerivedMetrics {
        self.derive(&ProductivitySummary::default(), total_hours_worked)
    }

    pub fn derive(&self, summary: &ProductivitySummary, total_hours_worked: f64) -> DerivedMetrics {
        derive_metrics(summary, total_hours_worked, self.policy.as_ref())
    }
}

pub fn derive_metrics(
    summary: &ProductivitySummary,
    total_hours_worked: f64,
    policy: &dyn ScheduledHoursPolicy,
) -> DerivedMetrics {
    let hours = sanitize(total_hours_worked);
    let revenue = sanitize(summary.total_revenue);
    let scheduled = summary.total_appointments;
    let completed = summary.completed_appointments;

    let attendance_rate = ratio(completed as f64 * 100.0, scheduled as f64);
    let scheduled_hours = policy.scheduled_hours(hours);

    let metrics = DerivedMetrics {
        scheduled_appointments: scheduled,
        completed_appointments: completed,
        total_revenue: revenue,
        specialties: summary.specialties.clone(),
        total_hours_worked: hours,
        attendance_rate,
        patients_per_hour: ratio(completed as f64, hours),
        revenue_per_hour: ratio(revenue, hours),
        revenue_per_visit: ratio(revenue, completed as f64),
        scheduled_hours,
        compliance_rate: ratio(hours * 100.0, scheduled_hours),
        overtime_hours: hours - scheduled_hours,
        performance_tier: PerformanceTier::from_attendance_rate(attendance_rate),
    };

    debug!(
        target: "report::metrics",
        attendance_rate = metrics.attendance_rate,
        compliance_rate = metrics.compliance_rate,
        tier = metrics.performance_tier.label(),
        "derived metrics"
    );

    metrics
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
