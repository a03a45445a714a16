use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use clinic_report::models::attendance::{ReportRange, ReportRunInput, StaffMember};
use clinic_report::models::productivity::PerformanceTier;
use clinic_report::models::settings::ReportSettings;
use clinic_report::services::asset_loader::{FileAssetSource, NoLogo};
use clinic_report::services::metrics_service::PlanningRatioPolicy;
use clinic_report::services::productivity_client::HttpProductivityClient;
use clinic_report::services::report_service::{ReportService, ReportWarning};
use httpmock::prelude::*;

fn empty_run() -> ReportRunInput {
    ReportRunInput {
        staff: StaffMember {
            id: "staff-9".into(),
            given_names: "Tomás".into(),
            family_name: "Muñoz".into(),
            national_id: None,
            specialty: None,
        },
        records: Vec::new(),
        range: ReportRange {
            start: NaiveDate::from_ymd_opt(2024, 6, 1).expect("start"),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).expect("end"),
        },
        total_hours_worked: 0.0,
        generated_at: Some(
            Utc.with_ymd_and_hms(2024, 6, 28, 18, 0, 0)
                .single()
                .expect("valid instant"),
        ),
    }
}

fn service_with_base_url(base_url: &str) -> ReportService {
    let settings = ReportSettings {
        api_base_url: base_url.to_string(),
        ..ReportSettings::default()
    };
    let client = HttpProductivityClient::from_settings(&settings).expect("http client");
    ReportService::new(
        settings,
        Arc::new(client),
        Arc::new(NoLogo),
        Arc::new(PlanningRatioPolicy::default()),
    )
}

#[tokio::test]
async fn empty_run_without_productivity_data_still_renders() {
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-9/productivity");
            then.status(503);
        })
        .await;

    let artifact = service_with_base_url(&server.base_url())
        .generate(&empty_run())
        .await;

    failing.assert_hits_async(1).await;
    assert_eq!(
        artifact.warnings,
        vec![ReportWarning::ProductivityUnavailable {
            code: "HTTP_STATUS".into(),
            message: "productivity service returned status 503".into(),
        }]
    );

    let metrics = &artifact.metrics;
    assert_eq!(metrics.attendance_rate, 0.0);
    assert_eq!(metrics.patients_per_hour, 0.0);
    assert_eq!(metrics.revenue_per_hour, 0.0);
    assert_eq!(metrics.compliance_rate, 0.0);
    assert_eq!(metrics.performance_tier, PerformanceTier::Low);

    let document = &artifact.document;
    assert_eq!(document.page_count(), 1);
    // Hours and patients cards plus the two appointment counts.
    assert_eq!(document.texts().filter(|text| *text == "0").count(), 4);
    assert_eq!(document.texts().filter(|text| *text == "$0").count(), 3);
    assert!(document.contains_text("Performance: Low"));
    assert!(!document.contains_text("Specialty Distribution"));
    assert!(document.contains_text("Attendance Detail"));
    assert_eq!(document.texts().filter(|text| *text == "Complete").count(), 0);
    assert!(!document.contains_text("Showing"));
    assert!(document.contains_text("Productivity data was unavailable"));
    assert!(document.contains_text("ID: N/A"));
}

#[tokio::test]
async fn malformed_summary_body_falls_back_to_zero() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-9/productivity");
            then.status(200)
                .header("content-type", "application/json")
                .body("{\"totalAppointments\": \"many\"");
        })
        .await;

    let artifact = service_with_base_url(&server.base_url())
        .generate(&empty_run())
        .await;

    assert!(matches!(
        artifact.warnings.as_slice(),
        [ReportWarning::ProductivityUnavailable { code, .. }] if code == "INVALID_RESPONSE"
    ));
    assert_eq!(artifact.metrics.scheduled_appointments, 0);
}

#[tokio::test]
async fn unreachable_service_keeps_hour_based_metrics() {
    let mut run = empty_run();
    run.total_hours_worked = 50.0;

    let artifact = service_with_base_url("http://127.0.0.1:9").generate(&run).await;

    assert!(matches!(
        artifact.warnings.as_slice(),
        [ReportWarning::ProductivityUnavailable { code, .. }] if code == "TRANSPORT"
    ));
    assert_eq!(artifact.metrics.total_hours_worked, 50.0);
    assert_eq!(artifact.metrics.scheduled_hours, 50.0 * 1.1);
    assert!((artifact.metrics.compliance_rate - 90.909).abs() < 1e-3);
    assert_eq!(artifact.metrics.patients_per_hour, 0.0);
}

#[tokio::test]
async fn missing_logo_is_swallowed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-9/productivity");
            then.status(200).json_body(serde_json::json!({
                "totalAppointments": 8,
                "completedAppointments": 6
            }));
        })
        .await;

    let settings = ReportSettings {
        api_base_url: server.base_url(),
        ..ReportSettings::default()
    };
    let client = HttpProductivityClient::from_settings(&settings).expect("http client");
    let service = ReportService::new(
        settings,
        Arc::new(client),
        Arc::new(FileAssetSource::new("/nonexistent/clinic-logo.png")),
        Arc::new(PlanningRatioPolicy::default()),
    );

    let artifact = service.generate(&empty_run()).await;

    assert!(matches!(
        artifact.warnings.as_slice(),
        [ReportWarning::LogoUnavailable { .. }]
    ));
    assert_eq!(artifact.metrics.attendance_rate, 75.0);
    assert!(artifact.document.contains_text("Performance: Good"));
    assert!(!artifact.document.contains_text("Productivity data was unavailable"));
}
