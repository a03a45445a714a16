use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use clinic_report::models::attendance::{AttendanceRecord, ReportRange, ReportRunInput, StaffMember};
use clinic_report::models::document::DrawOp;
use clinic_report::models::productivity::PerformanceTier;
use clinic_report::models::settings::{ClinicIdentity, ReportSettings};
use clinic_report::services::asset_loader::{FileAssetSource, NoLogo};
use clinic_report::services::metrics_service::PlanningRatioPolicy;
use clinic_report::services::productivity_client::HttpProductivityClient;
use clinic_report::services::report_service::{ReportArtifact, ReportService};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 15, 0, 0)
        .single()
        .expect("valid instant")
}

fn shifts(count: usize) -> Vec<AttendanceRecord> {
    let latest = Utc
        .with_ymd_and_hms(2024, 3, 19, 12, 0, 0)
        .single()
        .expect("valid instant");
    (0..count)
        .map(|offset| {
            let start = latest - Duration::days(offset as i64);
            AttendanceRecord {
                clock_in: Some(start),
                clock_out: Some(start + Duration::minutes(8 * 60 + 30)),
                minutes_worked: None,
            }
        })
        .collect()
}

fn run_input(staff_id: &str, records: Vec<AttendanceRecord>, hours: f64) -> ReportRunInput {
    ReportRunInput {
        staff: StaffMember {
            id: staff_id.to_string(),
            given_names: "Camila Andrea".into(),
            family_name: "Rojas".into(),
            national_id: Some("123456789".into()),
            specialty: Some("Cardiology".into()),
        },
        records,
        range: ReportRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 1).expect("start"),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).expect("end"),
        },
        total_hours_worked: hours,
        generated_at: Some(generated_at()),
    }
}

fn settings(base_url: &str, output_dir: &std::path::Path) -> ReportSettings {
    ReportSettings {
        clinic: ClinicIdentity {
            name: "Clínica Los Andes".into(),
            address: Some("Av. Providencia 1234".into()),
            phone: Some("+56 2 2345 6789".into()),
            email: None,
        },
        api_base_url: base_url.to_string(),
        output_dir: output_dir.to_path_buf(),
        ..ReportSettings::default()
    }
}

fn service_for(settings: ReportSettings) -> ReportService {
    let client = HttpProductivityClient::from_settings(&settings).expect("http client");
    ReportService::new(
        settings,
        Arc::new(client),
        Arc::new(NoLogo),
        Arc::new(PlanningRatioPolicy::default()),
    )
}

fn text_count(artifact: &ReportArtifact, needle: &str) -> usize {
    artifact.document.texts().filter(|text| *text == needle).count()
}

#[tokio::test]
async fn full_month_report_renders_every_section() {
    let server = MockServer::start_async().await;
    let summary_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/staff/staff-42/productivity")
                .query_param("month", "3")
                .query_param("year", "2024");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "totalAppointments": 20,
                    "completedAppointments": 12,
                    "totalRevenue": 1000000,
                    "specialties": {"Cardiology": 9, "Internal Medicine": 11}
                }));
        })
        .await;

    let dir = tempdir().expect("temp dir");
    let service = service_for(settings(&server.base_url(), dir.path()));
    let artifact = service.generate(&run_input("staff-42", shifts(15), 160.0)).await;

    summary_mock.assert_hits_async(1).await;
    assert!(!artifact.is_degraded());

    let metrics = &artifact.metrics;
    assert_eq!(metrics.attendance_rate, 60.0);
    assert_eq!(metrics.performance_tier, PerformanceTier::Fair);
    assert!((metrics.scheduled_hours - 176.0).abs() < 1e-9);
    assert!((metrics.compliance_rate - 90.909).abs() < 1e-3);

    let document = &artifact.document;
    assert_eq!(
        document.file_name,
        "Report_BETA_Rojas_2024-03-01_2024-03-31"
    );
    assert_eq!(document.page_count(), 1);
    assert!(document.contains_text("Clínica Los Andes"));
    assert!(document.contains_text("Camila Andrea Rojas  |  ID: 12.345.678-9"));
    assert!(document.contains_text("Period: 01-03-2024 to 31-03-2024"));
    assert_eq!(text_count(&artifact, "160"), 1);
    assert_eq!(text_count(&artifact, "$1.000.000"), 1);
    assert!(document.contains_text("Performance: Fair"));
    assert!(document.contains_text("Specialty Distribution"));
    assert_eq!(text_count(&artifact, "55.0%"), 1);
    assert_eq!(text_count(&artifact, "45.0%"), 1);
    assert_eq!(text_count(&artifact, "90.9%"), 1);
    assert!(document.contains_text("Shortfall"));
    assert_eq!(text_count(&artifact, "Complete"), 10);
    assert_eq!(text_count(&artifact, "8.50"), 10);
    assert!(document.contains_text("Showing 10 of 15 asistencias"));
    assert!(document.contains_text("Productivity figures cover 03/2024"));
    assert!(document.contains_text("Generated on 20-03-2024 12:00"));
    assert!(document.contains_text("Page 1 of 1"));
}

#[tokio::test]
async fn specialty_rows_are_ordered_by_consultations() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-7/productivity");
            then.status(200).json_body(json!({
                "totalAppointments": 10,
                "completedAppointments": 10,
                "totalRevenue": 250000,
                "specialties": {"Allergy": 1, "Neurology": 6, "Dermatology": 3}
            }));
        })
        .await;

    let dir = tempdir().expect("temp dir");
    let service = service_for(settings(&server.base_url(), dir.path()));
    let artifact = service.generate(&run_input("staff-7", shifts(3), 24.0)).await;

    let texts: Vec<&str> = artifact.document.texts().collect();
    let position = |name: &str| texts.iter().position(|text| *text == name).expect(name);
    assert!(position("Neurology") < position("Dermatology"));
    assert!(position("Dermatology") < position("Allergy"));
    assert_eq!(artifact.metrics.performance_tier, PerformanceTier::Excellent);
    assert!(!artifact.document.contains_text("Showing"));
}

#[tokio::test]
async fn logo_is_drawn_in_header_when_configured() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-1/productivity");
            then.status(200).json_body(json!({}));
        })
        .await;

    let dir = tempdir().expect("temp dir");
    let logo_path = dir.path().join("logo.png");
    std::fs::write(&logo_path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A]).expect("write logo");

    let settings = settings(&server.base_url(), dir.path());
    let client = HttpProductivityClient::from_settings(&settings).expect("http client");
    let service = ReportService::new(
        settings,
        Arc::new(client),
        Arc::new(FileAssetSource::new(&logo_path)),
        Arc::new(PlanningRatioPolicy::default()),
    );

    let artifact = service.generate(&run_input("staff-1", Vec::new(), 0.0)).await;

    assert!(artifact.warnings.is_empty());
    let images = artifact.document.pages[0]
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Image { .. }))
        .count();
    assert_eq!(images, 1);
}

#[tokio::test]
async fn saved_report_lands_in_output_dir() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/staff-42/productivity");
            then.status(200).json_body(json!({
                "totalAppointments": 4,
                "completedAppointments": 3,
                "totalRevenue": 90000
            }));
        })
        .await;

    let dir = tempdir().expect("temp dir");
    let output_dir = dir.path().join("out");
    let service = service_for(settings(&server.base_url(), &output_dir));

    let saved = service
        .generate_and_save(&run_input("staff-42", shifts(2), 17.0))
        .await
        .expect("report saved");

    assert_eq!(
        saved.path,
        output_dir.join("Report_BETA_Rojas_2024-03-01_2024-03-31.json")
    );
    let raw = std::fs::read_to_string(&saved.path).expect("read saved report");
    let reloaded: ReportArtifact = serde_json::from_str(&raw).expect("artifact json");
    assert_eq!(reloaded.run_id, saved.artifact.run_id);
    assert_eq!(reloaded.document, saved.artifact.document);
    assert_eq!(reloaded.metrics.completed_appointments, 3);
}

#[tokio::test]
async fn concurrent_runs_do_not_share_layout_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/busy/productivity");
            then.status(200).json_body(json!({
                "totalAppointments": 40,
                "completedAppointments": 38,
                "totalRevenue": 3000000,
                "specialties": {"Pediatrics": 40}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/staff/quiet/productivity");
            then.status(200).json_body(json!({
                "totalAppointments": 2,
                "completedAppointments": 1
            }));
        })
        .await;

    let dir = tempdir().expect("temp dir");
    let service = service_for(settings(&server.base_url(), dir.path()));
    let busy = run_input("busy", shifts(12), 90.0);
    let quiet = run_input("quiet", shifts(1), 8.0);

    let runs = futures::future::join_all(vec![
        service.generate(&busy),
        service.generate(&quiet),
        service.generate(&busy),
    ])
    .await;

    assert_eq!(runs[0].document, runs[2].document);
    assert_ne!(runs[0].run_id, runs[2].run_id);
    assert_eq!(runs[0].metrics.performance_tier, PerformanceTier::Excellent);
    assert_eq!(runs[1].metrics.performance_tier, PerformanceTier::Low);
    assert_eq!(runs[1].document.page_count(), 1);
    assert_eq!(
        runs[1]
            .document
            .texts()
            .filter(|text| *text == "Complete")
            .count(),
        1
    );
}
