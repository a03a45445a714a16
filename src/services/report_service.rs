use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::attendance::{ReportRange, ReportRunInput, StaffMember};
use crate::models::document::{ImageAsset, RenderedDocument};
use crate::models::productivity::{DerivedMetrics, MonthPeriod};
use crate::models::settings::ReportSettings;
use crate::services::asset_loader::{AssetSource, FileAssetSource, NoLogo};
use crate::services::canvas::RecordingSurface;
use crate::services::metrics_service::{MetricsService, PlanningRatioPolicy, ScheduledHoursPolicy};
use crate::services::pagination::{Paginator, SECTION_RESERVE};
use crate::services::productivity_client::{HttpProductivityClient, ProductivitySource};
use crate::services::report_sections::{
    render_closing_note, render_compliance_block, render_detail_table, render_footer,
    render_header, render_kpi_grid, render_page_bands, render_productivity_block,
    render_specialty_block, HeaderContent,
};
use crate::utils::formatters::REPORT_TIMEZONE;

const FILE_NAME_PREFIX: &str = "Report_BETA";

/// Non-fatal problem recorded while producing a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportWarning {
    ProductivityUnavailable { code: String, message: String },
    LogoUnavailable { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportArtifact {
    pub run_id: Uuid,
    pub period: MonthPeriod,
    pub metrics: DerivedMetrics,
    pub warnings: Vec<ReportWarning>,
    pub document: RenderedDocument,
}

impl ReportArtifact {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SavedReport {
    pub artifact: ReportArtifact,
    pub path: PathBuf,
}

/// Runs fetch, aggregation and layout for one report.
pub struct ReportService {
    settings: ReportSettings,
    metrics: MetricsService,
    assets: Arc<dyn AssetSource>,
    paginator: Paginator,
}

impl ReportService {
    pub fn new(
        settings: ReportSettings,
        source: Arc<dyn ProductivitySource>,
        assets: Arc<dyn AssetSource>,
        policy: Arc<dyn ScheduledHoursPolicy>,
    ) -> Self {
        Self {
            settings,
            metrics: MetricsService::new(source, policy),
            assets,
            paginator: Paginator::default(),
        }
    }

    /// Wires the HTTP client, the configured logo file and the planning ratio.
    pub fn from_settings(settings: ReportSettings) -> AppResult<Self> {
        let source: Arc<dyn ProductivitySource> =
            Arc::new(HttpProductivityClient::from_settings(&settings)?);
        let assets: Arc<dyn AssetSource> = match settings.logo_path.as_ref() {
            Some(path) => Arc::new(FileAssetSource::new(path)),
            None => Arc::new(NoLogo),
        };
        let policy: Arc<dyn ScheduledHoursPolicy> = Arc::new(PlanningRatioPolicy {
            ratio: settings.planning_ratio,
        });
        Ok(Self::new(settings, source, assets, policy))
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Always yields a document; fetch and logo failures become warnings.
    pub async fn generate(&self, input: &ReportRunInput) -> ReportArtifact {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            target: "report::render",
            "report_run",
            run_id = %run_id,
            staff_id = %input.staff.id
        );
        self.run(run_id, input).instrument(span).await
    }

    /// Generates the report and writes it as `<file name>.json` under the
    /// configured output directory.
    pub async fn generate_and_save(&self, input: &ReportRunInput) -> AppResult<SavedReport> {
        let artifact = self.generate(input).await;

        tokio::fs::create_dir_all(&self.settings.output_dir).await?;
        let path = self
            .settings
            .output_dir
            .join(format!("{}.json", artifact.document.file_name));
        let json = serde_json::to_vec_pretty(&artifact)?;
        tokio::fs::write(&path, json).await?;

        info!(target: "report::render", path = %path.display(), "report saved");
        Ok(SavedReport { artifact, path })
    }

    async fn run(&self, run_id: Uuid, input: &ReportRunInput) -> ReportArtifact {
        let generated_at = input.generated_at.unwrap_or_else(Utc::now);
        let period = current_month(generated_at);

        let (metrics_result, logo_result) = tokio::join!(
            self.metrics
                .compute(&input.staff.id, input.total_hours_worked, period),
            self.assets.load_logo()
        );

        let mut warnings = Vec::new();
        let metrics = match metrics_result {
            Ok(metrics) => metrics,
            Err(err) => {
                warnings.push(ReportWarning::ProductivityUnavailable {
                    code: err.code().as_str().to_string(),
                    message: err.to_string(),
                });
                self.metrics.fallback(input.total_hours_worked)
            }
        };

        let logo = match logo_result {
            Ok(logo) => logo,
            Err(err) => {
                warn!(target: "report::assets", error = %err, "rendering without logo");
                warnings.push(ReportWarning::LogoUnavailable {
                    message: err.to_string(),
                });
                None
            }
        };

        let degraded = warnings
            .iter()
            .any(|warning| matches!(warning, ReportWarning::ProductivityUnavailable { .. }));
        let document = self.layout(input, &metrics, logo.as_ref(), period, generated_at, degraded);

        info!(
            target: "report::render",
            file_name = %document.file_name,
            pages = document.page_count(),
            warnings = warnings.len(),
            "report rendered"
        );

        ReportArtifact {
            run_id,
            period,
            metrics,
            warnings,
            document,
        }
    }

    fn layout(
        &self,
        input: &ReportRunInput,
        metrics: &DerivedMetrics,
        logo: Option<&ImageAsset>,
        period: MonthPeriod,
        generated_at: DateTime<Utc>,
        degraded: bool,
    ) -> RenderedDocument {
        let paginator = &self.paginator;
        let mut surface = RecordingSurface::new(paginator.page_size());

        let header = HeaderContent {
            clinic: &self.settings.clinic,
            staff: &input.staff,
            range: input.range,
            logo,
        };
        let state = render_header(&mut surface, paginator, paginator.first_page(), &header);
        let state = render_kpi_grid(&mut surface, paginator, state, metrics);
        let state = render_productivity_block(&mut surface, paginator, state, metrics);
        let state = render_specialty_block(&mut surface, paginator, state, metrics);
        let state = render_compliance_block(&mut surface, paginator, state, metrics);
        let state = paginator.ensure_room(&mut surface, state, 0.0, SECTION_RESERVE);
        let state = render_detail_table(&mut surface, paginator, state, &input.records);
        render_closing_note(&mut surface, paginator, state, period, degraded);
        render_footer(&mut surface, paginator, &self.settings.clinic, generated_at);
        render_page_bands(&mut surface, paginator);

        surface.finish(report_file_name(&input.staff, &input.range), generated_at)
    }
}

/// `Report_BETA_<family name>_<start>_<end>` with ISO dates.
pub fn report_file_name(staff: &StaffMember, range: &ReportRange) -> String {
    let family: String = staff
        .family_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|ch| !matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let family = if family.is_empty() {
        "Staff".to_string()
    } else {
        family
    };
    format!(
        "{FILE_NAME_PREFIX}_{family}_{}_{}",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

/// Calendar month containing `instant` in the report timezone.
pub fn current_month(instant: DateTime<Utc>) -> MonthPeriod {
    let local = instant.with_timezone(&REPORT_TIMEZONE);
    MonthPeriod {
        month: local.month(),
        year: local.year(),
    }
}
