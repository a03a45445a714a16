use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::settings::ReportSettings;

pub const ENV_PREFIX: &str = "CLINIC_REPORT_";

const KEY_API_BASE_URL: &str = "API_BASE_URL";
const KEY_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
const KEY_LOGO_PATH: &str = "LOGO_PATH";
const KEY_OUTPUT_DIR: &str = "OUTPUT_DIR";
const KEY_CLINIC_NAME: &str = "CLINIC_NAME";

/// Resolves [`ReportSettings`] from defaults, an optional YAML file and the
/// process environment, in that order of precedence.
pub struct SettingsService;

impl SettingsService {
    pub fn load(path: Option<&Path>) -> AppResult<ReportSettings> {
        let overrides: HashMap<String, String> = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|suffix| (suffix.to_string(), value))
            })
            .collect();
        Self::load_with_overrides(path, &overrides)
    }

    /// Same as [`SettingsService::load`] with explicit overrides keyed without
    /// the `CLINIC_REPORT_` prefix.
    pub fn load_with_overrides(
        path: Option<&Path>,
        overrides: &HashMap<String, String>,
    ) -> AppResult<ReportSettings> {
        let mut settings = match path {
            Some(path) => Self::read_file(path)?,
            None => ReportSettings::default(),
        };

        Self::apply_overrides(&mut settings, overrides)?;
        Self::validate(&settings)?;

        info!(
            target: "report::settings",
            api_base_url = %settings.api_base_url,
            timeout_secs = ?settings.http_timeout_secs,
            has_logo = settings.logo_path.is_some(),
            "report settings resolved"
        );
        Ok(settings)
    }

    fn read_file(path: &Path) -> AppResult<ReportSettings> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::config(format!("cannot read settings file {}: {err}", path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(ReportSettings::default());
        }
        let settings: ReportSettings = serde_yaml::from_str(&raw)?;
        debug!(target: "report::settings", path = %path.display(), "loaded settings file");
        Ok(settings)
    }

    fn apply_overrides(
        settings: &mut ReportSettings,
        overrides: &HashMap<String, String>,
    ) -> AppResult<()> {
        if let Some(value) = overrides.get(KEY_API_BASE_URL) {
            settings.api_base_url = value.trim().to_string();
        }
        if let Some(value) = overrides.get(KEY_HTTP_TIMEOUT_SECS) {
            let secs = value.trim().parse::<u64>().map_err(|err| {
                AppError::validation_with_details(
                    "invalid HTTP timeout",
                    json!({ "value": value, "error": err.to_string() }),
                )
            })?;
            settings.http_timeout_secs = Some(secs);
        }
        if let Some(value) = overrides.get(KEY_LOGO_PATH) {
            settings.logo_path = Some(PathBuf::from(value.trim()));
        }
        if let Some(value) = overrides.get(KEY_OUTPUT_DIR) {
            settings.output_dir = PathBuf::from(value.trim());
        }
        if let Some(value) = overrides.get(KEY_CLINIC_NAME) {
            settings.clinic.name = value.trim().to_string();
        }
        Ok(())
    }

    fn validate(settings: &ReportSettings) -> AppResult<()> {
        let url = settings.api_base_url.as_str();
        if url.is_empty() {
            return Err(AppError::validation("API base URL must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::validation_with_details(
                "API base URL must use http or https",
                json!({ "value": url }),
            ));
        }
        if settings.http_timeout_secs == Some(0) {
            return Err(AppError::validation("HTTP timeout must be positive"));
        }
        if !(settings.planning_ratio.is_finite() && settings.planning_ratio > 0.0) {
            return Err(AppError::validation_with_details(
                "planning ratio must be a positive number",
                json!({ "value": settings.planning_ratio }),
            ));
        }
        Ok(())
    }
}
