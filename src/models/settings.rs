use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PLANNING_RATIO: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicIdentity {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Default for ClinicIdentity {
    fn default() -> Self {
        Self {
            name: "Clinic".to_string(),
            address: None,
            phone: None,
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSettings {
    pub clinic: ClinicIdentity,
    pub api_base_url: String,
    /// No timeout is applied when absent.
    pub http_timeout_secs: Option<u64>,
    pub logo_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub planning_ratio: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            clinic: ClinicIdentity::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_secs: None,
            logo_path: None,
            output_dir: PathBuf::from("reports"),
            planning_ratio: DEFAULT_PLANNING_RATIO,
        }
    }
}
