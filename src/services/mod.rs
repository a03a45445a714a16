pub mod asset_loader;
pub mod canvas;
pub mod metrics_service;
pub mod pagination;
pub mod productivity_client;
pub mod report_sections;
pub mod report_service;
pub mod settings_service;
