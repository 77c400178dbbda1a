use crate::config::Config;
use crate::models::JoinReport;
use crate::table::UnifiedTable;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<UnifiedTable>,
    pub join_report: Arc<JoinReport>,
    pub default_locality: Arc<str>,
    pub geojson_url: Arc<str>,
}

impl AppState {
    pub fn new(config: &Config, table: UnifiedTable, join_report: JoinReport) -> Self {
        Self {
            table: Arc::new(table),
            join_report: Arc::new(join_report),
            default_locality: config.default_locality.as_str().into(),
            geojson_url: config.geojson_url.as_str().into(),
        }
    }
}
