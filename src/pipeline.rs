use crate::config::Config;
use crate::errors::PipelineError;
use crate::fetch::SodaClient;
use crate::fusion::fuse;
use crate::models::JoinReport;
use crate::table::UnifiedTable;
use tracing::info;

/// Fetches both datasets and builds the unified table. Any failure is fatal.
pub async fn load_table(config: &Config) -> Result<(UnifiedTable, JoinReport), PipelineError> {
    let client = SodaClient::new(config)?;
    let cases = client
        .fetch("cases", &config.cases_url, config.fetch_limit)
        .await?;
    let population = client
        .fetch("population", &config.population_url, config.fetch_limit)
        .await?;

    let (records, report) = fuse(&cases, &population)?;
    let table = UnifiedTable::from_records(records)?;
    info!(
        "unified table ready: {} rows across {} localities",
        table.len(),
        table.localities().count()
    );
    Ok((table, report))
}
