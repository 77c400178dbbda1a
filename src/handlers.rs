use crate::errors::AppError;
use crate::fusion::parse_report_date;
use crate::models::{JoinReport, OutcomePoint, RatesResponse, SummaryQuery, SummaryResponse};
use crate::state::AppState;
use crate::stats::{latest_rates, statewide_series};
use crate::trend::{SUMMARY_HEADERS, compute_trend, summary_rows};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use chrono::{Local, NaiveDate};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let summary = summary_for(&state, &state.default_locality, today());
    Html(render_index(&state, &summary))
}

pub async fn get_localities(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.table.localities().map(str::to_string).collect())
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let as_of = match query.as_of.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_report_date(raw)
            .ok_or_else(|| AppError::bad_request(format!("as_of must be YYYY-MM-DD, got {raw:?}")))?,
        None => today(),
    };
    let locality = query
        .locality
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(&*state.default_locality);

    Ok(Json(summary_for(&state, locality, as_of)))
}

pub async fn get_statewide(State(state): State<AppState>) -> Json<Vec<OutcomePoint>> {
    Json(statewide_series(&state.table))
}

pub async fn get_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let (report_date, rows) = latest_rates(&state.table);
    Json(RatesResponse {
        report_date,
        geojson_url: state.geojson_url.to_string(),
        rows,
    })
}

pub async fn get_join_report(State(state): State<AppState>) -> Json<JoinReport> {
    Json(state.join_report.as_ref().clone())
}

/// Trend failures become an inline message, never an HTTP error.
pub fn summary_for(state: &AppState, locality: &str, as_of: NaiveDate) -> SummaryResponse {
    match compute_trend(&state.table, locality, as_of) {
        Ok(summary) => SummaryResponse::Ok {
            headers: SUMMARY_HEADERS,
            rows: summary_rows(&summary),
            summary,
        },
        Err(err) => {
            debug!("summary unavailable: {err}");
            SummaryResponse::Unavailable {
                locality: locality.to_string(),
                reason: err.reason(),
                message: err.to_string(),
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
