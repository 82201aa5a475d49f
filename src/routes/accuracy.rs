use std::sync::Arc;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, response::Response,
    routing::get, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::analysis::{align, pivot, AccuracyReport, AnalysisError, Frame};
use crate::{ForecastRecord, RecordStore};

// ---

pub fn router() -> Router<RecordStore> {
    // ---
    Router::new()
        .route("/accuracy", get(report))
        .route("/accuracy/horizons", get(horizons))
        .route("/accuracy/errors", get(errors))
        .route("/accuracy/summary", get(summary))
        .route("/accuracy/persistence", get(persistence))
}

/// Query parameters shared by the accuracy endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AccuracyQuery {
    /// Drop the memoized records and reload them from the store.
    refresh: Option<bool>,
}

async fn report(
    Query(params): Query<AccuracyQuery>,
    State(store): State<RecordStore>,
) -> Result<Json<AccuracyReport>, ApiError> {
    // ---
    info!("GET /accuracy");
    let records = load(&store, &params).await?;
    Ok(Json(AccuracyReport::build(&records)?))
}

async fn horizons(
    Query(params): Query<AccuracyQuery>,
    State(store): State<RecordStore>,
) -> Result<Json<Frame>, ApiError> {
    // ---
    info!("GET /accuracy/horizons");
    let records = load(&store, &params).await?;
    Ok(Json(pivot(&records)?.to_frame()))
}

async fn errors(
    Query(params): Query<AccuracyQuery>,
    State(store): State<RecordStore>,
) -> Result<Json<Frame>, ApiError> {
    // ---
    info!("GET /accuracy/errors");
    let records = load(&store, &params).await?;
    let tf = pivot(&records)?;
    Ok(Json(align(&tf)?.to_frame()))
}

#[derive(Debug, Serialize)]
struct SummaryResponse {
    accuracy: Frame,
    persistence_rmse: f64,
    persistence_vs: Frame,
}

async fn summary(
    Query(params): Query<AccuracyQuery>,
    State(store): State<RecordStore>,
) -> Result<Json<SummaryResponse>, ApiError> {
    // ---
    info!("GET /accuracy/summary");
    let records = load(&store, &params).await?;
    let report = AccuracyReport::build(&records)?;
    Ok(Json(SummaryResponse {
        accuracy: report.accuracy,
        persistence_rmse: report.persistence_rmse,
        persistence_vs: report.persistence_vs,
    }))
}

#[derive(Debug, Serialize)]
struct PersistenceResponse {
    persistence: Frame,
    persistence_rmse: f64,
    persistence_table: Frame,
}

async fn persistence(
    Query(params): Query<AccuracyQuery>,
    State(store): State<RecordStore>,
) -> Result<Json<PersistenceResponse>, ApiError> {
    // ---
    info!("GET /accuracy/persistence");
    let records = load(&store, &params).await?;
    let report = AccuracyReport::build(&records)?;
    Ok(Json(PersistenceResponse {
        persistence: report.persistence,
        persistence_rmse: report.persistence_rmse,
        persistence_table: report.persistence_table,
    }))
}

// ---

async fn load(store: &RecordStore, params: &AccuracyQuery) -> Result<Arc<Vec<ForecastRecord>>, ApiError> {
    // ---
    let records = if params.refresh.unwrap_or(false) {
        debug!("Refresh requested, reloading records");
        store.reload().await?
    } else {
        store.records().await?
    };
    debug!("Working with {} records", records.len());
    Ok(records)
}

/// Failure of a request; the response carries no partial results.
#[derive(Debug)]
pub enum ApiError {
    /// The forecast store could not be read.
    Store(anyhow::Error),
    /// The records could not be analysed.
    Analysis(AnalysisError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        // Bad rows surface from the loader as analysis errors
        match e.downcast::<AnalysisError>() {
            Ok(analysis) => ApiError::Analysis(analysis),
            Err(other) => ApiError::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, body) = match self {
            ApiError::Store(e) => {
                error!("Failed to load forecast records: {:#}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        error: "store_unavailable",
                        message: "Failed to load forecast records".to_string(),
                    },
                )
            }
            ApiError::Analysis(e) => {
                error!("Failed to analyse forecast records: {}", e);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorBody {
                        error: e.kind().as_str(),
                        message: e.to_string(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
