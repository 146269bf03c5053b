use actix_web::{http::header, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::pipeline::{self, parse_radius, MatchRun};
use crate::error::MatchError;
use crate::models::{ErrorResponse, HealthResponse, ProcessRequest, ProcessResponse};
use crate::services::{download_file_name, ResultStore};
use std::sync::Arc;

/// Path the stored results can be fetched from
pub const DOWNLOAD_PATH: &str = "/api/v1/matches/download";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResultStore>,
    pub max_radius_m: Option<f64>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::post().to(process_matches))
        .route("/matches/download", web::get().to(download_results));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Match two datasets endpoint
///
/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "data1": "name,lat,lon\nAlpha,0.0,0.0\n",
///   "data2": "name;lat;lon\nBeta;0.0;0.001\n",
///   "radius": "200"
/// }
/// ```
async fn process_matches(
    state: web::Data<AppState>,
    req: web::Json<ProcessRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for process request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let radius = match parse_radius(&req.radius) {
        Ok(radius) => radius,
        Err(e) => return error_response(&e),
    };

    if let Some(max) = state.max_radius_m {
        if radius > max {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid radius".to_string(),
                message: format!("Radius {} exceeds the maximum of {} meters", radius, max),
                status_code: 400,
            });
        }
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("Run {}: matching within {} m", run_id, radius);

    let store = state.store.clone();
    let body = req.into_inner();

    // The core is synchronous; keep it off the async workers
    let outcome = web::block(move || -> crate::error::Result<MatchRun> {
        let run = pipeline::run(body.data1.as_bytes(), body.data2.as_bytes(), radius)?;
        store.save(&run.matches)?;
        Ok(run)
    })
    .await;

    let run = match outcome {
        Ok(Ok(run)) => run,
        Ok(Err(e)) => {
            tracing::error!("Run {} failed: {}", run_id, e);
            return error_response(&e);
        }
        Err(e) => {
            tracing::error!("Run {} could not be scheduled: {}", run_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to process files".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if !run.data1.skipped.is_empty() || !run.data2.skipped.is_empty() {
        tracing::warn!(
            "Run {}: skipped {} rows in data1 and {} rows in data2",
            run_id,
            run.data1.skipped.len(),
            run.data2.skipped.len()
        );
    }

    tracing::info!(
        "Run {}: {} matches from {} x {} points",
        run_id,
        run.matches.len(),
        run.data1.points.len(),
        run.data2.points.len()
    );

    HttpResponse::Ok().json(ProcessResponse {
        run_id,
        match_count: run.matches.len(),
        points_a: run.data1.points.len(),
        points_b: run.data2.points.len(),
        skipped_a: run.data1.skipped,
        skipped_b: run.data2.skipped,
        download_url: DOWNLOAD_PATH.to_string(),
    })
}

/// Download the latest results
///
/// GET /api/v1/matches/download
async fn download_results(state: web::Data<AppState>) -> impl Responder {
    let store = state.store.clone();

    let contents = match web::block(move || store.read_latest()).await {
        Ok(Ok(contents)) => contents,
        Ok(Err(e)) => {
            tracing::error!("Failed to read results: {}", e);
            return error_response(&e);
        }
        Err(e) => {
            tracing::error!("Failed to read results: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to read results".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let Some(bytes) = contents else {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "Results not found".to_string(),
            message: "No results have been produced yet".to_string(),
            status_code: 404,
        });
    };

    let file_name = download_file_name(&chrono::Local::now());

    HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", file_name),
        ))
        .body(bytes)
}

fn error_response(err: &MatchError) -> HttpResponse {
    match err {
        MatchError::InvalidRadius(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid radius".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        MatchError::Format(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Failed to process files".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        MatchError::Io(_) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to process files".to_string(),
            message: err.to_string(),
            status_code: 500,
        }),
    }
}
