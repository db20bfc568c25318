use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{AllocationError, Allocator};
use crate::models::{
    AllocationOptions, AllocationResponse, ComputeAllocationRequest, ErrorResponse,
    HealthResponse, RunAllocationRequest, SubmissionPayload,
};
use crate::services::{JsonFileWriter, SourceClient, SubmissionClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<SourceClient>,
    /// Absent when no submission endpoint is configured
    pub submission: Option<Arc<SubmissionClient>>,
    /// Absent when no output directory is configured
    pub files: Option<Arc<JsonFileWriter>>,
    pub allocator: Allocator,
}

/// Configure all allocation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/allocations/compute", web::post().to(compute_allocation))
        .route("/allocations/run", web::post().to(run_allocation));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn allocation_error_response(err: AllocationError) -> HttpResponse {
    match err {
        AllocationError::Configuration(_) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Allocation not possible",
            err.to_string(),
        ),
    }
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Allocate over records supplied in the body
///
/// POST /api/v1/allocations/compute
///
/// Request body:
/// ```json
/// {
///   "acmRecords": ["string"],
///   "studentResponses": [{ "responseId": "string", "choices": ["string", "string", "string"] }],
///   "topicMaps": [{ "topicMapId": "string", "topicRecordId": "string", "acmRecordId": "string" }],
///   "supervisorAcms": [{ "responseId": "string", "acmRecordId": "string" }],
///   "supervisorResponses": [{ "supervisorId": "string", "capacity": 2 }],
///   "rebalance": true
/// }
/// ```
async fn compute_allocation(
    state: web::Data<AppState>,
    req: web::Json<ComputeAllocationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for compute request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let allocator = match req.rebalance {
        Some(rebalance) => Allocator::new(AllocationOptions { rebalance }),
        None => state.allocator.clone(),
    };

    tracing::info!(
        "Computing allocation for {} student responses and {} supervisor responses",
        req.student_responses.len(),
        req.supervisor_responses.len()
    );

    match allocator.allocate(&req.into_records()) {
        Ok(outcome) => HttpResponse::Ok().json(AllocationResponse::from_outcome(outcome, None)),
        Err(e) => {
            tracing::warn!("Allocation rejected: {}", e);
            allocation_error_response(e)
        }
    }
}

/// Fetch records from the source, allocate and hand the result on
///
/// POST /api/v1/allocations/run
///
/// Request body:
/// ```json
/// {
///   "label": "spring-round",
///   "submit": true,
///   "writeFiles": false
/// }
/// ```
async fn run_allocation(
    state: web::Data<AppState>,
    req: web::Json<RunAllocationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let records = match state.source.fetch_all().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to fetch records: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch records", e.to_string());
        }
    };

    let outcome = match state.allocator.allocate(&records) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Allocation rejected: {}", e);
            return allocation_error_response(e);
        }
    };

    let mut files_written = false;
    if req.write_files {
        match &state.files {
            Some(writer) => {
                if let Err(e) = writer.write_outcome(&outcome).await {
                    tracing::error!("Failed to write result files: {}", e);
                    return error_response(
                        StatusCode::BAD_GATEWAY,
                        "Failed to write result files",
                        e.to_string(),
                    );
                }
                files_written = true;
            }
            None => tracing::warn!("File output requested but no output directory is configured"),
        }
    }

    let mut submitted = false;
    if req.submit {
        match &state.submission {
            Some(client) => {
                if let Err(e) = client.submit(&SubmissionPayload::from(&outcome)).await {
                    tracing::error!("Failed to submit matches: {}", e);
                    return error_response(
                        StatusCode::BAD_GATEWAY,
                        "Failed to submit matches",
                        e.to_string(),
                    );
                }
                submitted = true;
            }
            None => tracing::warn!("Submission requested but no submission endpoint is configured"),
        }
    }

    let mut response = AllocationResponse::from_outcome(outcome, req.into_inner().label);
    response.submitted = submitted;
    response.files_written = files_written;

    tracing::info!(
        "Run {} finished: {} assigned, {} unmatched students (submitted: {}, files: {})",
        response.run_id,
        response.summary.assigned_candidates,
        response.summary.unmatched_candidates,
        submitted,
        files_written
    );

    HttpResponse::Ok().json(response)
}
