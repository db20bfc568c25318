use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use supervisor_match::config::Settings;
use supervisor_match::core::Allocator;
use supervisor_match::models::AllocationOptions;
use supervisor_match::routes::{self, allocations::AppState};
use supervisor_match::services::{JsonFileWriter, SourceClient, SourceEndpoints, SubmissionClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();

    // Initialize logging; LOG_LEVEL and LOG_FORMAT win over the [logging] section
    let logging = loaded
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting supervisor allocation service...");

    let settings = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error("Configuration error", e)
    })?;

    info!("Configuration loaded successfully");

    // Record source
    let endpoints = SourceEndpoints {
        acm_records: settings.source.acm_records_url.clone(),
        student_responses: settings.source.student_responses_url.clone(),
        topic_maps: settings.source.topic_maps_url.clone(),
        supervisor_acms: settings.source.supervisor_acms_url.clone(),
        supervisor_responses: settings.source.supervisor_responses_url.clone(),
    };
    let source_timeout = Duration::from_secs(settings.source.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let source = Arc::new(
        SourceClient::new(endpoints, source_timeout)
            .map_err(|e| io_error("Failed to build source client", e))?,
    );

    info!("Source client initialized (timeout: {:?})", source_timeout);

    // Submission endpoint (optional)
    let sink_timeout = Duration::from_secs(settings.sink.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let submission = match settings.sink.submission_url.clone() {
        Some(url) => Some(Arc::new(
            SubmissionClient::new(url, sink_timeout)
                .map_err(|e| io_error("Failed to build submission client", e))?,
        )),
        None => {
            warn!("No submission endpoint configured, runs will not be submitted");
            None
        }
    };

    // Result files (optional)
    let files = settings.sink.output_dir.clone().map(|dir| {
        info!("Result files will be written to {}", dir);
        Arc::new(JsonFileWriter::new(dir))
    });

    let allocator = Allocator::new(AllocationOptions {
        rebalance: settings.allocation.rebalance,
    });

    info!("Allocator initialized with options: {:?}", allocator.options());

    // Build application state
    let app_state = AppState {
        source,
        submission,
        files,
        allocator,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(16 * 1024 * 1024)
                    .error_handler(handle_json_payload_error),
            )
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
