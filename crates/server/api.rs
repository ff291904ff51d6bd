//! HTTP routes of the later server.

use actix_web::http::StatusCode;
use actix_web::{error, web, HttpResponse};
use later_core::wire::{
    ErrorResponse, HealthResponse, IdList, PendingResponse, PopRequest, PopResponse, PushRequest,
};
use later_core::{Job, LaterError, Queue};

/// Application state shared across handlers.
pub struct AppState {
    pub queue: Queue,
}

/// Configure API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("")
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    .route("/jobs", web::post().to(push))
                    .route("/jobs", web::delete().to(remove))
                    .route("/jobs/pop", web::post().to(pop))
                    .route("/pending", web::get().to(pending)),
            ),
    );
}

/// Malformed bodies answer with an `ErrorResponse` like every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new("bad_request", err.to_string());
        let response = HttpResponse::BadRequest().json(body);
        error::InternalError::from_response(err, response).into()
    })
}

/// HTTP status for a queue error.
pub fn status_for(err: &LaterError) -> StatusCode {
    match err {
        LaterError::NoJobsProvided | LaterError::NoIdsProvided | LaterError::InvalidLimit(_) => {
            StatusCode::BAD_REQUEST
        }
        LaterError::PartialPush { .. } | LaterError::PartialRemoval { .. } => StatusCode::CONFLICT,
        LaterError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
        LaterError::CorruptPayload { .. }
        | LaterError::Serialization(_)
        | LaterError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: LaterError) -> HttpResponse {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, code = err.code(), "Request failed");
    } else {
        tracing::debug!(error = %err, code = err.code(), "Request rejected");
    }
    HttpResponse::build(status).json(ErrorResponse::from(&err))
}

/// Health check endpoint.
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Schedule a batch of jobs.
async fn push(state: web::Data<AppState>, body: web::Json<PushRequest>) -> HttpResponse {
    let jobs: Vec<Job> = body.into_inner().jobs.into_iter().map(Job::from).collect();

    match state.queue.push(jobs).await {
        Ok(ids) => HttpResponse::Ok().json(IdList { ids }),
        Err(e) => error_response(e),
    }
}

/// Remove jobs by id.
async fn remove(state: web::Data<AppState>, body: web::Json<IdList>) -> HttpResponse {
    match state.queue.remove(&body.ids).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Pop due jobs.
async fn pop(state: web::Data<AppState>, body: web::Json<PopRequest>) -> HttpResponse {
    let limit = match usize::try_from(body.limit) {
        Ok(limit) if limit > 0 => limit,
        _ => return error_response(LaterError::InvalidLimit(body.limit)),
    };

    match state.queue.pop_jobs(limit).await {
        Ok(jobs) => HttpResponse::Ok().json(PopResponse { jobs }),
        Err(e) => error_response(e),
    }
}

/// Number of queued jobs, due or not.
async fn pending(state: web::Data<AppState>) -> HttpResponse {
    match state.queue.pending().await {
        Ok(count) => HttpResponse::Ok().json(PendingResponse { count }),
        Err(e) => error_response(e),
    }
}
