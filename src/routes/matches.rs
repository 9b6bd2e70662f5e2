use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{MatchEngine, MatchError};
use crate::models::{CreateMatchRequest, DecideMatchRequest, ErrorResponse, HealthResponse};
use crate::routes::auth::{AuthUser, JwtVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchEngine,
    pub verifier: JwtVerifier,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cat/match")
            .route("", web::post().to(create_match))
            .route("", web::get().to(list_matches))
            .route("/approve", web::post().to(approve_match))
            .route("/reject", web::post().to(reject_match))
            .route("/{id}", web::delete().to(delete_match)),
    );
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.engine.health().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Map an engine error onto the response the client sees.
/// Storage details are logged and never returned.
fn engine_error(err: MatchError, action: &str, user_id: i64) -> HttpResponse {
    if err.is_internal() {
        tracing::error!("Failed to {} for user {}: {}", action, user_id, err);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Internal server error".to_string(),
            message: format!("failed to {}", action),
            status_code: 500,
        });
    }

    let status_code = err.status_code();
    let error = if status_code == 404 { "Not found" } else { "Bad request" };
    let body = ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code,
    };

    if status_code == 404 {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

/// Propose a match
///
/// POST /v1/cat/match
///
/// Request body:
/// ```json
/// {
///   "matchCatId": "string",
///   "userCatId": "string",
///   "message": "string"
/// }
/// ```
async fn create_match(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for create_match request: {:?}", errors);
        return validation_failed(errors);
    }

    match state.engine.create(user.0, &req).await {
        Ok(_) => HttpResponse::Created().finish(),
        Err(e) => engine_error(e, "create match", user.0),
    }
}

/// List matches issued or received by the caller
///
/// GET /v1/cat/match
async fn list_matches(state: web::Data<AppState>, user: AuthUser) -> impl Responder {
    match state.engine.list(user.0).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => engine_error(e, "list matches", user.0),
    }
}

/// Approve a received match
///
/// POST /v1/cat/match/approve
///
/// Request body:
/// ```json
/// { "matchId": "string" }
/// ```
async fn approve_match(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<DecideMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.engine.approve(user.0, &req.match_id).await {
        Ok(()) => HttpResponse::Created().finish(),
        Err(e) => engine_error(e, "approve match", user.0),
    }
}

/// Reject a received match
///
/// POST /v1/cat/match/reject
async fn reject_match(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<DecideMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    match state.engine.reject(user.0, &req.match_id).await {
        Ok(()) => HttpResponse::Created().finish(),
        Err(e) => engine_error(e, "reject match", user.0),
    }
}

/// Withdraw a match the caller issued
///
/// DELETE /v1/cat/match/{id}
async fn delete_match(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> impl Responder {
    let match_id = path.into_inner();

    match state.engine.withdraw(user.0, &match_id).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => engine_error(e, "delete match", user.0),
    }
}
