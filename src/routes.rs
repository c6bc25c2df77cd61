// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, campus_drive, exam},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, campus drives, exams).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
///
/// Admin-only handlers take an `AdminUser` extractor instead of a route layer,
/// so public and admin methods can share a path.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new().route("/login", post(auth::login));

    let campus_drive_routes = Router::new()
        .route(
            "/",
            get(campus_drive::list_drives).post(campus_drive::create_drive),
        )
        .route("/categories", get(campus_drive::list_categories))
        .route(
            "/{id}",
            get(campus_drive::get_drive)
                .put(campus_drive::update_drive)
                .delete(campus_drive::delete_drive),
        )
        .route(
            "/{id}/toggle-status",
            patch(campus_drive::toggle_drive_status),
        );

    let exam_routes = Router::new()
        .route("/", get(exam::list_exams).post(exam::create_exam))
        .route("/submit-quiz", post(exam::submit_quiz))
        .route("/{id}", get(exam::get_exam).delete(exam::delete_exam))
        .route("/{id}/results", get(exam::list_results));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/campus-drives", campus_drive_routes)
        .nest("/api/exams", exam_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `*` anywhere in the list allows every origin; a wildcard cannot be
/// mixed into an explicit origin list.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS_ORIGINS contains '*', allowing any origin");
        return AllowOrigin::any();
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    AllowOrigin::list(values)
}
