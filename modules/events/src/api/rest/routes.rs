use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the events router. The server mounts it under `/api` and installs
/// the shared `AuthCodec` extension the identity extractors rely on.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/events/grouped/{year}", get(handlers::grouped_by_year))
        .route("/events/month/{year}/{month}", get(handlers::list_month))
        .route("/events/my-events", get(handlers::my_events))
        .route(
            "/events/{id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/events/{id}/register", post(handlers::register))
        .route("/events/{id}/unregister", post(handlers::unregister))
        .route(
            "/events/{id}/feedback",
            post(handlers::submit_feedback).get(handlers::feedback_summary),
        )
        .route(
            "/admin/events/{id}/registrations",
            get(handlers::list_registrations),
        )
        .layer(Extension(service))
}
