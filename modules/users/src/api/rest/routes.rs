use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the users router. The server mounts it under `/api` and installs
/// the shared `AuthCodec` extension the handlers and extractors rely on.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register_user))
        .route("/auth/login", post(handlers::login))
        .route("/auth/admin/login", post(handlers::admin_login))
        .route("/auth/profile", get(handlers::profile))
        .route("/admin/users", get(handlers::list_students))
        .route(
            "/admin/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/admin/users/{id}/verify", put(handlers::verify_user))
        .layer(Extension(service))
}
