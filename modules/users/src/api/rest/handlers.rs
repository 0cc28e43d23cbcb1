use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::auth::{AuthCodec, CurrentUser, RequireAdmin};
use crate::api::rest::dto::{
    AdminLoginReq, AuthResponse, LoginReq, MessageResponse, RegisterUserReq, RegisterUserResponse,
    UserDto, UserListDto,
};
use crate::api::rest::error::ApiError;
use crate::domain::service::Service;

/// Register a new student account
pub async fn register_user(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<RegisterUserReq>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), ApiError> {
    info!("Registering user {}", req.registration_number);

    let user = svc.register_user(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            message: "Registration successful! You can now login.".to_string(),
            user: UserDto::from(user),
        }),
    ))
}

/// Login with registration number and password
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    Extension(codec): Extension<Arc<AuthCodec>>,
    Json(req): Json<LoginReq>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = svc
        .authenticate(&req.registration_number, &req.password)
        .await?;
    let token = codec.issue(&user).map_err(|_| ApiError::internal())?;
    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(user),
    }))
}

/// Login as administrator with email and password
pub async fn admin_login(
    Extension(svc): Extension<Arc<Service>>,
    Extension(codec): Extension<Arc<AuthCodec>>,
    Json(req): Json<AdminLoginReq>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = svc.authenticate_admin(&req.email, &req.password).await?;
    let token = codec.issue(&user).map_err(|_| ApiError::internal())?;
    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(user),
    }))
}

/// Profile of the authenticated caller
pub async fn profile(
    Extension(svc): Extension<Arc<Service>>,
    current: CurrentUser,
) -> Result<Json<UserDto>, ApiError> {
    let user = svc.get_user(current.id).await?;
    Ok(Json(UserDto::from(user)))
}

/// List student accounts, newest first (admin)
pub async fn list_students(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
) -> Result<Json<UserListDto>, ApiError> {
    let users = svc.list_students().await?;
    let users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(UserListDto {
        total: users.len(),
        users,
    }))
}

/// Get a specific user by ID (admin)
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = svc.get_user(id).await?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user by ID (admin); registrations cascade
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting user {}", id);

    svc.delete_user(id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Manually mark a user as verified (admin)
pub async fn verify_user(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = svc.verify_user(id).await?;
    Ok(Json(UserDto::from(user)))
}
