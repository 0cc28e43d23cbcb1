use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use uuid::Uuid;

use users::{
    api::rest::auth::AuthCodec,
    api::rest::dto::{AuthResponse, LoginReq, RegisterUserReq, RegisterUserResponse, UserDto},
    config::UsersConfig,
    contract::model::{NewUser, Role},
    domain::error::DomainError,
    domain::service::Service,
    infra::storage::migrations::Migrator,
    infra::storage::sea_orm_repo::SeaOrmUsersRepository,
};

/// Create a fresh test database for each test.
/// A single pooled connection keeps the in-memory database alive and shared.
async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

fn test_config() -> UsersConfig {
    UsersConfig {
        admin_email: "admin@campus.test".to_string(),
        admin_password: "sup3r-secret".to_string(),
        ..UsersConfig::default()
    }
}

async fn create_test_service() -> Arc<Service> {
    let db = create_test_db().await;
    let repo = Arc::new(SeaOrmUsersRepository::new(db));
    Arc::new(Service::new(repo, test_config()))
}

fn new_user(number: &str, email: &str) -> NewUser {
    NewUser {
        registration_number: number.to_string(),
        email: email.to_string(),
        name: "Test Student".to_string(),
        password: "password123".to_string(),
    }
}

fn create_test_router(service: Arc<Service>) -> Router {
    let codec = Arc::new(AuthCodec::new("test-secret", 1));
    Router::new()
        .merge(users::api::rest::routes::router(service))
        .layer(Extension(codec))
}

#[tokio::test]
async fn test_register_and_get_user() -> Result<()> {
    let service = create_test_service().await;

    let created = service
        .register_user(new_user("100001", "student@campus.test"))
        .await?;
    assert_eq!(created.registration_number, "100001");
    assert_eq!(created.role, Role::Student);
    assert!(created.is_verified);

    let fetched = service.get_user(created.id).await?;
    assert_eq!(fetched, created);

    Ok(())
}

#[tokio::test]
async fn test_registration_number_format_enforced() -> Result<()> {
    let service = create_test_service().await;

    // too short
    let result = service
        .register_user(new_user("123", "short@campus.test"))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidRegistrationNumber { digits: 6 })
    ));

    // non-digits
    let result = service
        .register_user(new_user("12345a", "alpha@campus.test"))
        .await;
    assert!(matches!(
        result,
        Err(DomainError::InvalidRegistrationNumber { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_validation_rejects_bad_input() -> Result<()> {
    let service = create_test_service().await;

    let mut bad_email = new_user("100001", "not-an-email");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        service.register_user(bad_email).await,
        Err(DomainError::InvalidEmail { .. })
    ));

    let mut no_name = new_user("100001", "a@b.com");
    no_name.name = "  ".to_string();
    assert!(matches!(
        service.register_user(no_name).await,
        Err(DomainError::EmptyName)
    ));

    let mut weak = new_user("100001", "a@b.com");
    weak.password = "short".to_string();
    assert!(matches!(
        service.register_user(weak).await,
        Err(DomainError::PasswordTooShort { min: 8 })
    ));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_identity_rejected() -> Result<()> {
    let service = create_test_service().await;

    service
        .register_user(new_user("100001", "first@campus.test"))
        .await?;

    // same registration number, different email
    let result = service
        .register_user(new_user("100001", "other@campus.test"))
        .await;
    assert!(matches!(result, Err(DomainError::IdentityTaken)));

    // same email, different registration number
    let result = service
        .register_user(new_user("100002", "first@campus.test"))
        .await;
    assert!(matches!(result, Err(DomainError::IdentityTaken)));

    Ok(())
}

#[tokio::test]
async fn test_authenticate() -> Result<()> {
    let service = create_test_service().await;
    service
        .register_user(new_user("100001", "login@campus.test"))
        .await?;

    let user = service.authenticate("100001", "password123").await?;
    assert_eq!(user.email, "login@campus.test");

    assert!(matches!(
        service.authenticate("100001", "wrong-password").await,
        Err(DomainError::InvalidCredentials)
    ));
    assert!(matches!(
        service.authenticate("999999", "password123").await,
        Err(DomainError::InvalidCredentials)
    ));

    Ok(())
}

#[tokio::test]
async fn test_admin_bootstrap() -> Result<()> {
    let service = create_test_service().await;

    // First login with the configured credentials creates the account
    let admin = service
        .authenticate_admin("admin@campus.test", "sup3r-secret")
        .await?;
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.registration_number, "ADMIN001");

    // Second login resolves the same account
    let again = service
        .authenticate_admin("admin@campus.test", "sup3r-secret")
        .await?;
    assert_eq!(again.id, admin.id);

    // Wrong password is rejected even for the bootstrap email
    assert!(matches!(
        service
            .authenticate_admin("admin@campus.test", "wrong")
            .await,
        Err(DomainError::InvalidCredentials)
    ));

    // Unknown admin is rejected
    assert!(matches!(
        service.authenticate_admin("nobody@campus.test", "x").await,
        Err(DomainError::InvalidCredentials)
    ));

    Ok(())
}

#[tokio::test]
async fn test_list_students_excludes_admin() -> Result<()> {
    let service = create_test_service().await;

    service
        .authenticate_admin("admin@campus.test", "sup3r-secret")
        .await?;
    service
        .register_user(new_user("100001", "s1@campus.test"))
        .await?;
    service
        .register_user(new_user("100002", "s2@campus.test"))
        .await?;

    let students = service.list_students().await?;
    assert_eq!(students.len(), 2);
    assert!(students.iter().all(|u| u.role == Role::Student));

    Ok(())
}

#[tokio::test]
async fn test_delete_user_refuses_admin() -> Result<()> {
    let service = create_test_service().await;

    let admin = service
        .authenticate_admin("admin@campus.test", "sup3r-secret")
        .await?;
    assert!(matches!(
        service.delete_user(admin.id).await,
        Err(DomainError::CannotDeleteAdmin)
    ));

    let student = service
        .register_user(new_user("100001", "gone@campus.test"))
        .await?;
    service.delete_user(student.id).await?;
    assert!(matches!(
        service.get_user(student.id).await,
        Err(DomainError::UserNotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_verify_user() -> Result<()> {
    let service = create_test_service().await;

    let user = service
        .register_user(new_user("100001", "v@campus.test"))
        .await?;
    let verified = service.verify_user(user.id).await?;
    assert!(verified.is_verified);

    assert!(matches!(
        service.verify_user(Uuid::new_v4()).await,
        Err(DomainError::UserNotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_rest_register_and_login() -> Result<()> {
    let service = create_test_service().await;
    let router = create_test_router(service);

    let register = RegisterUserReq {
        registration_number: "100001".to_string(),
        email: "rest@campus.test".to_string(),
        name: "REST Student".to_string(),
        password: "password123".to_string(),
    };
    let request = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&register)?))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let created: RegisterUserResponse = serde_json::from_slice(&body)?;
    assert_eq!(created.user.registration_number, "100001");

    let login = LoginReq {
        registration_number: "100001".to_string(),
        password: "password123".to_string(),
    };
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&login)?))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let auth: AuthResponse = serde_json::from_slice(&body)?;
    assert!(!auth.token.is_empty());

    // Token works against the profile endpoint
    let request = Request::builder()
        .method("GET")
        .uri("/auth/profile")
        .header("authorization", format!("Bearer {}", auth.token))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let profile: UserDto = serde_json::from_slice(&body)?;
    assert_eq!(profile.email, "rest@campus.test");

    Ok(())
}

#[tokio::test]
async fn test_rest_login_rejects_bad_credentials() -> Result<()> {
    let service = create_test_service().await;
    let router = create_test_router(service);

    let login = LoginReq {
        registration_number: "100001".to_string(),
        password: "nope".to_string(),
    };
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&login)?))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_rest_profile_requires_token() -> Result<()> {
    let service = create_test_service().await;
    let router = create_test_router(service);

    let request = Request::builder()
        .method("GET")
        .uri("/auth/profile")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_rest_admin_routes_forbidden_for_students() -> Result<()> {
    let service = create_test_service().await;
    let router = create_test_router(service.clone());

    let student = service
        .register_user(new_user("100001", "plain@campus.test"))
        .await?;
    let codec = AuthCodec::new("test-secret", 1);
    let token = codec.issue(&student)?;

    let request = Request::builder()
        .method("GET")
        .uri("/admin/users")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_rest_tampered_token_rejected() -> Result<()> {
    let service = create_test_service().await;
    let router = create_test_router(service.clone());

    let student = service
        .register_user(new_user("100001", "tamper@campus.test"))
        .await?;
    // Signed with a different secret than the router's codec
    let other_codec = AuthCodec::new("other-secret", 1);
    let token = other_codec.issue(&student)?;

    let request = Request::builder()
        .method("GET")
        .uri("/auth/profile")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
