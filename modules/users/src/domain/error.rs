use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("User with this registration number or email already exists")]
    IdentityTaken,

    #[error("Registration number must be exactly {digits} digits")]
    InvalidRegistrationNumber { digits: usize },

    #[error("Invalid email format: '{email}'")]
    InvalidEmail { email: String },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Cannot delete admin user")]
    CannotDeleteAdmin,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn identity_taken() -> Self {
        Self::IdentityTaken
    }

    pub fn invalid_registration_number(digits: usize) -> Self {
        Self::InvalidRegistrationNumber { digits }
    }

    pub fn invalid_email(email: String) -> Self {
        Self::InvalidEmail { email }
    }

    pub fn empty_name() -> Self {
        Self::EmptyName
    }

    pub fn password_too_short(min: usize) -> Self {
        Self::PasswordTooShort { min }
    }

    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    pub fn cannot_delete_admin() -> Self {
        Self::CannotDeleteAdmin
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
