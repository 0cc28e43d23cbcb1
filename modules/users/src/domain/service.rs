use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::UsersConfig;
use crate::contract::model::{NewUser, Role, User};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

/// Registration number used for the bootstrapped administrator account.
const ADMIN_REGISTRATION_NUMBER: &str = "ADMIN001";

/// Domain service with business rules for account management.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: UsersConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, config: UsersConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "users.service.register_user", skip(self, new_user), fields(registration_number = %new_user.registration_number))]
    pub async fn register_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Registering new user");

        self.validate_new_user(&new_user)?;

        let number_taken = self
            .repo
            .registration_number_exists(&new_user.registration_number)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let email_taken = self
            .repo
            .email_exists(&new_user.email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if number_taken || email_taken {
            return Err(DomainError::identity_taken());
        }

        let password_hash = hash_password(&new_user.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            registration_number: new_user.registration_number,
            email: new_user.email,
            name: new_user.name,
            role: Role::Student,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(user.clone(), password_hash)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully registered user with id={}", user.id);
        Ok(user)
    }

    /// Authenticate a student or admin by registration number and password.
    #[instrument(name = "users.service.authenticate", skip(self, password))]
    pub async fn authenticate(
        &self,
        registration_number: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let (user, stored_hash) = self
            .repo
            .find_credentials_by_registration_number(registration_number)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(DomainError::invalid_credentials)?;

        if !verify_password(password, &stored_hash) {
            return Err(DomainError::invalid_credentials());
        }

        debug!("Authenticated user {}", user.id);
        Ok(user)
    }

    /// Authenticate an administrator by email and password.
    ///
    /// When the supplied credentials equal the configured bootstrap pair,
    /// the admin account is created on first login.
    #[instrument(name = "users.service.authenticate_admin", skip(self, password))]
    pub async fn authenticate_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let bootstrap = !self.config.admin_email.is_empty()
            && email == self.config.admin_email
            && password == self.config.admin_password;

        if bootstrap {
            if let Some((user, _)) = self
                .repo
                .find_admin_credentials_by_email(email)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
            {
                return Ok(user);
            }
            return self.bootstrap_admin(email, password).await;
        }

        let (user, stored_hash) = self
            .repo
            .find_admin_credentials_by_email(email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(DomainError::invalid_credentials)?;

        if !verify_password(password, &stored_hash) {
            return Err(DomainError::invalid_credentials());
        }

        debug!("Authenticated admin {}", user.id);
        Ok(user)
    }

    async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<User, DomainError> {
        warn!("Bootstrapping administrator account for {}", email);

        let password_hash = hash_password(password)?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            registration_number: ADMIN_REGISTRATION_NUMBER.to_string(),
            email: email.to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(user.clone(), password_hash)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(user)
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
        self.repo
            .find_by_ids(ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Student accounts, newest first.
    #[instrument(name = "users.service.list_students", skip(self))]
    pub async fn list_students(&self) -> Result<Vec<User>, DomainError> {
        self.repo
            .list_by_role(Role::Student)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        let user = self.get_user(id).await?;
        if user.role == Role::Admin {
            return Err(DomainError::cannot_delete_admin());
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }

    #[instrument(name = "users.service.verify_user", skip(self), fields(user_id = %id))]
    pub async fn verify_user(&self, id: Uuid) -> Result<User, DomainError> {
        let updated = self
            .repo
            .set_verified(id, true)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !updated {
            return Err(DomainError::user_not_found(id));
        }
        self.get_user(id).await
    }

    // --- validation helpers ---

    fn validate_new_user(&self, new_user: &NewUser) -> Result<(), DomainError> {
        self.validate_registration_number(&new_user.registration_number)?;
        self.validate_email(&new_user.email)?;
        if new_user.name.trim().is_empty() {
            return Err(DomainError::empty_name());
        }
        if new_user.password.len() < self.config.min_password_length {
            return Err(DomainError::password_too_short(
                self.config.min_password_length,
            ));
        }
        Ok(())
    }

    fn validate_registration_number(&self, number: &str) -> Result<(), DomainError> {
        let digits = self.config.registration_number_digits;
        if number.len() != digits || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_registration_number(digits));
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), DomainError> {
        if email.is_empty() || !email.contains('@') || !email.contains('.') {
            return Err(DomainError::invalid_email(email.to_string()));
        }
        Ok(())
    }
}

// --- credential helpers ---

fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DomainError::database(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
