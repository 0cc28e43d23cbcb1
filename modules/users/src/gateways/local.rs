use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{client::UsersApi, error::UsersError, model::User};
use crate::domain::{error::DomainError, service::Service};

/// Local implementation of the UsersApi trait that delegates to the domain service
pub struct UsersLocalClient {
    service: Arc<Service>,
}

impl UsersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersApi for UsersLocalClient {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<User> {
        self.service
            .get_user(id)
            .await
            .map_err(map_domain_error_to_anyhow)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        self.service
            .find_by_ids(ids)
            .await
            .map_err(map_domain_error_to_anyhow)
    }
}

/// Map domain errors to contract errors wrapped in anyhow
fn map_domain_error_to_anyhow(domain_error: DomainError) -> anyhow::Error {
    let contract_error = match domain_error {
        DomainError::UserNotFound { id } => UsersError::not_found(id),
        DomainError::IdentityTaken | DomainError::CannotDeleteAdmin => {
            UsersError::conflict(domain_error.to_string())
        }
        DomainError::InvalidRegistrationNumber { .. }
        | DomainError::InvalidEmail { .. }
        | DomainError::EmptyName
        | DomainError::PasswordTooShort { .. } => UsersError::validation(domain_error.to_string()),
        DomainError::InvalidCredentials => UsersError::unauthorized(),
        DomainError::Database { .. } => UsersError::internal(),
    };

    anyhow::Error::new(contract_error)
}
