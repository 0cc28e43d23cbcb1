use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{Role, User};

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Password hashes never appear on the contract model; the lookups that
/// authenticate a caller return the stored hash alongside the user.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Load a batch of users by id (order unspecified).
    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
    /// Credential lookup by registration number.
    async fn find_credentials_by_registration_number(
        &self,
        number: &str,
    ) -> anyhow::Result<Option<(User, String)>>;
    /// Credential lookup for an admin account by email.
    async fn find_admin_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<(User, String)>>;
    /// Uniqueness checks.
    async fn registration_number_exists(&self, number: &str) -> anyhow::Result<bool>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed domain user with its password hash.
    ///
    /// Service computes id/timestamps/validation; repo persists.
    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<()>;
    /// Flip the verification flag. Returns false when the user is missing.
    async fn set_verified(&self, id: Uuid, verified: bool) -> anyhow::Result<bool>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// List accounts with the given role, newest first.
    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>>;
}
