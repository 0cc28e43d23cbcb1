use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::User;

/// Client trait for other modules that need user identities
/// (notification recipients, participant listings).
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<User>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
}
