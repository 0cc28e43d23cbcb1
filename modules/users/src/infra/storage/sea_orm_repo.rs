//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::{Role, User};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};
use crate::infra::storage::mapper::entity_to_contract;

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(entity_to_contract))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = UserEntity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .order_by_asc(Column::Name)
            .all(&self.conn)
            .await
            .context("find_by_ids failed")?;
        Ok(rows.into_iter().map(entity_to_contract).collect())
    }

    async fn find_credentials_by_registration_number(
        &self,
        number: &str,
    ) -> anyhow::Result<Option<(User, String)>> {
        let found = UserEntity::find()
            .filter(Column::RegistrationNumber.eq(number))
            .one(&self.conn)
            .await
            .context("find_credentials_by_registration_number failed")?;
        Ok(found.map(|m| {
            let hash = m.password_hash.clone();
            (entity_to_contract(m), hash)
        }))
    }

    async fn find_admin_credentials_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<(User, String)>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .filter(Column::Role.eq(Role::Admin.as_str()))
            .one(&self.conn)
            .await
            .context("find_admin_credentials_by_email failed")?;
        Ok(found.map(|m| {
            let hash = m.password_hash.clone();
            (entity_to_contract(m), hash)
        }))
    }

    async fn registration_number_exists(&self, number: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::RegistrationNumber.eq(number))
            .count(&self.conn)
            .await
            .context("registration_number_exists failed")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, user: User, password_hash: String) -> anyhow::Result<()> {
        let m = UserAM {
            id: Set(user.id),
            registration_number: Set(user.registration_number),
            email: Set(user.email),
            name: Set(user.name),
            password_hash: Set(password_hash),
            role: Set(user.role.as_str().to_string()),
            is_verified: Set(user.is_verified),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> anyhow::Result<bool> {
        let res = UserEntity::update_many()
            .col_expr(Column::IsVerified, Expr::value(verified))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("set_verified failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .filter(Column::Role.eq(role.as_str()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_by_role failed")?;
        Ok(rows.into_iter().map(entity_to_contract).collect())
    }
}
