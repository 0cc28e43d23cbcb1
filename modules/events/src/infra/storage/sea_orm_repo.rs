//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can be constructed with a
//! `DatabaseConnection` or a transactional connection.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, Statement,
};
use uuid::Uuid;

use crate::contract::model::{Event, FeedbackEntry};
use crate::domain::repo::{EventsRepository, RegisterOutcome};
use crate::infra::storage::entity::{event, feedback, registration};
use crate::infra::storage::mapper::{event_to_contract, feedback_to_contract};

pub struct SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> EventsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Event>> {
        let found = event::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(event_to_contract))
    }

    async fn insert(&self, e: Event) -> anyhow::Result<()> {
        let m = event::ActiveModel {
            id: Set(e.id),
            title: Set(e.title),
            description: Set(e.description),
            starts_at: Set(e.starts_at),
            venue: Set(e.venue),
            category: Set(e.category.as_str().to_string()),
            max_participants: Set(e.max_participants),
            is_active: Set(e.is_active),
            image: Set(e.image),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
        };
        let _ = m.insert(&self.conn).await.context("insert failed")?;
        Ok(())
    }

    async fn update(&self, e: Event) -> anyhow::Result<()> {
        // Minimal upsert-by-PK via ActiveModel::update
        let m = event::ActiveModel {
            id: Set(e.id),
            title: Set(e.title),
            description: Set(e.description),
            starts_at: Set(e.starts_at),
            venue: Set(e.venue),
            category: Set(e.category.as_str().to_string()),
            max_participants: Set(e.max_participants),
            is_active: Set(e.is_active),
            image: Set(e.image),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
        };
        let _ = m.update(&self.conn).await.context("update failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = event::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_active(&self) -> anyhow::Result<Vec<Event>> {
        let rows = event::Entity::find()
            .filter(event::Column::IsActive.eq(true))
            .order_by_asc(event::Column::StartsAt)
            .all(&self.conn)
            .await
            .context("list_active failed")?;
        Ok(rows.into_iter().map(event_to_contract).collect())
    }

    async fn list_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let rows = event::Entity::find()
            .filter(event::Column::IsActive.eq(true))
            .filter(event::Column::StartsAt.gte(start))
            .filter(event::Column::StartsAt.lt(end))
            .order_by_asc(event::Column::StartsAt)
            .all(&self.conn)
            .await
            .context("list_active_between failed")?;
        Ok(rows.into_iter().map(event_to_contract).collect())
    }

    async fn registration_count(&self, event_id: Uuid) -> anyhow::Result<u64> {
        registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .count(&self.conn)
            .await
            .context("registration_count failed")
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let count = registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("is_registered failed")?;
        Ok(count > 0)
    }

    async fn try_register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        max_participants: i32,
    ) -> anyhow::Result<RegisterOutcome> {
        let backend = self.conn.get_database_backend();
        let now = Utc::now();

        // Capacity check and insert in one conditional statement; the
        // subquery and the insert are evaluated atomically by the store,
        // closing the check-then-act race on the last seat.
        let sql = match backend {
            DbBackend::Postgres => {
                "INSERT INTO registrations (event_id, user_id, created_at) \
                 SELECT $1, $2, $3 \
                 WHERE (SELECT COUNT(*) FROM registrations WHERE event_id = $4) < $5"
            }
            _ => {
                "INSERT INTO registrations (event_id, user_id, created_at) \
                 SELECT ?, ?, ? \
                 WHERE (SELECT COUNT(*) FROM registrations WHERE event_id = ?) < ?"
            }
        };

        let stmt = Statement::from_sql_and_values(
            backend,
            sql,
            [
                event_id.into(),
                user_id.into(),
                now.into(),
                event_id.into(),
                max_participants.into(),
            ],
        );

        match self.conn.execute(stmt).await {
            Ok(res) if res.rows_affected() == 0 => Ok(RegisterOutcome::Full),
            Ok(_) => Ok(RegisterOutcome::Registered),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(RegisterOutcome::Duplicate),
                _ => Err(e).context("try_register failed"),
            },
        }
    }

    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = registration::Entity::delete_many()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("unregister failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn registered_user_ids(&self, event_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows = registration::Entity::find()
            .filter(registration::Column::EventId.eq(event_id))
            .order_by_asc(registration::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("registered_user_ids failed")?;
        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    async fn events_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Event>> {
        let regs = registration::Entity::find()
            .filter(registration::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("events_for_user failed")?;
        let ids: Vec<Uuid> = regs.into_iter().map(|r| r.event_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = event::Entity::find()
            .filter(event::Column::Id.is_in(ids))
            .order_by_asc(event::Column::StartsAt)
            .all(&self.conn)
            .await
            .context("events_for_user failed")?;
        Ok(rows.into_iter().map(event_to_contract).collect())
    }

    async fn has_feedback(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let count = feedback::Entity::find()
            .filter(feedback::Column::EventId.eq(event_id))
            .filter(feedback::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("has_feedback failed")?;
        Ok(count > 0)
    }

    async fn insert_feedback(&self, event_id: Uuid, entry: FeedbackEntry) -> anyhow::Result<bool> {
        let m = feedback::ActiveModel {
            id: Set(entry.id),
            event_id: Set(event_id),
            user_id: Set(entry.user_id),
            rating: Set(entry.rating),
            comment: Set(entry.comment),
            created_at: Set(entry.created_at),
        };
        match m.insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(e).context("insert_feedback failed"),
            },
        }
    }

    async fn feedback_for_event(&self, event_id: Uuid) -> anyhow::Result<Vec<FeedbackEntry>> {
        let rows = feedback::Entity::find()
            .filter(feedback::Column::EventId.eq(event_id))
            .order_by_asc(feedback::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("feedback_for_event failed")?;
        Ok(rows.into_iter().map(feedback_to_contract).collect())
    }
}
