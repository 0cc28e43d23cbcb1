use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{Event, FeedbackEntry};

/// Result of an atomic registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The seat was taken by this call.
    Registered,
    /// The capacity guard rejected the insert.
    Full,
    /// The uniqueness constraint rejected a concurrent duplicate.
    Duplicate,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait EventsRepository: Send + Sync {
    /// Load an event by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Event>>;
    /// Insert a fully-formed domain event.
    ///
    /// Service computes id/timestamps/validation; repo persists.
    async fn insert(&self, event: Event) -> anyhow::Result<()>;
    /// Update an existing event (by primary key in `event.id`).
    async fn update(&self, event: Event) -> anyhow::Result<()>;
    /// Delete by id. Returns true if a row was deleted.
    /// Registrations and feedback cascade at the storage layer.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Active events, ascending by start time.
    async fn list_active(&self) -> anyhow::Result<Vec<Event>>;
    /// Active events with `starts_at` in `[start, end)`, ascending.
    async fn list_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>>;

    /// Current number of registrations for an event.
    async fn registration_count(&self, event_id: Uuid) -> anyhow::Result<u64>;
    /// Membership test on the registrations relation.
    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Capacity check and insert as one atomic conditional statement.
    async fn try_register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        max_participants: i32,
    ) -> anyhow::Result<RegisterOutcome>;
    /// Remove a registration. Returns false when none existed.
    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Users registered for an event, in registration order.
    async fn registered_user_ids(&self, event_id: Uuid) -> anyhow::Result<Vec<Uuid>>;
    /// Events a user is registered for, ascending by start time.
    async fn events_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Event>>;

    /// True when the user already left feedback for the event.
    async fn has_feedback(&self, event_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Append one feedback entry. Returns false when the uniqueness
    /// constraint rejected a concurrent duplicate.
    async fn insert_feedback(&self, event_id: Uuid, entry: FeedbackEntry) -> anyhow::Result<bool>;
    /// All feedback entries for an event, oldest first.
    async fn feedback_for_event(&self, event_id: Uuid) -> anyhow::Result<Vec<FeedbackEntry>>;
}
