use crate::contract::model::{Category, Event, FeedbackEntry};
use crate::infra::storage::entity::{event, feedback};

/// Convert a database entity to a contract model
pub fn event_to_contract(entity: event::Model) -> Event {
    Event {
        id: entity.id,
        title: entity.title,
        description: entity.description,
        starts_at: entity.starts_at,
        venue: entity.venue,
        category: Category::parse(&entity.category).unwrap_or_default(),
        max_participants: entity.max_participants,
        is_active: entity.is_active,
        image: entity.image,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

pub fn feedback_to_contract(entity: feedback::Model) -> FeedbackEntry {
    FeedbackEntry {
        id: entity.id,
        user_id: entity.user_id,
        rating: entity.rating,
        comment: entity.comment,
        created_at: entity.created_at,
    }
}
