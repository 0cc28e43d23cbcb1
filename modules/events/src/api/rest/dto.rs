use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use users::contract::model::User;
use uuid::Uuid;

use crate::contract::model::{
    Event, EventPatch, EventSummary, FeedbackEntry, FeedbackSummary, MonthGroup,
};

/// REST DTO for event representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub venue: String,
    pub category: String,
    pub max_participants: i32,
    pub is_active: bool,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event detail with its current registration count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummaryDto {
    #[serde(flatten)]
    pub event: EventDto,
    pub registration_count: u64,
}

/// REST DTO for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventReq {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub venue: String,
    pub category: Option<String>,
    pub max_participants: Option<i32>,
    pub image: Option<String>,
}

/// REST DTO for updating an event (partial)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEventReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub category: Option<String>,
    pub max_participants: Option<i32>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListDto {
    pub events: Vec<EventDto>,
    pub total: usize,
}

/// One month of the directory view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGroupDto {
    pub name: String,
    pub events: Vec<EventDto>,
}

/// Month index (0-11) → month group; every month is present.
pub type GroupedYearDto = BTreeMap<u32, MonthGroupDto>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub event: EventSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReq {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntryDto {
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummaryDto {
    pub total: usize,
    pub average_rating: Option<f64>,
    pub entries: Vec<FeedbackEntryDto>,
}

/// Registered participant as shown to administrators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub email: String,
    pub is_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationsDto {
    pub event: EventSummaryDto,
    pub registrations: Vec<ParticipantDto>,
    pub total_registrations: u64,
}

// Conversion implementations between REST DTOs and contract models

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            starts_at: event.starts_at,
            venue: event.venue,
            category: event.category.as_str().to_string(),
            max_participants: event.max_participants,
            is_active: event.is_active,
            image: event.image,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<EventSummary> for EventSummaryDto {
    fn from(summary: EventSummary) -> Self {
        Self {
            event: EventDto::from(summary.event),
            registration_count: summary.registration_count,
        }
    }
}

impl From<MonthGroup> for MonthGroupDto {
    fn from(group: MonthGroup) -> Self {
        Self {
            name: group.name,
            events: group.events.into_iter().map(EventDto::from).collect(),
        }
    }
}

impl From<FeedbackEntry> for FeedbackEntryDto {
    fn from(entry: FeedbackEntry) -> Self {
        Self {
            user_id: entry.user_id,
            rating: entry.rating,
            comment: entry.comment,
            created_at: entry.created_at,
        }
    }
}

impl From<FeedbackSummary> for FeedbackSummaryDto {
    fn from(summary: FeedbackSummary) -> Self {
        Self {
            total: summary.count,
            average_rating: summary.average,
            entries: summary
                .entries
                .into_iter()
                .map(FeedbackEntryDto::from)
                .collect(),
        }
    }
}

impl From<User> for ParticipantDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            registration_number: user.registration_number,
            email: user.email,
            is_verified: user.is_verified,
        }
    }
}

impl From<UpdateEventReq> for EventPatch {
    fn from(req: UpdateEventReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            starts_at: req.starts_at,
            venue: req.venue,
            // Category strings are validated in the handler before this runs.
            category: req.category.as_deref().and_then(crate::contract::model::Category::parse),
            max_participants: req.max_participants,
            is_active: req.is_active,
            image: req.image,
        }
    }
}
