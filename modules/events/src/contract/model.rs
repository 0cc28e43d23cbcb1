use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    Technical,
    Cultural,
    Sports,
    Academic,
    Workshop,
    Seminar,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Cultural => "cultural",
            Category::Sports => "sports",
            Category::Academic => "academic",
            Category::Workshop => "workshop",
            Category::Seminar => "seminar",
            Category::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "technical" => Some(Category::Technical),
            "cultural" => Some(Category::Cultural),
            "sports" => Some(Category::Sports),
            "academic" => Some(Category::Academic),
            "workshop" => Some(Category::Workshop),
            "seminar" => Some(Category::Seminar),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// Pure event model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub venue: String,
    pub category: Category,
    pub max_participants: i32,
    pub is_active: bool,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub venue: String,
    pub category: Category,
    pub max_participants: Option<i32>,
    pub image: Option<String>,
}

/// Partial update data for an event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub category: Option<Category>,
    pub max_participants: Option<i32>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

/// Event together with its current registration count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub event: Event,
    pub registration_count: u64,
}

/// One immutable feedback entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived feedback aggregate for one event.
/// `average` is absent when no feedback exists and is rounded to one decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSummary {
    pub count: usize,
    pub average: Option<f64>,
    pub entries: Vec<FeedbackEntry>,
}

/// One calendar month of the event directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    pub name: String,
    pub events: Vec<Event>,
}
