use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use tracing::{debug, info, instrument, warn};
use users::contract::{client::UsersApi, model::User};
use uuid::Uuid;

use crate::config::EventsConfig;
use crate::contract::model::{
    Event, EventPatch, EventSummary, FeedbackEntry, FeedbackSummary, MonthGroup, NewEvent,
};
use crate::domain::error::DomainError;
use crate::domain::ports::Notifier;
use crate::domain::repo::{EventsRepository, RegisterOutcome};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Domain service for events: admin CRUD, the registration manager,
/// the feedback recorder and the month directory.
/// Depends only on the repository port, the users client and the
/// notification port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn EventsRepository>,
    users: Arc<dyn UsersApi>,
    notifier: Arc<dyn Notifier>,
    config: EventsConfig,
}

impl Service {
    pub fn new(
        repo: Arc<dyn EventsRepository>,
        users: Arc<dyn UsersApi>,
        notifier: Arc<dyn Notifier>,
        config: EventsConfig,
    ) -> Self {
        Self {
            repo,
            users,
            notifier,
            config,
        }
    }

    // --- admin CRUD ---

    #[instrument(name = "events.service.create_event", skip(self, new_event), fields(title = %new_event.title))]
    pub async fn create_event(&self, new_event: NewEvent) -> Result<Event, DomainError> {
        info!("Creating new event");

        let max_participants = new_event
            .max_participants
            .unwrap_or(self.config.default_capacity);
        validate_event_fields(
            &new_event.title,
            &new_event.description,
            &new_event.venue,
            max_participants,
        )?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: new_event.title,
            description: new_event.description,
            starts_at: new_event.starts_at,
            venue: new_event.venue,
            category: new_event.category,
            max_participants,
            is_active: true,
            image: new_event.image.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(event.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created event with id={}", event.id);
        Ok(event)
    }

    #[instrument(name = "events.service.update_event", skip(self, patch), fields(event_id = %id))]
    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<Event, DomainError> {
        let mut current = self.require_event(id).await?;

        if let Some(title) = patch.title {
            current.title = title;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(starts_at) = patch.starts_at {
            current.starts_at = starts_at;
        }
        if let Some(venue) = patch.venue {
            current.venue = venue;
        }
        if let Some(category) = patch.category {
            current.category = category;
        }
        if let Some(max_participants) = patch.max_participants {
            current.max_participants = max_participants;
        }
        if let Some(is_active) = patch.is_active {
            current.is_active = is_active;
        }
        if let Some(image) = patch.image {
            current.image = image;
        }

        validate_event_fields(
            &current.title,
            &current.description,
            &current.venue,
            current.max_participants,
        )?;
        current.updated_at = Utc::now();

        self.repo
            .update(current.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully updated event");
        Ok(current)
    }

    #[instrument(name = "events.service.delete_event", skip(self), fields(event_id = %id))]
    pub async fn delete_event(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::event_not_found(id));
        }

        info!("Successfully deleted event");
        Ok(())
    }

    pub async fn get_event(&self, id: Uuid) -> Result<EventSummary, DomainError> {
        let event = self.require_event(id).await?;
        self.summarize(event).await
    }

    pub async fn list_active(&self) -> Result<Vec<Event>, DomainError> {
        self.repo
            .list_active()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    // --- registration manager ---

    /// Register a user for an event.
    ///
    /// Preconditions are checked in order (exists, active, not already
    /// registered); the capacity check itself happens inside the atomic
    /// conditional insert, so concurrent attempts for the last seat cannot
    /// oversubscribe the event.
    #[instrument(name = "events.service.register", skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn register(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<EventSummary, DomainError> {
        let event = self.require_event(event_id).await?;

        if !event.is_active {
            return Err(DomainError::inactive_event());
        }
        if self
            .repo
            .is_registered(event_id, user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::already_registered());
        }

        match self
            .repo
            .try_register(event_id, user_id, event.max_participants)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            RegisterOutcome::Registered => {}
            RegisterOutcome::Full => return Err(DomainError::event_full()),
            RegisterOutcome::Duplicate => return Err(DomainError::already_registered()),
        }

        info!("User registered for event");
        self.spawn_confirmation_email(user_id, event.clone());

        self.summarize(event).await
    }

    #[instrument(name = "events.service.unregister", skip(self), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn unregister(&self, user_id: Uuid, event_id: Uuid) -> Result<(), DomainError> {
        let _ = self.require_event(event_id).await?;

        let removed = self
            .repo
            .unregister(event_id, user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !removed {
            return Err(DomainError::not_registered());
        }

        info!("User unregistered from event");
        Ok(())
    }

    /// Events the user is registered for, ascending by start time.
    pub async fn my_events(&self, user_id: Uuid) -> Result<Vec<Event>, DomainError> {
        self.repo
            .events_for_user(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    /// Admin view: the registered users of an event.
    pub async fn participants(
        &self,
        event_id: Uuid,
    ) -> Result<(EventSummary, Vec<User>), DomainError> {
        let event = self.require_event(event_id).await?;
        let ids = self
            .repo
            .registered_user_ids(event_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let users = self
            .users
            .find_by_ids(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        let summary = EventSummary {
            registration_count: ids.len() as u64,
            event,
        };
        Ok((summary, users))
    }

    // --- feedback recorder ---

    #[instrument(name = "events.service.submit_feedback", skip(self, comment), fields(user_id = %user_id, event_id = %event_id))]
    pub async fn submit_feedback(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<(), DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::invalid_rating(rating));
        }

        let event = self.require_event(event_id).await?;
        if event.starts_at > Utc::now() {
            return Err(DomainError::event_not_ended());
        }
        if !self
            .repo
            .is_registered(event_id, user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::not_a_participant());
        }
        if self
            .repo
            .has_feedback(event_id, user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::duplicate_feedback());
        }

        let entry = FeedbackEntry {
            id: Uuid::new_v4(),
            user_id,
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
            created_at: Utc::now(),
        };

        let inserted = self
            .repo
            .insert_feedback(event_id, entry)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !inserted {
            return Err(DomainError::duplicate_feedback());
        }

        info!("Feedback recorded");
        Ok(())
    }

    /// Derived feedback aggregate; the average is recomputed from the
    /// entries on every read and rounded to one decimal place.
    pub async fn feedback_summary(&self, event_id: Uuid) -> Result<FeedbackSummary, DomainError> {
        let _ = self.require_event(event_id).await?;

        let entries = self
            .repo
            .feedback_for_event(event_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let average = if entries.is_empty() {
            None
        } else {
            let sum: i32 = entries.iter().map(|e| e.rating).sum();
            let raw = f64::from(sum) / entries.len() as f64;
            Some((raw * 10.0).round() / 10.0)
        };

        Ok(FeedbackSummary {
            count: entries.len(),
            average,
            entries,
        })
    }

    // --- event directory ---

    /// Calendar view of a year: all 12 months are present, each with its
    /// active events in ascending start order (possibly none).
    pub async fn grouped_by_year(&self, year: i32) -> Result<Vec<MonthGroup>, DomainError> {
        let start = year_start(year)?;
        let end = year_start(year + 1)?;

        let events = self
            .repo
            .list_active_between(start, end)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let mut groups: Vec<MonthGroup> = MONTH_NAMES
            .iter()
            .map(|name| MonthGroup {
                name: (*name).to_string(),
                events: Vec::new(),
            })
            .collect();
        for event in events {
            let month0 = event.starts_at.month0() as usize;
            groups[month0].events.push(event);
        }

        debug!("Grouped events for year {}", year);
        Ok(groups)
    }

    /// Active events within one calendar month, ascending. `month` is 1-12.
    pub async fn list_month(&self, year: i32, month: u32) -> Result<Vec<Event>, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation("month", "must be between 1 and 12"));
        }
        let start = month_start(year, month)?;
        let end = if month == 12 {
            month_start(year + 1, 1)?
        } else {
            month_start(year, month + 1)?
        };

        self.repo
            .list_active_between(start, end)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    // --- helpers ---

    async fn require_event(&self, id: Uuid) -> Result<Event, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    async fn summarize(&self, event: Event) -> Result<EventSummary, DomainError> {
        let registration_count = self
            .repo
            .registration_count(event.id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(EventSummary {
            event,
            registration_count,
        })
    }

    /// Fire-and-forget confirmation email; failures are logged, never
    /// propagated to the registration result.
    fn spawn_confirmation_email(&self, user_id: Uuid, event: Event) {
        let users = self.users.clone();
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let user = match users.get_user(user_id).await {
                Ok(user) => user,
                Err(e) => {
                    warn!("Skipping confirmation email, user lookup failed: {e:#}");
                    return;
                }
            };

            let subject = format!("Event Registration Confirmed - {}", event.title);
            let body = format!(
                "Hello, {}!\n\n\
                 You have successfully registered for the following event:\n\n\
                 {}\n\
                 Date: {}\n\
                 Venue: {}\n\
                 Category: {}\n\n\
                 Please arrive at the venue on time. We look forward to seeing you!",
                user.name,
                event.title,
                event.starts_at.format("%A, %B %-d, %Y at %H:%M UTC"),
                event.venue,
                event.category.as_str(),
            );

            if let Err(e) = notifier.send(&user.email, &subject, &body).await {
                warn!("Failed to send registration confirmation: {e:#}");
            }
        });
    }
}

fn validate_event_fields(
    title: &str,
    description: &str,
    venue: &str,
    max_participants: i32,
) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title", "cannot be empty"));
    }
    if description.trim().is_empty() {
        return Err(DomainError::validation("description", "cannot be empty"));
    }
    if venue.trim().is_empty() {
        return Err(DomainError::validation("venue", "cannot be empty"));
    }
    if max_participants < 1 {
        return Err(DomainError::validation(
            "max_participants",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn year_start(year: i32) -> Result<DateTime<Utc>, DomainError> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| DomainError::validation("year", "out of range"))
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, DomainError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| DomainError::validation("month", "out of range"))
}
