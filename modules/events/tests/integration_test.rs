use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use events::{
    config::EventsConfig,
    contract::model::{Category, EventPatch, NewEvent},
    domain::error::DomainError,
    domain::ports::Notifier,
    domain::service::Service as EventsService,
    infra::email::LogNotifier,
    infra::storage::sea_orm_repo::SeaOrmEventsRepository,
};
use users::{
    config::UsersConfig,
    contract::client::UsersApi,
    contract::model::{NewUser, User},
    domain::service::Service as UsersService,
    gateways::local::UsersLocalClient,
    infra::storage::sea_orm_repo::SeaOrmUsersRepository,
};

/// Create a fresh test database for each test.
/// A single pooled connection keeps the in-memory database alive and shared.
async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");

    users::infra::storage::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run users migrations");
    events::infra::storage::migrations::Migrator::up(&db, None)
        .await
        .expect("Failed to run events migrations");

    db
}

struct TestStack {
    db: DatabaseConnection,
    users: Arc<UsersService>,
    events: Arc<EventsService>,
}

fn events_service_with_notifier(
    db: &DatabaseConnection,
    users: Arc<UsersService>,
    notifier: Arc<dyn Notifier>,
) -> Arc<EventsService> {
    let repo = Arc::new(SeaOrmEventsRepository::new(db.clone()));
    let client: Arc<dyn UsersApi> = Arc::new(UsersLocalClient::new(users));
    Arc::new(EventsService::new(
        repo,
        client,
        notifier,
        EventsConfig::default(),
    ))
}

async fn create_stack() -> TestStack {
    let db = create_test_db().await;
    let users_repo = Arc::new(SeaOrmUsersRepository::new(db.clone()));
    let users = Arc::new(UsersService::new(users_repo, UsersConfig::default()));
    let events = events_service_with_notifier(&db, users.clone(), Arc::new(LogNotifier));
    TestStack { db, users, events }
}

async fn create_student(stack: &TestStack, number: &str) -> User {
    stack
        .users
        .register_user(NewUser {
            registration_number: number.to_string(),
            email: format!("student{number}@campus.test"),
            name: format!("Student {number}"),
            password: "password123".to_string(),
        })
        .await
        .expect("Failed to register student")
}

fn upcoming_event(title: &str, max_participants: i32) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: "An event for testing".to_string(),
        starts_at: Utc::now() + Duration::days(7),
        venue: "Main Auditorium".to_string(),
        category: Category::Technical,
        max_participants: Some(max_participants),
        image: None,
    }
}

fn past_event(title: &str, max_participants: i32) -> NewEvent {
    NewEvent {
        starts_at: Utc::now() - Duration::days(1),
        ..upcoming_event(title, max_participants)
    }
}

// --- registration manager ---

#[tokio::test]
async fn test_register_happy_path_and_duplicate() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    let summary = stack.events.register(user.id, event.id).await?;
    assert_eq!(summary.registration_count, 1);

    let result = stack.events.register(user.id, event.id).await;
    assert!(matches!(result, Err(DomainError::AlreadyRegistered)));

    Ok(())
}

#[tokio::test]
async fn test_register_unknown_event() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;

    let result = stack.events.register(user.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(DomainError::EventNotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_register_inactive_event() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    stack
        .events
        .update_event(
            event.id,
            EventPatch {
                is_active: Some(false),
                ..EventPatch::default()
            },
        )
        .await?;

    let result = stack.events.register(user.id, event.id).await;
    assert!(matches!(result, Err(DomainError::InactiveEvent)));

    Ok(())
}

/// Capacity 1: A registers, B is rejected, A unregisters, B succeeds.
#[tokio::test]
async fn test_last_seat_scenario() -> Result<()> {
    let stack = create_stack().await;
    let alice = create_student(&stack, "100001").await;
    let bob = create_student(&stack, "100002").await;
    let event = stack
        .events
        .create_event(upcoming_event("Tiny Workshop", 1))
        .await?;

    stack.events.register(alice.id, event.id).await?;

    let result = stack.events.register(bob.id, event.id).await;
    assert!(matches!(result, Err(DomainError::EventFull)));

    stack.events.unregister(alice.id, event.id).await?;

    let summary = stack.events.register(bob.id, event.id).await?;
    assert_eq!(summary.registration_count, 1);

    Ok(())
}

/// N concurrent attempts for the last seat: exactly one succeeds.
#[tokio::test]
async fn test_concurrent_registrations_respect_capacity() -> Result<()> {
    let stack = create_stack().await;
    let event = stack
        .events
        .create_event(upcoming_event("One Seat Only", 1))
        .await?;

    let mut users = Vec::new();
    for i in 0..4 {
        users.push(create_student(&stack, &format!("10000{i}")).await);
    }

    let (r0, r1, r2, r3) = tokio::join!(
        stack.events.register(users[0].id, event.id),
        stack.events.register(users[1].id, event.id),
        stack.events.register(users[2].id, event.id),
        stack.events.register(users[3].id, event.id),
    );

    let results = [r0, r1, r2, r3];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one registration must win");
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(DomainError::EventFull))));

    let summary = stack.events.get_event(event.id).await?;
    assert_eq!(summary.registration_count, 1);

    Ok(())
}

/// Register then unregister restores the prior relationship state.
#[tokio::test]
async fn test_register_unregister_roundtrip() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    assert!(stack.events.my_events(user.id).await?.is_empty());

    stack.events.register(user.id, event.id).await?;
    assert_eq!(stack.events.my_events(user.id).await?.len(), 1);

    stack.events.unregister(user.id, event.id).await?;
    assert!(stack.events.my_events(user.id).await?.is_empty());
    assert_eq!(stack.events.get_event(event.id).await?.registration_count, 0);

    Ok(())
}

#[tokio::test]
async fn test_unregister_when_not_registered() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    let result = stack.events.unregister(user.id, event.id).await;
    assert!(matches!(result, Err(DomainError::NotRegistered)));

    Ok(())
}

/// A full event stays active and keeps rejecting registrations.
#[tokio::test]
async fn test_full_event_remains_active() -> Result<()> {
    let stack = create_stack().await;
    let a = create_student(&stack, "100001").await;
    let b = create_student(&stack, "100002").await;
    let c = create_student(&stack, "100003").await;
    let event = stack.events.create_event(upcoming_event("Duo", 2)).await?;

    stack.events.register(a.id, event.id).await?;
    stack.events.register(b.id, event.id).await?;

    let summary = stack.events.get_event(event.id).await?;
    assert!(summary.event.is_active);
    assert_eq!(summary.registration_count, 2);

    let result = stack.events.register(c.id, event.id).await;
    assert!(matches!(result, Err(DomainError::EventFull)));

    Ok(())
}

#[tokio::test]
async fn test_participants_listing() -> Result<()> {
    let stack = create_stack().await;
    let a = create_student(&stack, "100001").await;
    let b = create_student(&stack, "100002").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    stack.events.register(a.id, event.id).await?;
    stack.events.register(b.id, event.id).await?;

    let (summary, participants) = stack.events.participants(event.id).await?;
    assert_eq!(summary.registration_count, 2);
    assert_eq!(participants.len(), 2);
    assert!(participants.iter().any(|u| u.id == a.id));
    assert!(participants.iter().any(|u| u.id == b.id));

    Ok(())
}

// --- cascades ---

#[tokio::test]
async fn test_delete_event_cascades_registrations() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Doomed", 5)).await?;

    stack.events.register(user.id, event.id).await?;
    stack.events.delete_event(event.id).await?;

    assert!(stack.events.my_events(user.id).await?.is_empty());
    assert!(matches!(
        stack.events.get_event(event.id).await,
        Err(DomainError::EventNotFound { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_delete_user_cascades_registrations() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack.events.create_event(upcoming_event("Expo", 5)).await?;

    stack.events.register(user.id, event.id).await?;
    stack.users.delete_user(user.id).await?;

    let summary = stack.events.get_event(event.id).await?;
    assert_eq!(summary.registration_count, 0);

    Ok(())
}

// --- feedback recorder ---

#[tokio::test]
async fn test_feedback_rejected_before_event_ends() -> Result<()> {
    let stack = create_stack().await;
    let user = create_student(&stack, "100001").await;
    let event = stack
        .events
        .create_event(upcoming_event("Future Event", 5))
        .await?;
    stack.events.register(user.id, event.id).await?;

    let result = stack
        .events
        .submit_feedback(user.id, event.id, 5, None)
        .await;
    assert!(matches!(result, Err(DomainError::EventNotEnded)));

    Ok(())
}

#[tokio::test]
async fn test_feedback_flow_after_event() -> Result<()> {
    let stack = create_stack().await;
    let participant = create_student(&stack, "100001").await;
    let stranger = create_student(&stack, "100002").await;
    let event = stack.events.create_event(past_event("Past Event", 5)).await?;
    stack.events.register(participant.id, event.id).await?;

    // Only registered participants can give feedback
    let result = stack
        .events
        .submit_feedback(stranger.id, event.id, 4, None)
        .await;
    assert!(matches!(result, Err(DomainError::NotAParticipant)));

    // Out-of-range ratings are rejected before anything is written
    let result = stack
        .events
        .submit_feedback(participant.id, event.id, 6, None)
        .await;
    assert!(matches!(result, Err(DomainError::InvalidRating { value: 6 })));
    let result = stack
        .events
        .submit_feedback(participant.id, event.id, 0, None)
        .await;
    assert!(matches!(result, Err(DomainError::InvalidRating { value: 0 })));

    // Rating 3 with an empty comment is accepted
    stack
        .events
        .submit_feedback(participant.id, event.id, 3, Some(String::new()))
        .await?;

    // Second submission by the same user is rejected
    let result = stack
        .events
        .submit_feedback(participant.id, event.id, 5, Some("again".to_string()))
        .await;
    assert!(matches!(result, Err(DomainError::DuplicateFeedback)));

    let summary = stack.events.feedback_summary(event.id).await?;
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, Some(3.0));
    assert_eq!(summary.entries[0].comment, None); // blank comment dropped

    Ok(())
}

#[tokio::test]
async fn test_feedback_average_rounded_to_one_decimal() -> Result<()> {
    let stack = create_stack().await;
    let event = stack.events.create_event(past_event("Rated Event", 10)).await?;

    for (i, rating) in [3, 4, 4].into_iter().enumerate() {
        let user = create_student(&stack, &format!("10000{i}")).await;
        stack.events.register(user.id, event.id).await?;
        stack
            .events
            .submit_feedback(user.id, event.id, rating, Some(format!("comment {i}")))
            .await?;
    }

    let summary = stack.events.feedback_summary(event.id).await?;
    assert_eq!(summary.count, 3);
    // 11 / 3 = 3.666... -> 3.7
    assert_eq!(summary.average, Some(3.7));

    Ok(())
}

#[tokio::test]
async fn test_feedback_summary_empty() -> Result<()> {
    let stack = create_stack().await;
    let event = stack.events.create_event(past_event("Quiet Event", 5)).await?;

    let summary = stack.events.feedback_summary(event.id).await?;
    assert_eq!(summary.count, 0);
    assert_eq!(summary.average, None);
    assert!(summary.entries.is_empty());

    Ok(())
}

// --- event directory ---

#[tokio::test]
async fn test_grouped_by_year_on_empty_set() -> Result<()> {
    let stack = create_stack().await;

    let groups = stack.events.grouped_by_year(2025).await?;
    assert_eq!(groups.len(), 12);
    assert_eq!(groups[0].name, "January");
    assert_eq!(groups[11].name, "December");
    assert!(groups.iter().all(|g| g.events.is_empty()));

    Ok(())
}

#[tokio::test]
async fn test_grouped_by_year_sorts_and_filters() -> Result<()> {
    let stack = create_stack().await;

    let feb_late = NewEvent {
        starts_at: Utc.with_ymd_and_hms(2025, 2, 20, 10, 0, 0).unwrap(),
        ..upcoming_event("Feb Late", 10)
    };
    let feb_early = NewEvent {
        starts_at: Utc.with_ymd_and_hms(2025, 2, 5, 10, 0, 0).unwrap(),
        ..upcoming_event("Feb Early", 10)
    };
    let other_year = NewEvent {
        starts_at: Utc.with_ymd_and_hms(2026, 2, 5, 10, 0, 0).unwrap(),
        ..upcoming_event("Next Year", 10)
    };
    stack.events.create_event(feb_late).await?;
    stack.events.create_event(feb_early).await?;
    stack.events.create_event(other_year).await?;

    let hidden = stack
        .events
        .create_event(NewEvent {
            starts_at: Utc.with_ymd_and_hms(2025, 2, 10, 10, 0, 0).unwrap(),
            ..upcoming_event("Hidden", 10)
        })
        .await?;
    stack
        .events
        .update_event(
            hidden.id,
            EventPatch {
                is_active: Some(false),
                ..EventPatch::default()
            },
        )
        .await?;

    let groups = stack.events.grouped_by_year(2025).await?;
    assert_eq!(groups.len(), 12);

    let february = &groups[1];
    assert_eq!(february.name, "February");
    assert_eq!(february.events.len(), 2);
    assert_eq!(february.events[0].title, "Feb Early");
    assert_eq!(february.events[1].title, "Feb Late");

    // every other month is empty
    let other_events: usize = groups
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 1)
        .map(|(_, g)| g.events.len())
        .sum();
    assert_eq!(other_events, 0);

    Ok(())
}

#[tokio::test]
async fn test_list_month_boundaries() -> Result<()> {
    let stack = create_stack().await;

    let last_instant = NewEvent {
        starts_at: Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap(),
        ..upcoming_event("January Closer", 10)
    };
    let first_instant = NewEvent {
        starts_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        ..upcoming_event("February Opener", 10)
    };
    stack.events.create_event(last_instant).await?;
    stack.events.create_event(first_instant).await?;

    let january = stack.events.list_month(2025, 1).await?;
    assert_eq!(january.len(), 1);
    assert_eq!(january[0].title, "January Closer");

    let february = stack.events.list_month(2025, 2).await?;
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].title, "February Opener");

    let result = stack.events.list_month(2025, 13).await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    Ok(())
}

// --- event CRUD ---

#[tokio::test]
async fn test_create_event_defaults_and_validation() -> Result<()> {
    let stack = create_stack().await;

    let event = stack
        .events
        .create_event(NewEvent {
            max_participants: None,
            ..upcoming_event("Defaults", 1)
        })
        .await?;
    assert_eq!(event.max_participants, 100); // config default
    assert!(event.is_active);
    assert_eq!(event.image, "");

    let result = stack
        .events
        .create_event(NewEvent {
            title: "  ".to_string(),
            ..upcoming_event("Bad", 5)
        })
        .await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    let result = stack
        .events
        .create_event(upcoming_event("Zero Capacity", 0))
        .await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_event_partial() -> Result<()> {
    let stack = create_stack().await;
    let event = stack.events.create_event(upcoming_event("Original", 5)).await?;

    let updated = stack
        .events
        .update_event(
            event.id,
            EventPatch {
                venue: Some("New Hall".to_string()),
                ..EventPatch::default()
            },
        )
        .await?;
    assert_eq!(updated.venue, "New Hall");
    assert_eq!(updated.title, "Original"); // unchanged

    let result = stack
        .events
        .update_event(Uuid::new_v4(), EventPatch::default())
        .await;
    assert!(matches!(result, Err(DomainError::EventNotFound { .. })));

    Ok(())
}

// --- notification side effect ---

struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    count: AtomicUsize,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("smtp unreachable"))
    }
}

#[tokio::test]
async fn test_registration_sends_confirmation_email() -> Result<()> {
    let stack = create_stack().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let events = events_service_with_notifier(&stack.db, stack.users.clone(), notifier.clone());

    let user = create_student(&stack, "100001").await;
    let event = events.create_event(upcoming_event("Notified", 5)).await?;
    events.register(user.id, event.id).await?;

    // Delivery is fire-and-forget on a spawned task; wait briefly for it.
    let mut delivered = false;
    for _ in 0..100 {
        if notifier.count.load(Ordering::SeqCst) > 0 {
            delivered = true;
            break;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    assert!(delivered, "confirmation email was not dispatched");

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent[0].0, user.email);
    assert!(sent[0].1.contains("Notified"));

    Ok(())
}

/// Notification failure must not roll back or fail the registration.
#[tokio::test]
async fn test_registration_survives_notification_failure() -> Result<()> {
    let stack = create_stack().await;
    let events = events_service_with_notifier(&stack.db, stack.users.clone(), Arc::new(FailingNotifier));

    let user = create_student(&stack, "100001").await;
    let event = events.create_event(upcoming_event("Unreachable", 5)).await?;

    let summary = events.register(user.id, event.id).await?;
    assert_eq!(summary.registration_count, 1);

    Ok(())
}
