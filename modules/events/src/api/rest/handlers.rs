use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, response::Json, Extension};
use tracing::info;
use users::api::rest::auth::{CurrentUser, RequireAdmin};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateEventReq, EventDto, EventListDto, EventSummaryDto, FeedbackReq, FeedbackSummaryDto,
    GroupedYearDto, MessageResponse, MonthGroupDto, ParticipantDto, RegisterResponse,
    RegistrationsDto, UpdateEventReq,
};
use crate::api::rest::error::ApiError;
use crate::contract::model::{Category, NewEvent};
use crate::domain::service::Service;

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => Category::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown category '{s}'"))),
    }
}

/// List all active events
pub async fn list_events(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<EventListDto>, ApiError> {
    let events = svc.list_active().await?;
    let events: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
    Ok(Json(EventListDto {
        total: events.len(),
        events,
    }))
}

/// Active events of a year grouped by month; all 12 months are present
pub async fn grouped_by_year(
    Extension(svc): Extension<Arc<Service>>,
    Path(year): Path<i32>,
) -> Result<Json<GroupedYearDto>, ApiError> {
    let groups = svc.grouped_by_year(year).await?;
    let grouped: GroupedYearDto = groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| (index as u32, MonthGroupDto::from(group)))
        .collect();
    Ok(Json(grouped))
}

/// Active events within one calendar month
pub async fn list_month(
    Extension(svc): Extension<Arc<Service>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<EventListDto>, ApiError> {
    let events = svc.list_month(year, month).await?;
    let events: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
    Ok(Json(EventListDto {
        total: events.len(),
        events,
    }))
}

/// Events the authenticated caller is registered for
pub async fn my_events(
    Extension(svc): Extension<Arc<Service>>,
    current: CurrentUser,
) -> Result<Json<EventListDto>, ApiError> {
    let events = svc.my_events(current.id).await?;
    let events: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
    Ok(Json(EventListDto {
        total: events.len(),
        events,
    }))
}

/// Get a specific event with its registration count
pub async fn get_event(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventSummaryDto>, ApiError> {
    let summary = svc.get_event(id).await?;
    Ok(Json(EventSummaryDto::from(summary)))
}

/// Create a new event (admin)
pub async fn create_event(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Json(req): Json<CreateEventReq>,
) -> Result<(StatusCode, Json<EventDto>), ApiError> {
    info!("Creating event '{}'", req.title);

    let category = parse_category(req.category.as_deref())?.unwrap_or_default();
    let new_event = NewEvent {
        title: req.title,
        description: req.description,
        starts_at: req.starts_at,
        venue: req.venue,
        category,
        max_participants: req.max_participants,
        image: req.image,
    };

    let event = svc.create_event(new_event).await?;
    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

/// Update an event with partial data (admin)
pub async fn update_event(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventReq>,
) -> Result<Json<EventDto>, ApiError> {
    // Reject unknown categories before the lossy Option conversion.
    let _ = parse_category(req.category.as_deref())?;

    let event = svc.update_event(id, req.into()).await?;
    Ok(Json(EventDto::from(event)))
}

/// Delete an event (admin); registrations and feedback cascade
pub async fn delete_event(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting event {}", id);

    svc.delete_event(id).await?;
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// Register the authenticated caller for an event
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let summary = svc.register(current.id, id).await?;
    Ok(Json(RegisterResponse {
        message: "Successfully registered for event".to_string(),
        event: EventSummaryDto::from(summary),
    }))
}

/// Remove the authenticated caller's registration
pub async fn unregister(
    Extension(svc): Extension<Arc<Service>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    svc.unregister(current.id, id).await?;
    Ok(Json(MessageResponse {
        message: "Successfully unregistered from event".to_string(),
    }))
}

/// Submit post-event feedback
pub async fn submit_feedback(
    Extension(svc): Extension<Arc<Service>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackReq>,
) -> Result<Json<MessageResponse>, ApiError> {
    svc.submit_feedback(current.id, id, req.rating, req.comment)
        .await?;
    Ok(Json(MessageResponse {
        message: "Feedback submitted successfully".to_string(),
    }))
}

/// Feedback entries and derived average rating for an event
pub async fn feedback_summary(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackSummaryDto>, ApiError> {
    let summary = svc.feedback_summary(id).await?;
    Ok(Json(FeedbackSummaryDto::from(summary)))
}

/// Registered users of an event (admin)
pub async fn list_registrations(
    Extension(svc): Extension<Arc<Service>>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<RegistrationsDto>, ApiError> {
    let (summary, users) = svc.participants(id).await?;
    let registrations: Vec<ParticipantDto> =
        users.into_iter().map(ParticipantDto::from).collect();
    Ok(Json(RegistrationsDto {
        total_registrations: summary.registration_count,
        event: EventSummaryDto::from(summary),
        registrations,
    }))
}
