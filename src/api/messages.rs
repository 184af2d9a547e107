use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, InboxDto, MessageDto};
use crate::api::validation::{validate_body, validate_id};
use crate::constants::limits::MAX_MESSAGE_LEN;
use crate::domain::events::NotificationEvent;
use crate::entities::messages;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: i64,
    pub body: String,
}

fn to_dto(model: messages::Model) -> MessageDto {
    MessageDto {
        id: model.id,
        sender_id: model.sender_id,
        recipient_id: model.recipient_id,
        body: model.body,
        is_read: model.is_read,
        created_at: model.created_at,
    }
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let sender_id = user.require_profile()?;
    validate_id(request.recipient_id, "profile")?;
    let body = validate_body(&request.body, MAX_MESSAGE_LEN, "Message")?;

    if sender_id == request.recipient_id {
        return Err(ApiError::validation("You cannot message yourself"));
    }

    let recipient = state
        .store()
        .get_profile(request.recipient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile", request.recipient_id))?;

    if recipient.banned {
        return Err(ApiError::validation("This account cannot receive messages"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let message = state
        .store()
        .send_message(sender_id, request.recipient_id, body, &now)
        .await?;

    let _ = state.event_bus().send(NotificationEvent::MessageSent {
        message_id: message.id,
        sender_id,
        recipient_id: request.recipient_id,
    });

    Ok(Json(ApiResponse::success(to_dto(message))))
}

pub async fn inbox(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<InboxDto>>, ApiError> {
    let profile_id = user.require_profile()?;

    let messages = state.store().messages_for_profile(profile_id).await?;
    let unread = state.store().unread_message_count(profile_id).await?;

    Ok(Json(ApiResponse::success(InboxDto {
        messages: messages.into_iter().map(to_dto).collect(),
        unread,
    })))
}

pub async fn conversation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(other_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    validate_id(other_id, "profile")?;
    let profile_id = user.require_profile()?;

    let messages = state.store().conversation(profile_id, other_id).await?;

    Ok(Json(ApiResponse::success(
        messages.into_iter().map(to_dto).collect(),
    )))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_id(id, "message")?;
    let profile_id = user.require_profile()?;

    if !state.store().mark_message_read(id, profile_id).await? {
        return Err(ApiError::not_found("Message", id));
    }

    Ok(Json(ApiResponse::success(())))
}
