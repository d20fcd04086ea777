use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::chat::ChatService;
use crate::app::comments::CommentService;
use crate::app::engagement::EngagementService;
use crate::domain::chat::MessageKind;
use crate::domain::comment::Comment;
use crate::domain::subject::SubjectType;
use crate::http::error::{ok, ok_empty, Envelope};
use crate::http::{AppError, AuthUser};
use crate::AppState;

const MAX_COMMENT_LEN: usize = 1000;
const MAX_MESSAGE_LEN: usize = 2000;
// Keeps (page - 1) * pageSize comfortably inside i64 for the OFFSET.
const MAX_PAGE: i64 = 1_000_000;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ListData<T> {
    pub list: Vec<T>,
    pub total: i64,
}

fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("invalid {what} id")))
}

fn parse_page(raw: Option<&str>, key: &str, default: i64) -> Result<i64, AppError> {
    match raw {
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::bad_request(format!("invalid {key}"))),
        None => Ok(default),
    }
}

fn page_window(
    page: Option<&str>,
    page_size: Option<&str>,
    default_size: i64,
) -> Result<(i64, i64), AppError> {
    let page = parse_page(page, "page", 1)?;
    let page_size = parse_page(page_size, "pageSize", default_size)?;

    if !(1..=MAX_PAGE).contains(&page) {
        return Err(AppError::bad_request(format!(
            "page must be between 1 and {MAX_PAGE}"
        )));
    }
    if !(1..=100).contains(&page_size) {
        return Err(AppError::bad_request("pageSize must be between 1 and 100"));
    }

    Ok((page, page_size))
}

fn require_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Engagement Ledger
// ---------------------------------------------------------------------------

async fn like_subject(
    subject: SubjectType,
    raw_id: &str,
    auth: AuthUser,
    state: AppState,
) -> Result<Json<Envelope<Value>>, AppError> {
    let subject_id = parse_id(raw_id, subject.as_db())?;

    let service = EngagementService::new(state.db.clone());
    service.like(subject, subject_id, auth.user_id).await?;

    Ok(ok_empty())
}

async fn unlike_subject(
    subject: SubjectType,
    raw_id: &str,
    auth: AuthUser,
    state: AppState,
) -> Result<Json<Envelope<Value>>, AppError> {
    let subject_id = parse_id(raw_id, subject.as_db())?;

    let service = EngagementService::new(state.db.clone());
    service.unlike(subject, subject_id, auth.user_id).await?;

    Ok(ok_empty())
}

pub async fn like_question(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    like_subject(SubjectType::Question, &id, auth, state).await
}

pub async fn unlike_question(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    unlike_subject(SubjectType::Question, &id, auth, state).await
}

pub async fn like_note(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    like_subject(SubjectType::Note, &id, auth, state).await
}

pub async fn unlike_note(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    unlike_subject(SubjectType::Note, &id, auth, state).await
}

pub async fn like_post(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    like_subject(SubjectType::Post, &id, auth, state).await
}

pub async fn unlike_post(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    unlike_subject(SubjectType::Post, &id, auth, state).await
}

pub async fn like_comment(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    like_subject(SubjectType::Comment, &id, auth, state).await
}

pub async fn unlike_comment(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    unlike_subject(SubjectType::Comment, &id, auth, state).await
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    #[serde(rename = "targetId")]
    pub target_id: i64,
    #[serde(rename = "targetType")]
    pub target_type: String,
    pub content: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<i64>,
}

fn validate_comment_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::bad_request("content cannot be empty"));
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::bad_request("content exceeds 1000 characters"));
    }
    Ok(())
}

pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<Json<Envelope<Comment>>, AppError> {
    let payload = require_body(payload)?;

    let target_type = SubjectType::from_db(&payload.target_type)
        .ok_or_else(|| AppError::bad_request("invalid target type"))?;
    validate_comment_content(&payload.content)?;

    let service = CommentService::new(state.db.clone());
    let comment = service
        .create(
            auth.user_id,
            target_type,
            payload.target_id,
            payload.content,
            payload.parent_id,
        )
        .await?;

    Ok(ok(comment))
}

pub async fn get_comment(
    Path(id): Path<String>,
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Comment>>, AppError> {
    let comment_id = parse_id(&id, "comment")?;

    let service = CommentService::new(state.db.clone());
    let comment = service.get(comment_id).await?;

    Ok(ok(comment))
}

#[derive(Deserialize)]
pub struct ListCommentsQuery {
    #[serde(rename = "targetId")]
    pub target_id: Option<String>,
    #[serde(rename = "targetType")]
    pub target_type: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

pub async fn list_comments(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<Envelope<ListData<Comment>>>, AppError> {
    let target_id = query
        .target_id
        .as_deref()
        .ok_or_else(|| AppError::bad_request("targetId is required"))?;
    let target_id = parse_id(target_id, "target")?;

    let target_type = query
        .target_type
        .as_deref()
        .ok_or_else(|| AppError::bad_request("targetType is required"))?;
    let target_type = SubjectType::from_db(target_type)
        .ok_or_else(|| AppError::bad_request("invalid target type"))?;

    let (page, page_size) = page_window(query.page.as_deref(), query.page_size.as_deref(), 10)?;

    let service = CommentService::new(state.db.clone());
    let (list, total) = service.list(target_type, target_id, page, page_size).await?;

    Ok(ok(ListData { list, total }))
}

#[derive(Deserialize)]
pub struct ReplyCommentRequest {
    pub content: String,
}

pub async fn reply_comment(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ReplyCommentRequest>, JsonRejection>,
) -> Result<Json<Envelope<Comment>>, AppError> {
    let parent_id = parse_id(&id, "comment")?;
    let payload = require_body(payload)?;
    validate_comment_content(&payload.content)?;

    let service = CommentService::new(state.db.clone());
    let comment = service
        .reply(auth.user_id, parent_id, payload.content)
        .await?;

    Ok(ok(comment))
}

pub async fn delete_comment(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Value>>, AppError> {
    let comment_id = parse_id(&id, "comment")?;

    let service = CommentService::new(state.db.clone());
    service.delete(comment_id, auth.user_id).await?;

    Ok(ok_empty())
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "receiverId")]
    pub receiver_id: i64,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct SendMessageData {
    pub id: i64,
}

pub async fn send_message(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<Envelope<SendMessageData>>, AppError> {
    let payload = require_body(payload)?;

    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("content cannot be empty"));
    }
    if payload.content.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::bad_request("content exceeds 2000 characters"));
    }

    let kind = match payload.kind.as_deref() {
        Some(raw) => {
            MessageKind::from_db(raw).ok_or_else(|| AppError::bad_request("invalid message type"))?
        }
        None => MessageKind::Text,
    };

    let service = ChatService::new(state.db.clone());
    let id = service
        .send_message(auth.user_id, payload.receiver_id, payload.content, kind)
        .await?;

    Ok(ok(SendMessageData { id }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

pub async fn get_chat_history(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Envelope<ListData<crate::domain::chat::Message>>>, AppError> {
    let conversation_id = parse_id(&id, "conversation")?;
    let (page, page_size) = page_window(query.page.as_deref(), query.page_size.as_deref(), 20)?;

    let service = ChatService::new(state.db.clone());
    let (list, total) = service
        .get_history(conversation_id, auth.user_id, page, page_size)
        .await?;

    Ok(ok(ListData { list, total }))
}
