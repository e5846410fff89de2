//! Gateway routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    LatencyUnit,
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, warn};
use uuid::Uuid;

use auth::{AuthUser, auth_middleware};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{handle_panic, sanitize_json_body},
    models::{
        ChatResponse, ConversationListQuery, ConversationListResponse, Message, Role,
        SendMessageRequest,
    },
    state::AppState,
    validation::{validate_conversation_id, validate_message},
};

/// Create the router for the gateway
///
/// Layers run outermost first: panic catcher, request tracing, bearer token
/// check, body sanitizer. CORS is added on top by the caller.
pub fn create_router(state: AppState) -> Router {
    let jwt_service = state.auth_service.jwt_service().clone();

    let chat_routes = Router::new()
        .route("/send", post(send_message))
        .route("/conversations", get(list_conversations))
        .route(
            "/conversation/:conversation_id",
            get(get_conversation).delete(delete_conversation),
        );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/chat", chat_routes)
        .with_state(state.clone())
        .nest("/api/auth", auth::routes::create_router(state.auth_service))
        .layer(middleware::from_fn(sanitize_json_body))
        .layer(middleware::from_fn_with_state(jwt_service, auth_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Service banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Organization Chat API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs"
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "organization-chat-api"
    }))
}

/// Send a message and get the assistant's reply
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = validate_message(&payload.message).map_err(ApiError::Validation)?;

    let conversation_id = match payload
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        Some(id) => {
            validate_conversation_id(id).map_err(ApiError::Validation)?;
            id.to_string()
        }
        None => Uuid::new_v4().to_string(),
    };

    info!(
        "Processing message for user {} in conversation {}",
        user.email, conversation_id
    );

    let history = match state
        .conversation_repository
        .get(&conversation_id, &user.email)
        .await
    {
        Ok(Some(conversation)) => conversation.messages,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(
                "Could not load history of conversation {}, continuing without it: {:#}",
                conversation_id, e
            );
            Vec::new()
        }
    };

    let user_message = Message::new(Uuid::new_v4().to_string(), Role::User, message);
    let reply = state
        .chat_responder
        .respond(&user_message.content, &history, &user.email)
        .await?;
    let assistant_message = Message::new(Uuid::new_v4().to_string(), Role::Assistant, reply);

    let saved = state
        .conversation_repository
        .save(
            &conversation_id,
            &user.email,
            &[user_message.clone(), assistant_message.clone()],
        )
        .await;
    if !saved {
        warn!(
            "Conversation {} of user {} was not persisted",
            conversation_id, user.email
        );
    }

    Ok(Json(ChatResponse {
        response: assistant_message.content,
        conversation_id,
        message_id: user_message.id,
        timestamp: user_message.timestamp,
    }))
}

/// List the caller's conversations, newest first
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ConversationListQuery>,
) -> ApiResult<impl IntoResponse> {
    let summaries = state.conversation_repository.list(&user.email).await?;
    let total = summaries.len();

    Ok(Json(ConversationListResponse {
        conversations: summaries.into_iter().take(query.limit()).collect(),
        total,
    }))
}

/// Get a full conversation
pub async fn get_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    validate_conversation_id(&conversation_id).map_err(ApiError::Validation)?;

    let conversation = state
        .conversation_repository
        .get(&conversation_id, &user.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(conversation))
}

/// Delete a conversation
pub async fn delete_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    validate_conversation_id(&conversation_id).map_err(ApiError::Validation)?;

    let deleted = state
        .conversation_repository
        .delete(&conversation_id, &user.email)
        .await?;

    if deleted {
        Ok(Json(json!({"message": "Conversation deleted successfully"})))
    } else {
        Err(ApiError::NotFound("Conversation not found".to_string()))
    }
}
