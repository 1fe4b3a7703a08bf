//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ErrorResponse, QuantityRequest, SelectOptionRequest, StartPurchaseRequest,
    VersionResponse,
};
use super::AppState;
use crate::conversation::ExchangeId;
use crate::runtime::{RuntimeError, SessionEvent, SseEvent};
use crate::view::SessionView;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session snapshot and streaming
        .route("/api/session", get(get_session))
        .route("/api/session/stream", get(stream_session))
        // Conversation
        .route("/api/messages", post(send_message))
        .route("/api/options/select", post(select_option))
        // Purchase workflow
        .route("/api/purchase/start", post(start_purchase))
        .route("/api/exchanges/:id/buy", post(buy_exchange))
        .route("/api/purchase/quantity", post(edit_quantity))
        .route("/api/purchase/confirm", post(confirm_purchase))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.view())
}

async fn stream_session(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before snapshotting so nothing falls between the two
    let broadcast_rx = state.session.subscribe();
    let init_event = SseEvent::Init {
        view: state.session.view(),
    };
    sse_stream(init_event, broadcast_rx)
}

// ============================================================
// Conversation
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, SessionEvent::UserMessage { text: req.text }).await
}

async fn select_option(
    State(state): State<AppState>,
    Json(req): Json<SelectOptionRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, SessionEvent::SelectOption { option: req.option }).await
}

// ============================================================
// Purchase Workflow
// ============================================================

async fn start_purchase(
    State(state): State<AppState>,
    Json(req): Json<StartPurchaseRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(
        &state,
        SessionEvent::StartPurchase {
            unit_price: req.unit_price,
        },
    )
    .await
}

async fn buy_exchange(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let exchange_id: ExchangeId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid exchange id: {id}")))?;
    dispatch(&state, SessionEvent::BuyExchange { exchange_id }).await
}

async fn edit_quantity(
    State(state): State<AppState>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, SessionEvent::EditQuantity { input: req.value }).await
}

async fn confirm_purchase(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, SessionEvent::ConfirmPurchase).await
}

async fn dispatch(state: &AppState, event: SessionEvent) -> Result<Json<SessionView>, AppError> {
    state
        .session
        .dispatch(event)
        .await
        .map(Json)
        .map_err(AppError::from)
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        let message = e.to_string();
        match e {
            RuntimeError::ExchangeNotFound(_) => AppError::NotFound(message),
            RuntimeError::NotPurchasable(_) => AppError::BadRequest(message),
            RuntimeError::Transition(_) => AppError::Conflict(message),
            RuntimeError::Stopped => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
