//! Read-only room introspection.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::services::gateway::RoomSummary;
use crate::state::AppState;

/// `GET /api/rooms/{id}` — live membership and history counters.
pub async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<RoomSummary>, StatusCode> {
    let hub = state.hub.lock().await;
    hub.gateway
        .room_summary(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
