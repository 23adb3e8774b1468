// src/handlers/events.rs

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{config::AppState, middleware::auth::AuthenticatedEmployee};

// GET /api/events (Server-Sent Events)
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Dashboard",
    responses((status = 200, description = "Fluxo SSE (text/event-stream) de eventos 'dashboard'")),
    security(("api_jwt" = []))
)]
pub async fn stream_events(
    State(app_state): State<AppState>,
    _user: AuthenticatedEmployee,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Receptor atrasado (Lagged) simplesmente pula os eventos perdidos
    let stream = BroadcastStream::new(app_state.events.subscribe()).filter_map(|message| {
        let event = message.ok()?;
        Event::default()
            .event("dashboard")
            .json_data(&event)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
