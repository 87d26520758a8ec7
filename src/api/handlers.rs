use super::AppState;
use super::models::{DashboardView, StatusResponse, SummaryResponse};
use crate::analytics::DepthView;
use crate::errors::ChannelError;
use crate::models::{EventMessage, MidPricePoint, OrderSubmission, OrderTicket};
use crate::orderbook::BookSnapshot;
use axum::{extract::State, http::StatusCode, response::Json};

/// GET /health — simple liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// GET /status — venue connection state
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: state.conn.state(),
    })
}

/// GET /book — latest raw snapshot, null before the first one
pub async fn book(State(state): State<AppState>) -> Json<Option<BookSnapshot>> {
    Json(state.engine.read(|e| e.book().cloned()))
}

/// GET /summary — derived metrics
pub async fn summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        metrics: state.engine.read(|e| e.metrics()),
    })
}

/// GET /depth — normalized bar widths per side
pub async fn depth(State(state): State<AppState>) -> Json<DepthView> {
    Json(state.engine.read(|e| e.depth()))
}

/// GET /history — best bid, best ask and mid-price series, oldest first
pub async fn history(State(state): State<AppState>) -> Json<Vec<MidPricePoint>> {
    Json(state.engine.read(|e| e.mid_history()))
}

/// GET /events — non-snapshot venue messages, oldest first
pub async fn events(State(state): State<AppState>) -> Json<Vec<EventMessage>> {
    Json(state.engine.read(|e| e.events()))
}

/// GET /view — everything a dashboard needs in one read
pub async fn view(State(state): State<AppState>) -> Json<DashboardView> {
    let toggles = state.view;

    // one lock so every section comes from the same book
    let view = state.engine.read(|e| DashboardView {
        status: state.conn.state(),
        metrics: toggles.show_metrics.then(|| SummaryResponse {
            metrics: e.metrics(),
        }),
        mid_history: toggles.show_chart.then(|| e.mid_history()),
        depth: toggles.show_table.then(|| e.depth()),
        events: e.events(),
    });

    Json(view)
}

/// POST /orders — assign an id and forward to the venue
pub async fn submit_order(
    State(state): State<AppState>,
    Json(ticket): Json<OrderTicket>,
) -> Result<Json<OrderSubmission>, StatusCode> {
    match state.commands.submit_order(ticket) {
        Ok(order) => Ok(Json(order)),
        Err(ChannelError::NotConnected | ChannelError::Closed) => {
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
        Err(e) => {
            tracing::error!("order submission failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
