use crate::analytics::{DepthView, Metrics};
use crate::channel::ConnectionState;
use crate::models::{EventMessage, MidPricePoint};
use serde::Serialize;

/// Response for GET /status
#[derive(Serialize)]
pub struct StatusResponse {
    pub state: ConnectionState,
}

/// Response for GET /summary. `metrics` is null while there is no two-sided book.
#[derive(Serialize)]
pub struct SummaryResponse {
    pub metrics: Option<Metrics>,
}

/// Response for GET /view. Sections switched off in the config are omitted.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub status: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SummaryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_history: Option<Vec<MidPricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthView>,
    pub events: Vec<EventMessage>,
}
