//! On-demand reconciliation endpoint.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use hcbridge_app::services::reconcile_service::ReconcileReport;
use hcbridge_domain::id::IdentityKey;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KeySet {
    pub count: usize,
    pub keys: Vec<IdentityKey>,
}

impl From<Vec<IdentityKey>> for KeySet {
    fn from(keys: Vec<IdentityKey>) -> Self {
        Self {
            count: keys.len(),
            keys,
        }
    }
}

/// Accessories touched by one pass.
#[derive(Debug, Serialize)]
pub struct ReconcileSummary {
    pub created: KeySet,
    pub updated: KeySet,
    pub removed: KeySet,
}

impl From<ReconcileReport> for ReconcileSummary {
    fn from(report: ReconcileReport) -> Self {
        Self {
            created: report.created.into(),
            updated: report.updated.into(),
            removed: report.removed.into(),
        }
    }
}

/// Possible responses from the reconcile endpoint.
pub enum RunResponse {
    Ok(Json<ReconcileSummary>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/reconcile`
pub async fn run<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
) -> Result<RunResponse, ApiError>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let report = state.reconciler.reconcile().await?;
    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        removed = report.removed.len(),
        "manual reconciliation done"
    );
    Ok(RunResponse::Ok(Json(report.into())))
}
