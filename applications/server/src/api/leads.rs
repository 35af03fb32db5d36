/// Lead intake API routes
use super::ApiJson;
use crate::{error::Result, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use heights_core::{LeadCreatedResponse, LeadSubmission};

/// POST /api/leads
pub async fn create_lead(
    State(app_state): State<AppState>,
    ApiJson(submission): ApiJson<LeadSubmission>,
) -> Result<(StatusCode, Json<LeadCreatedResponse>)> {
    let lead = app_state.leads.submit(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(LeadCreatedResponse {
            message: "Lead submitted successfully".to_string(),
            new_lead: lead,
        }),
    ))
}
