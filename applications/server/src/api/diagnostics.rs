/// Diagnostic API routes
use super::ApiJson;
use crate::{
    error::{Result, ServerError},
    services::notifier,
    state::AppState,
};
use axum::{extract::State, Json};
use heights_core::{EmailRequest, MessageResponse};

/// POST /api/test/email
///
/// Sends one message synchronously through the lead notifier so operators can
/// check SMTP settings. Failures are reported to the caller.
pub async fn send_test_email(
    State(app_state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<Json<MessageResponse>> {
    let to = req.to.trim();
    if to.is_empty() || req.subject.trim().is_empty() || req.text.trim().is_empty() {
        return Err(ServerError::BadRequest(
            "to, subject, and text are required".to_string(),
        ));
    }

    notifier::send_with_timeout(
        app_state.notifier.as_ref(),
        app_state.mail_timeout,
        to,
        &req.subject,
        &req.text,
    )
    .await?;

    tracing::info!(to = %to, "Test email sent");
    Ok(Json(MessageResponse::new("Email sent successfully")))
}
