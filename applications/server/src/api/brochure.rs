/// Brochure download, available to signed-in users only
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

pub const BROCHURE_FILE_NAME: &str = "Centrum Heights Brochure.pdf";

/// GET /api/brochure
pub async fn download_brochure(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Response> {
    let path = app_state
        .brochure_path
        .as_ref()
        .ok_or_else(|| ServerError::NotFound("Brochure".to_string()))?;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Configured brochure is missing");
            return Err(ServerError::NotFound("Brochure".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(user_id = %auth.user_id(), size = bytes.len(), "Serving brochure");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{BROCHURE_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
