use axum::response::{IntoResponse, Response};
use cinelib_dal::Error as StoreError;
use http::StatusCode;
use tracing::error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] StoreError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
            StoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            // full detail stays in the log, the client gets the status line
            error!("{self}");
            status.into_response()
        } else {
            (status, self.to_string()).into_response()
        }
    }
}
