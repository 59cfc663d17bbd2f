use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use partsdb_core::error::{PartsError, SqlxError};

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 503 Service Unavailable errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 503 through
/// the `anyhow::Error` chain without touching the `PartsError` enum.
#[derive(Debug)]
struct UnavailableError(String);

impl std::fmt::Display for UnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for UnavailableError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error for a malformed id.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(PartsError::InvalidId(msg.into()).into())
    }

    /// Construct a 503 Service Unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self(UnavailableError(msg.into()).into())
    }
}

fn status_for(e: &PartsError) -> StatusCode {
    match e {
        PartsError::CategoryNotFound(_)
        | PartsError::PartNotFound(_)
        | PartsError::UnknownLibrary(_) => StatusCode::NOT_FOUND,
        PartsError::InvalidId(_) | PartsError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        PartsError::PartNameImmutable(_) => StatusCode::CONFLICT,
        PartsError::Database(sqlx_err) if is_connection_error(sqlx_err) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PartsError::Config(_)
        | PartsError::Database(_)
        | PartsError::Io(_)
        | PartsError::Yaml(_)
        | PartsError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn is_connection_error(e: &SqlxError) -> bool {
    matches!(
        e,
        SqlxError::Io(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Tls(_)
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(u) = self.0.downcast_ref::<UnavailableError>() {
            let body = serde_json::json!({ "error": u.0.clone() });
            return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response();
        }

        let status = match self.0.downcast_ref::<PartsError>() {
            Some(e) => status_for(e),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn part_not_found_maps_to_404() {
        let err = AppError(PartsError::PartNotFound(9).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn category_not_found_maps_to_404() {
        let err = AppError(PartsError::CategoryNotFound(9).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_id_maps_to_400() {
        let err = AppError::bad_request("abc");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rename_maps_to_409() {
        let err = AppError(PartsError::PartNameImmutable(1).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn pool_timeout_maps_to_503() {
        let err = AppError(PartsError::Database(SqlxError::PoolTimedOut).into());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn row_not_found_maps_to_500() {
        let err = AppError(PartsError::Database(SqlxError::RowNotFound).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unavailable_constructor_maps_to_503() {
        let err = AppError::unavailable("database unreachable");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(PartsError::PartNotFound(1).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
