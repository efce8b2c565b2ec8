use crate::session::SessionError;
use crate::tmdb::TmdbError;
use actix_web::{error, http::StatusCode, HttpResponse, ResponseError};
use log::{debug, error};
use serde_json::json;

/// Page handlers: keep the details in the log, show the user `message`.
pub fn log_error<E: std::fmt::Debug>(err: E, message: &'static str) -> error::Error {
    debug!("{:?}", err);
    error::ErrorInternalServerError(message)
}

/// Errors of the JSON API, rendered as `{status, message, error}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Not signed in")]
    Unauthorized,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Upstream(#[from] TmdbError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Session(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = if status.is_server_error() {
            error!("{}", self);
            json!({
                "status": status.as_u16(),
                "message": "Internal server error",
                "error": self.to_string(),
            })
        } else {
            json!({
                "status": status.as_u16(),
                "message": self.to_string(),
            })
        };
        HttpResponse::build(status).json(body)
    }
}

/// Malformed JSON bodies get the same shape as every other API error.
pub fn json_error_handler(
    err: error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> error::Error {
    debug!("Rejected JSON body: {}", err);
    ApiError::BadRequest(format!("Invalid request body: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_rt::test]
    async fn client_errors_carry_message() {
        let response = ApiError::NotFound("Movie not found".to_owned()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "status": 404, "message": "Movie not found" }));
    }

    #[actix_rt::test]
    async fn server_errors_are_generic() {
        let err = ApiError::Upstream(TmdbError::Status(503));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["error"], "TMDb responded with 503");
    }
}
