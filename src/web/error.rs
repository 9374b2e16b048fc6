use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use repo_insight::api::Error;
use serde::Serialize;

/// Body of every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, message) = match &err {
            Error::MissingInput(_) | Error::MalformedReference(_) | Error::UpstreamNotFound(_) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Error::UpstreamUnavailable => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::MissingField(_) | Error::Other(_) => {
                error!("Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {:#}", err))
            }
        };
        ApiError { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}
