use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures while starting up or talking to the database
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Malformed GeoJSON from database: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] shadewalk_core::Error),
}

/// Request-level failure, rendered as `{"error": ..., "kind": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required parameters: {0}")]
    MissingParameters(String),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Core(#[from] shadewalk_core::Error),
    #[error("Failed to fetch {layer} data")]
    Layer {
        layer: &'static str,
        #[source]
        source: ServerError,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameters(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                shadewalk_core::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                shadewalk_core::Error::NoPath { .. } => StatusCode::NOT_FOUND,
                shadewalk_core::Error::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Layer { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingParameters(_) => "missing-parameters",
            ApiError::MalformedBody(_) => "invalid-input",
            ApiError::Core(e) => e.kind(),
            ApiError::Layer { .. } => "upstream-unavailable",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "request rejected");
        }
        (
            status,
            Json(json!({ "error": self.to_string(), "kind": self.kind() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_http_statuses() {
        let cases = [
            (
                ApiError::Core(shadewalk_core::Error::InvalidInput("x".into())),
                StatusCode::BAD_REQUEST,
                "invalid-input",
            ),
            (
                ApiError::Core(shadewalk_core::Error::NoPath {
                    from: geo::Point::new(0.0, 0.0),
                    to: geo::Point::new(1.0, 1.0),
                }),
                StatusCode::NOT_FOUND,
                "no-path",
            ),
            (
                ApiError::Core(shadewalk_core::Error::UpstreamUnavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream-unavailable",
            ),
            (
                ApiError::MissingParameters("end".into()),
                StatusCode::BAD_REQUEST,
                "missing-parameters",
            ),
        ];
        for (error, status, kind) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.kind(), kind);
        }
    }
}
