use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wiking_dispatch::ControlSignal;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Control signal on its way out through HTTP
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Redirect to {uri}")]
    Redirect { uri: String, permanent: bool },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Redirect { permanent: true, .. } => StatusCode::MOVED_PERMANENTLY,
            ApiError::Redirect { permanent: false, .. } => StatusCode::FOUND,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ControlSignal> for ApiError {
    fn from(signal: ControlSignal) -> Self {
        match signal {
            ControlSignal::Redirect { uri, permanent } => ApiError::Redirect { uri, permanent },
            ControlSignal::NotFound => ApiError::NotFound("no such page".to_string()),
            ControlSignal::AuthenticationRequired => {
                ApiError::Unauthorized("authentication required".to_string())
            }
            ControlSignal::Forbidden => ApiError::Forbidden("access denied".to_string()),
            ControlSignal::BadRequest(msg) => ApiError::BadRequest(msg),
            ControlSignal::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            // Redirects carry no content
            ApiError::Redirect { uri, .. } => {
                return (status, [(header::LOCATION, uri)]).into_response();
            }
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::InternalError(msg) => msg,
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_status_mapping() {
        let cases = [
            (ControlSignal::redirect("/a"), StatusCode::FOUND),
            (ControlSignal::permanent_redirect("/a"), StatusCode::MOVED_PERMANENTLY),
            (ControlSignal::NotFound, StatusCode::NOT_FOUND),
            (ControlSignal::Forbidden, StatusCode::FORBIDDEN),
            (ControlSignal::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (ControlSignal::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ControlSignal::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (signal, status) in cases {
            assert_eq!(ApiError::from(signal).status(), status);
        }
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = ApiError::from(ControlSignal::redirect("/news")).into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/news");
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_redirect_body_is_empty() {
        use http_body_util::BodyExt;

        let response = ApiError::from(ControlSignal::permanent_redirect("/a%2Fb")).into_response();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/a%2Fb");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }
}
