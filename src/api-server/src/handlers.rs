use axum::{
    extract::{Extension, Query, State},
    http::{header, HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use wiking_authz::Credentials;
use wiking_dispatch::IncomingRequest;

use crate::{
    error::{ApiError, Result},
    middleware::X_WIKING_LOGIN,
    models::HealthResponse,
    state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        role_cache: state.role_graph().cache_stats().into(),
    })
}

/// Every other path goes through the dispatcher
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    request_id: Option<Extension<Uuid>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ApiError::MethodNotAllowed(method.to_string()));
    }

    let incoming = IncomingRequest {
        path: uri.path().to_string(),
        params,
        credentials: credentials(&headers),
        request_id: request_id.map(|Extension(id)| id),
    };
    debug!(path = %incoming.path, "Dispatching");

    let response = state.dispatcher.dispatch(incoming).await?;
    Ok(([(header::CONTENT_TYPE, response.content_type)], response.body).into_response())
}

fn credentials(headers: &HeaderMap) -> Credentials {
    headers
        .get(X_WIKING_LOGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(Credentials::login)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_credentials_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(credentials(&headers), Credentials::anonymous());

        headers.insert(X_WIKING_LOGIN, HeaderValue::from_static("  "));
        assert_eq!(credentials(&headers), Credentials::anonymous());

        headers.insert(X_WIKING_LOGIN, HeaderValue::from_static("joe"));
        assert_eq!(credentials(&headers), Credentials::login("joe"));
    }
}
