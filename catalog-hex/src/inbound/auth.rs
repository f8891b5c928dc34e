//! Authentication middleware for API key validation.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use catalog_types::{AppError, CatalogRepository, Role};

use super::handlers::{ApiError, AppState};

/// Paths reachable without a key.
const PUBLIC_PATHS: &[&str] = &["/health", "/api-docs/openapi.json"];

/// Extracts the API key from the Authorization header.
/// Expected format: "Bearer <api_key>" or just "<api_key>"
fn extract_api_key(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?.trim();
    Some(header.strip_prefix("Bearer ").unwrap_or(header).trim())
}

/// Whether `role` may perform a request with `method`.
fn permits(role: Role, method: &Method) -> bool {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        role.can_read()
    } else {
        role.can_write()
    }
}

/// Authentication middleware that validates API keys and their role.
///
/// Reads need a `viewer` or `writer` key, everything else a `writer` key.
/// Unknown or missing keys get 401, known keys lacking the role get 403.
pub async fn auth_middleware<R: CatalogRepository>(
    State(state): State<Arc<AppState<R>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let api_key = match extract_api_key(auth_header) {
        Some(key) if !key.is_empty() => key,
        _ => return reject(AppError::Unauthorized("Missing or invalid Authorization header".into())),
    };

    let Some(role) = state.api_keys.authenticate(api_key) else {
        return reject(AppError::Unauthorized("Invalid API key".into()));
    };

    if !permits(role, request.method()) {
        tracing::warn!(%role, method = %request.method(), path = request.uri().path(), "Insufficient role");
        return reject(AppError::Forbidden(format!(
            "Role `{role}` cannot {} this resource",
            request.method()
        )));
    }

    next.run(request).await
}

fn reject(err: AppError) -> Response {
    ApiError(err).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_bearer() {
        assert_eq!(
            extract_api_key(Some("Bearer ck_test_123")),
            Some("ck_test_123")
        );
    }

    #[test]
    fn test_extract_api_key_raw() {
        assert_eq!(extract_api_key(Some("ck_test_123")), Some("ck_test_123"));
    }

    #[test]
    fn test_extract_api_key_none() {
        assert_eq!(extract_api_key(None), None);
    }

    #[test]
    fn test_viewer_reads_only() {
        assert!(permits(Role::Viewer, &Method::GET));
        assert!(!permits(Role::Viewer, &Method::POST));
        assert!(!permits(Role::Viewer, &Method::DELETE));
    }

    #[test]
    fn test_writer_reads_and_writes() {
        assert!(permits(Role::Writer, &Method::GET));
        assert!(permits(Role::Writer, &Method::PUT));
    }
}
