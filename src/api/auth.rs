use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, AuthResponse};
use crate::services::RegisterInput;

// ============================================================================
// Request Types
// ============================================================================

/// All fields default so that missing keys reach the service layer as empty
/// strings and come back as a 400 instead of a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(token.trim().to_string())
}

/// Best-effort client address for the activity log. Only proxy headers are
/// consulted; absence is recorded as NULL.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP")
        && let Ok(value) = real_ip.to_str()
    {
        return Some(value.trim().to_string());
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = RegisterInput {
        email: request.email,
        password: request.password,
        name: request.name,
        company_name: request.company_name,
        phone: request.phone,
        company_size: request.company_size,
        role: request.role,
    };

    let result = state.auth.register(input, client_ip(&headers)).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Registration successful".to_string(),
        user: result.user,
        token: result.token,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .auth
        .login(&request.email, &request.password, client_ip(&headers))
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user: result.user,
        token: result.token,
    }))
}

/// POST /api/auth/logout
///
/// Succeeds whether or not the bearer token matches a live session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers);
    state.auth.logout(token.as_deref()).await?;

    Ok(Json(ApiResponse::ok("Logged out successfully")))
}
