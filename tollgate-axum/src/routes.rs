use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tollgate::{
    AccountProfile, ApiResponse, ChangePasswordRequest, ClientInfo, LoginRequest, SignupRequest,
    Tollgate,
};
use tollgate_core::repositories::RepositoryProvider;

use crate::{
    error::Result,
    extractors::{AuthSession, OptionalAuthSession, SessionTokenFromRequest},
    middleware::{AuthState, auth_middleware},
    types::*,
};

pub fn create_router<R>(
    tollgate: Arc<Tollgate<R>>,
    cookie_config: CookieConfig,
    connection_config: ConnectionConfig,
) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState { tollgate };

    Router::new()
        .route("/health", get(health_handler::<R>))
        .route("/me", get(me_handler::<R>))
        .route("/signup", post(signup_handler::<R>))
        .route("/login", post(login_handler::<R>))
        .route("/logout", post(logout_handler::<R>))
        .route("/change-password", post(change_password_handler::<R>))
        .route("/login-history", get(login_history_handler::<R>))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R>,
        ))
        .with_state(state)
        .layer(Extension(cookie_config))
        .layer(Extension(connection_config))
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.tollgate.health_check().await?;

    Ok(Json(ApiResponse::ok(
        "OK",
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )))
}

async fn me_handler<R>(
    State(state): State<AuthState<R>>,
    OptionalAuthSession(session): OptionalAuthSession,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let profile = match session {
        Some(session) => state.tollgate.profile(&session.account_id).await?,
        None => None,
    };

    let response = match profile {
        Some(profile) => ApiResponse::ok("Authenticated.", profile),
        None => ApiResponse::<AccountProfile>::ok_empty("Not logged in."),
    };
    Ok(Json(response))
}

async fn signup_handler<R>(
    State(state): State<AuthState<R>>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(request) = payload?;
    let profile = state.tollgate.signup(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Signup completed.", profile)),
    ))
}

async fn login_handler<R>(
    State(state): State<AuthState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    connection_info: ConnectionInfo,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(request) = payload?;
    let client = ClientInfo::from(connection_info);
    let outcome = state.tollgate.login(&request, &client).await?;

    let session = outcome.session;
    let max_age = (session.expires_at - session.created_at).num_seconds();
    let cookie = cookie_config.session_cookie(session.token.as_str(), max_age);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::ok(
            "Login successful.",
            LoginPayload {
                user: outcome.profile,
                token: session.token.into_inner(),
                expires_at: session.expires_at,
            },
        )),
    ))
}

async fn logout_handler<R>(
    State(state): State<AuthState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    SessionTokenFromRequest(token): SessionTokenFromRequest,
) -> impl IntoResponse
where
    R: RepositoryProvider,
{
    if let Some(token) = token {
        if let Err(e) = state.tollgate.logout(&token).await {
            tracing::warn!(error = %e, "Failed to revoke session on logout");
        }
    }

    (
        [(header::SET_COOKIE, cookie_config.removal_cookie())],
        Json(ApiResponse::<()>::ok_empty("Logged out.")),
    )
}

async fn change_password_handler<R>(
    State(state): State<AuthState<R>>,
    AuthSession(session): AuthSession,
    payload: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let Json(request) = payload?;
    state
        .tollgate
        .change_password(&session.account_id, &request)
        .await?;

    Ok(Json(ApiResponse::<()>::ok_empty(
        "Password changed successfully.",
    )))
}

async fn login_history_handler<R>(
    State(state): State<AuthState<R>>,
    AuthSession(session): AuthSession,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let entries = state.tollgate.login_history(&session.account_id).await?;

    Ok(Json(ApiResponse::ok("OK", entries)))
}
