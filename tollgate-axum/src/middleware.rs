use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tollgate::{SessionToken, Tollgate};
use tollgate_core::repositories::RepositoryProvider;

use crate::{error::ApiError, extractors::SessionTokenFromRequest};

pub struct AuthState<R: RepositoryProvider> {
    pub tollgate: Arc<Tollgate<R>>,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            tollgate: self.tollgate.clone(),
        }
    }
}

/// Resolve the presented token, if any, and attach the [`tollgate::Session`]
/// to the request. A missing or invalid token is not rejected here; handlers
/// decide whether a session is needed. A failing store answers 500.
pub async fn auth_middleware<R>(
    State(state): State<AuthState<R>>,
    SessionTokenFromRequest(token): SessionTokenFromRequest,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    if let Some(token) = token {
        match state.tollgate.authenticate(&token).await {
            Ok(session) => {
                request.extensions_mut().insert(session);
            }
            Err(e) if e.is_server_error() => {
                return ApiError::from(e).into_response();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
            }
        }
    }

    next.run(request).await
}

/// Reject requests that do not carry a valid session.
///
/// For protecting routes outside the auth router:
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/private", get(handler))
///     .route_layer(axum::middleware::from_fn_with_state(state, require_auth::<R>));
/// ```
pub async fn require_auth<R>(
    State(state): State<AuthState<R>>,
    SessionTokenFromRequest(token): SessionTokenFromRequest,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    let token: SessionToken = token.ok_or(ApiError::Unauthorized)?;
    let session = state.tollgate.authenticate(&token).await?;
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
