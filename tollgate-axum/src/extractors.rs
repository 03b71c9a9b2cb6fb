use std::{convert::Infallible, net::SocketAddr};

use axum::{
    RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, UserAgent, authorization::Bearer},
};
use tollgate::{Session, SessionToken};

use crate::{
    error::ApiError,
    types::{ConnectionConfig, ConnectionInfo, CookieConfig, DEFAULT_COOKIE_NAME},
};

impl<S> FromRequestParts<S> for ConnectionInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .extract::<Option<TypedHeader<UserAgent>>>()
            .await
            .ok()
            .flatten()
            .map(|TypedHeader(ua)| ua.to_string());

        let trust_proxy_headers = parts
            .extensions
            .get::<ConnectionConfig>()
            .is_some_and(|config| config.trust_proxy_headers);

        let forwarded = trust_proxy_headers
            .then(|| forwarded_for(parts))
            .flatten();

        let ip = match forwarded {
            Some(ip) => Some(ip),
            None => parts
                .extract::<ConnectInfo<SocketAddr>>()
                .await
                .ok()
                .map(|ConnectInfo(addr)| addr.ip().to_string()),
        };

        Ok(ConnectionInfo { ip, user_agent })
    }
}

/// First hop of `X-Forwarded-For`, i.e. the address the outermost proxy saw.
fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// The session resolved by [`crate::auth_middleware`]. Rejects with 401.
pub struct AuthSession(pub Session);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthSession)
            .ok_or(ApiError::Unauthorized)
    }
}

pub struct OptionalAuthSession(pub Option<Session>);

impl<S> FromRequestParts<S> for OptionalAuthSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// The raw token presented by the client, unverified.
///
/// `Authorization: Bearer` wins over the cookie when both are present.
pub struct SessionTokenFromRequest(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for SessionTokenFromRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(TypedHeader(Authorization(bearer))) = parts
            .extract::<Option<TypedHeader<Authorization<Bearer>>>>()
            .await
            .ok()
            .flatten()
        {
            return Ok(SessionTokenFromRequest(Some(SessionToken::new(
                bearer.token(),
            ))));
        }

        let cookie_name = parts
            .extensions
            .get::<CookieConfig>()
            .map(|config| config.name.clone())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

        let token = CookieJar::from_headers(&parts.headers)
            .get(&cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| SessionToken::new(&value));

        Ok(SessionTokenFromRequest(token))
    }
}
