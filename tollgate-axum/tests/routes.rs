use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tollgate::{SqliteRepositoryProvider, Tollgate, TollgateBuilder};
use tollgate_axum::{AuthSession, AuthState, CookieConfig, require_auth};
use tower::ServiceExt;

const EMAIL: &str = "jane@example.com";
const PASSWORD: &str = "Passw0rd";

async fn tollgate() -> Arc<Tollgate<SqliteRepositoryProvider>> {
    tollgate_with_pool().await.0
}

async fn tollgate_with_pool() -> (Arc<Tollgate<SqliteRepositoryProvider>>, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let tollgate = TollgateBuilder::new()
        .with_sqlite_pool(pool.clone())
        .apply_migrations(true)
        .build()
        .await
        .unwrap();

    (Arc::new(tollgate), pool)
}

fn app(tollgate: Arc<Tollgate<SqliteRepositoryProvider>>) -> Router {
    tollgate_axum::routes(tollgate)
        .build()
        .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))))
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "integration-test/1.0")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn signup(app: &Router) {
    let response = send(
        app,
        post_json(
            "/signup",
            json!({"email": EMAIL, "password": PASSWORD, "name": "Jane", "confirmPassword": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
}

async fn login(app: &Router, password: &str) -> TestResponse {
    send(
        app,
        post_json("/login", json!({"email": EMAIL, "password": password})),
    )
    .await
}

#[tokio::test]
async fn test_signup_and_conflict() {
    let app = app(tollgate().await);

    let response = send(
        &app,
        post_json(
            "/signup",
            json!({"email": EMAIL, "password": PASSWORD, "name": "Jane"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["payload"]["email"], EMAIL);

    let response = send(
        &app,
        post_json(
            "/signup",
            json!({"email": EMAIL, "password": PASSWORD, "name": "Other"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "Email is already registered.");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app(tollgate().await);

    let request = Request::post("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["message"], "The request format is invalid.");
    assert!(response.body["payload"].is_null());
}

#[tokio::test]
async fn test_login_sets_cookie_and_records_history() {
    let app = app(tollgate().await);
    signup(&app).await;

    let response = login(&app, PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Login successful.");
    assert_eq!(response.body["payload"]["user"]["email"], EMAIL);

    let token = response.body["payload"]["token"].as_str().unwrap().to_string();
    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("auth-token={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=10800"));

    let response = send(&app, with_bearer("/login-history", &token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let entries = response.body["payload"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["ip_address"], "192.0.2.1");
    assert_eq!(entries[0]["user_agent"], "integration-test/1.0");
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let app = app(tollgate().await);
    signup(&app).await;

    let wrong_password = login(&app, "Wrong1pass").await;
    let unknown = send(
        &app,
        post_json(
            "/login",
            json!({"email": "nobody@example.com", "password": PASSWORD}),
        ),
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown.body);
    assert!(wrong_password.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_lockout_returns_forbidden() {
    let app = app(tollgate().await);
    signup(&app).await;

    for _ in 0..5 {
        let response = login(&app, "Wrong1pass").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let response = login(&app, PASSWORD).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["message"],
        "Account is locked. Try again in about 15 minute(s)."
    );
}

#[tokio::test]
async fn test_cookie_authenticates_and_logout_clears_it() {
    let app = app(tollgate().await);
    signup(&app).await;

    let token = login(&app, PASSWORD).await.body["payload"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    let cookie = format!("auth-token={token}");

    let me = Request::get("/me")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, me).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["payload"]["email"], EMAIL);

    let logout = Request::post("/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, logout).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let cleared = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("auth-token=;"));
    assert!(cleared.ends_with("Max-Age=0"));

    let response = send(&app, with_bearer("/login-history", &token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Not authenticated.");
}

#[tokio::test]
async fn test_me_without_session_has_null_payload() {
    let app = app(tollgate().await);

    let response = send(&app, Request::get("/me").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.body["payload"].is_null());

    let response = send(&app, with_bearer("/me", "garbage")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["payload"].is_null());
}

#[tokio::test]
async fn test_logout_without_token_succeeds() {
    let app = app(tollgate().await);

    let response = send(&app, Request::post("/logout").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out.");
}

#[tokio::test]
async fn test_change_password() {
    let app = app(tollgate().await);
    signup(&app).await;
    let token = login(&app, PASSWORD).await.body["payload"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let change = |body: Value| {
        Request::post("/change-password")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = send(
        &app,
        change(json!({"currentPassword": "Wrong1pass", "newPassword": "N3wPassw0rd", "confirmPassword": "N3wPassw0rd"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Current password is incorrect.");

    let response = send(
        &app,
        change(json!({"current_password": PASSWORD, "new_password": "N3wPassw0rd", "confirm_password": "N3wPassw0rd"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Password changed successfully.");

    assert_eq!(login(&app, PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "N3wPassw0rd").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = app(tollgate().await);

    let response = send(
        &app,
        Request::get("/login-history").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        post_json(
            "/change-password",
            json!({"current_password": PASSWORD, "new_password": "N3wPassw0rd", "confirm_password": "N3wPassw0rd"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_store_failure_is_server_error() {
    let (tollgate, pool) = tollgate_with_pool().await;
    let app = app(tollgate);
    signup(&app).await;
    let token = login(&app, PASSWORD).await.body["payload"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    sqlx::query("DROP TABLE sessions").execute(&pool).await.unwrap();

    for uri in ["/login-history", "/me"] {
        let response = send(&app, with_bearer(uri, &token)).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["message"], "A server error occurred.");
    }

    // Without a token there is no lookup to fail.
    let response = send(&app, Request::get("/me").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app = app(tollgate().await);

    let response = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["payload"]["status"], "healthy");
}

#[tokio::test]
async fn test_require_auth_guards_application_routes() {
    let tollgate = tollgate().await;
    let auth = app(tollgate.clone());
    signup(&auth).await;
    let token = login(&auth, PASSWORD).await.body["payload"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let state = AuthState { tollgate };
    let private = Router::new()
        .route(
            "/private",
            get(|AuthSession(session): AuthSession| async move {
                axum::Json(json!({ "account": session.account_id }))
            }),
        )
        .route_layer(from_fn_with_state(state, require_auth::<SqliteRepositoryProvider>))
        .layer(axum::Extension(CookieConfig::default()));

    let response = send(&private, with_bearer("/private", &token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["account"].is_string());

    let response = send(&private, Request::get("/private").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}
