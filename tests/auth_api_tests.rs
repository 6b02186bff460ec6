use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tradeforge::config::Config;
use tradeforge::db::Store;
use tradeforge::services::TokenIssuer;

const TEST_SECRET: &str = "integration-test-secret";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    // Cheap hashing so the suite stays fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

async fn spawn_app_with(config: Config) -> (Router, Store) {
    let state = tradeforge::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    let store = state.store.clone();

    (tradeforge::api::router(state), store)
}

async fn spawn_app() -> (Router, Store) {
    spawn_app_with(test_config()).await
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn register_body(email: &str) -> Value {
    json!({
        "email": email,
        "password": "hunter22",
        "name": "Alice Tester",
        "companyName": "Tester GmbH",
        "role": "buyer",
    })
}

#[tokio::test]
async fn register_login_logout_lifecycle() {
    let (app, store) = spawn_app().await;

    // Register
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("alice@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["user"]["email"], json!("alice@example.com"));
    assert_eq!(body["user"]["role"], json!("buyer"));
    assert_eq!(body["user"]["isVerified"], json!(false));
    assert_eq!(body["user"]["companyName"], json!("Tester GmbH"));
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let register_token = body["token"].as_str().unwrap().to_string();
    assert!(!register_token.is_empty());

    // Duplicate email
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("alice@example.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("User already exists"));

    // Wrong password
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "alice@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Invalid email or password"));

    // Correct login
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "alice@example.com", "password": "hunter22"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let login_token = body["token"].as_str().unwrap().to_string();
    assert_ne!(login_token, register_token);

    // Both tokens have live sessions
    assert!(
        store
            .find_session_by_token(&login_token)
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        store
            .find_session_by_token(&register_token)
            .await
            .unwrap()
            .is_some()
    );

    // Logout removes exactly the presented token's session
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/auth/logout")
                .header(header::AUTHORIZATION, format!("Bearer {login_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Logged out successfully"));

    assert!(
        store
            .find_session_by_token(&login_token)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .find_session_by_token(&register_token)
            .await
            .unwrap()
            .is_some()
    );

    // Logout is idempotent, with or without a token
    for request in [
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {login_token}"))
            .body(Body::empty())
            .unwrap(),
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .body(Body::empty())
            .unwrap(),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let (app, _store) = spawn_app().await;

    let incomplete = [
        json!({}),
        json!({"email": "a@x.com"}),
        json!({"email": "a@x.com", "password": "secret1"}),
        json!({"password": "secret1", "name": "A"}),
    ];

    for body in incomplete {
        let response = app
            .clone()
            .oneshot(post_json("/api/auth/register", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Email, password and name are required"));
    }
}

#[tokio::test]
async fn login_rejects_missing_fields() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", &json!({"email": "a@x.com"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Email and password are required"));
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_identical() {
    let (app, _store) = spawn_app().await;

    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("bob@example.com"),
        ))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "bob@example.com", "password": "nope"}),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "nobody@example.com", "password": "nope"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_body = body_json(wrong_password).await;
    let unknown_body = body_json(unknown_email).await;
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn roles_normalize_on_registration() {
    let (app, _store) = spawn_app().await;

    let cases = [
        ("supplier@example.com", Some("supplier"), "supplier"),
        ("wizard@example.com", Some("wizard"), "buyer"),
        ("nobody-role@example.com", None, "buyer"),
    ];

    for (email, role, expected) in cases {
        let mut body = register_body(email);
        match role {
            Some(role) => body["role"] = json!(role),
            None => {
                body.as_object_mut().unwrap().remove("role");
            }
        }

        let response = app
            .clone()
            .oneshot(post_json("/api/auth/register", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["user"]["role"], json!(expected));
    }
}

#[tokio::test]
async fn issued_tokens_carry_identity_claims() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("claims@example.com"),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;

    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let token = body["token"].as_str().unwrap();

    let issuer = TokenIssuer::new(TEST_SECRET, 86_400);
    let claims = issuer.verify(token).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "claims@example.com");
    assert_eq!(claims.role, "buyer");
    assert!(claims.exp - claims.iat == 86_400);
}

#[tokio::test]
async fn activity_log_records_register_and_login() {
    let (app, store) = spawn_app().await;

    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("audit@example.com"),
        ))
        .await
        .unwrap();

    let mut login = post_json(
        "/api/auth/login",
        &json!({"email": "audit@example.com", "password": "hunter22"}),
    );
    login
        .headers_mut()
        .insert("X-Forwarded-For", "203.0.113.7".parse().unwrap());
    app.clone().oneshot(login).await.unwrap();

    let entries = store.recent_activity(10).await.unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"register"));
    assert!(actions.contains(&"login"));

    let login_entry = entries.iter().find(|e| e.action == "login").unwrap();
    assert_eq!(login_entry.ip_address.as_deref(), Some("203.0.113.7"));
    assert!(login_entry.user_id.is_some());
}

#[tokio::test]
async fn login_updates_last_login() {
    let (app, store) = spawn_app().await;

    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            &register_body("lastlogin@example.com"),
        ))
        .await
        .unwrap();

    let before = store
        .find_user_by_email("lastlogin@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(before.last_login.is_none());

    app.clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "lastlogin@example.com", "password": "hunter22"}),
        ))
        .await
        .unwrap();

    let after = store
        .find_user_by_email("lastlogin@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(after.last_login.is_some());
}

#[tokio::test]
async fn health_reports_ok_and_environment() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["environment"], json!("development"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/no/such/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Route not found"));
}

#[tokio::test]
async fn seed_admin_can_log_in() {
    let mut config = test_config();
    config.auth.seed_admin_email = Some("admin@tradeforge.test".to_string());
    config.auth.seed_admin_password = Some("seeded-password".to_string());
    let (app, _store) = spawn_app_with(config).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": "admin@tradeforge.test", "password": "seeded-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], json!("admin"));
    assert_eq!(body["user"]["isVerified"], json!(true));
}
