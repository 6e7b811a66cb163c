//! End-to-end checks of the reqwest transport against a mock backend.
//!
//! An actix-web server on an ephemeral port stands in for the venue API so
//! bearer injection, 401 handling, and error normalisation are exercised
//! over real HTTP.

// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use ego_house::app::{AppContext, StorageKeys};
use ego_house::domain::ports::KeyValueStore;
use ego_house::domain::{
    ApiErrorKind, LoginCredentials, Route, RouteDecision, decide_route,
};
use ego_house::outbound::http::ReqwestTransport;
use ego_house::outbound::storage::MemoryKeyValueStore;
use ego_house::test_support::{MutableClock, fixture_now, unsigned_token};
use rstest::rstest;
use serde_json::{Value, json};
use url::Url;

const TOKEN_KEY: &str = "auth_token";

fn issued_token() -> String {
    unsigned_token(fixture_now().timestamp() + 3600)
}

fn admin_json() -> Value {
    json!({"id": "1", "email": "admin@test.com", "name": "Admin", "role": "ADMIN"})
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .json(json!({"statusCode": 401, "message": message, "error": "Unauthorized"}))
}

fn has_issued_bearer(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", issued_token()))
}

async fn login(body: web::Json<Value>) -> HttpResponse {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email == Some("admin@test.com") && password == Some("admin123") {
        HttpResponse::Created().json(json!({"access_token": issued_token(), "user": admin_json()}))
    } else {
        unauthorized("Invalid credentials")
    }
}

async fn profile(req: HttpRequest) -> HttpResponse {
    if has_issued_bearer(&req) {
        HttpResponse::Ok().json(admin_json())
    } else {
        unauthorized("Unauthorized")
    }
}

async fn revoked() -> HttpResponse {
    unauthorized("Session revoked")
}

async fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden()
        .json(json!({"statusCode": 403, "message": ["admins only", "ask a manager"], "error": "Forbidden"}))
}

async fn slow() -> HttpResponse {
    actix_rt::time::sleep(Duration::from_secs(2)).await;
    HttpResponse::Ok().json(json!({}))
}

struct Backend {
    url: Url,
    handle: ServerHandle,
}

fn start_backend() -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(|| {
        App::new()
            .route("/auth/login", web::post().to(login))
            .route("/auth/profile", web::get().to(profile))
            .route("/orders/stats", web::get().to(revoked))
            .route("/catalog/category", web::post().to(forbidden))
            .route("/slow", web::get().to(slow))
    })
    .workers(1)
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let handle = server.handle();
    actix_rt::spawn(server);
    Backend {
        url: Url::parse(&format!("http://{addr}")).expect("server url"),
        handle,
    }
}

struct Client {
    storage: Arc<MemoryKeyValueStore>,
    app: AppContext,
}

fn client_for(url: Url, timeout: Duration) -> Client {
    let storage = Arc::new(MemoryKeyValueStore::default());
    let transport = ReqwestTransport::new(url, timeout).expect("reqwest client");
    let app = AppContext::assemble(
        storage.clone(),
        Arc::new(transport),
        Arc::new(MutableClock::new(fixture_now())),
        StorageKeys {
            token: TOKEN_KEY,
            session: "auth-storage",
        },
    );
    app.start();
    Client { storage, app }
}

async fn log_in(client: &Client) {
    let credentials =
        LoginCredentials::try_from_parts("admin@test.com", "admin123").expect("valid credentials");
    client.app.auth().login(&credentials).await.expect("login succeeds");
}

#[rstest]
#[actix_rt::test]
async fn login_then_profile_uses_the_issued_bearer() {
    let backend = start_backend();
    let client = client_for(backend.url.clone(), Duration::from_secs(5));

    log_in(&client).await;
    let user = client.app.auth().get_profile().await.expect("profile loads");

    assert_eq!(user.display_name(), "Admin");
    assert!(client.app.auth().is_authenticated());
    assert_eq!(
        client.storage.get(TOKEN_KEY).expect("storage readable"),
        Some(issued_token())
    );
    backend.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn unauthorized_response_forces_logout() {
    let backend = start_backend();
    let client = client_for(backend.url.clone(), Duration::from_secs(5));
    log_in(&client).await;

    let error = client
        .app
        .api()
        .get::<Value>("/orders/stats")
        .await
        .expect_err("revoked session is rejected");

    assert_eq!(error.kind(), ApiErrorKind::Unauthenticated);
    assert_eq!(error.message(), "Session revoked");
    let snapshot = client.app.session().snapshot();
    assert!(!snapshot.is_authenticated());
    assert_eq!(decide_route(&snapshot, Route::AdminOrders), RouteDecision::RedirectToLogin);
    assert_eq!(client.storage.get(TOKEN_KEY).expect("storage readable"), None);
    backend.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn forbidden_keeps_the_session_and_joins_messages() {
    let backend = start_backend();
    let client = client_for(backend.url.clone(), Duration::from_secs(5));
    log_in(&client).await;

    let error = client
        .app
        .api()
        .post::<Value, _>("/catalog/category", &json!({"name": "x"}))
        .await
        .expect_err("backend forbids the write");

    assert_eq!(error.kind(), ApiErrorKind::Forbidden);
    assert_eq!(error.message(), "admins only, ask a manager");
    assert!(client.app.session().is_authenticated());
    backend.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn rejected_credentials_are_recorded_on_the_session() {
    let backend = start_backend();
    let client = client_for(backend.url.clone(), Duration::from_secs(5));
    let credentials =
        LoginCredentials::try_from_parts("admin@test.com", "wrong").expect("valid input");

    let error = client
        .app
        .auth()
        .login(&credentials)
        .await
        .expect_err("bad password");

    assert_eq!(error.status_code(), 401);
    let snapshot = client.app.session().snapshot();
    assert!(!snapshot.is_authenticated());
    assert!(!snapshot.is_loading());
    assert_eq!(snapshot.error(), Some("Invalid credentials"));
    backend.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn slow_backend_times_out_as_a_connection_error() {
    let backend = start_backend();
    let client = client_for(backend.url.clone(), Duration::from_millis(200));

    let error = client
        .app
        .api()
        .get::<Value>("/slow")
        .await
        .expect_err("request times out");

    assert_eq!(error.kind(), ApiErrorKind::Transport);
    assert_eq!((error.status_code(), error.message()), (500, "connection error"));
    backend.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn unreachable_backend_is_a_connection_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
        listener.local_addr().expect("probe addr")
    };
    let url = Url::parse(&format!("http://{addr}")).expect("url");
    let client = client_for(url, Duration::from_secs(2));

    let error = client
        .app
        .api()
        .get::<Value>("/catalog")
        .await
        .expect_err("nothing is listening");

    assert_eq!(error.kind(), ApiErrorKind::Transport);
    assert_eq!(error.status_code(), 500);
}
