use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use snowgate::blob::BlobStore;
use snowgate::config::Config;
use snowgate::db::PortalStorage;
use snowgate::router::{snowgate_router, SnowgateState};

const DEVICE_KEY: &str = "test-device-key";

struct TestServer {
    app: Router,
    records: PortalStorage,
    db_path: PathBuf,
    upload_dir: PathBuf,
}

impl TestServer {
    fn cleanup(self) {
        let _ = fs::remove_file(&self.db_path);
        let _ = fs::remove_dir_all(&self.upload_dir);
    }
}

async fn setup(tag: &str) -> TestServer {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "snowgate-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));
    let mut upload_dir = std::env::temp_dir();
    upload_dir.push(format!(
        "snowgate-uploads-{}-{}-{}",
        tag,
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let pool = snowgate::db::connect(&database_url)
        .await
        .expect("db connect failed");
    let records = PortalStorage::new(pool);
    records.init_schema().await.expect("schema init failed");
    let blobs = BlobStore::open(&upload_dir).expect("blob root creation failed");

    let state = SnowgateState::new(
        records.clone(),
        blobs,
        Arc::from(DEVICE_KEY),
        Config::default().cookie_key(),
    );
    TestServer {
        app: snowgate_router(state),
        records,
        db_path,
        upload_dir,
    }
}

async fn add_operator(server: &TestServer, username: &str, password: &str) {
    let hash = snowgate::auth::password::hash_password(password).expect("hashing failed");
    server
        .records
        .insert_operator(username, &hash)
        .await
        .expect("operator insert failed");
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .expect("failed to build request")
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

#[tokio::test]
async fn login_with_valid_credentials_establishes_a_session() {
    let server = setup("login-ok").await;
    add_operator(&server, "admin", "pw123456").await;

    let resp = server
        .app
        .clone()
        .oneshot(login_request("admin", "pw123456"))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).expect("no redirect"),
        "/dashboard"
    );
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("no session cookie set")
        .to_str()
        .expect("cookie was not ascii");
    assert!(cookie.starts_with("snowgate_session="));
    assert!(cookie.contains("HttpOnly"));

    server.cleanup();
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let server = setup("login-fail").await;
    add_operator(&server, "admin", "pw123456").await;

    let wrong_pw = server
        .app
        .clone()
        .oneshot(login_request("admin", "nope"))
        .await
        .expect("request failed");
    let unknown_user = server
        .app
        .clone()
        .oneshot(login_request("ghost", "nope"))
        .await
        .expect("request failed");

    assert_eq!(wrong_pw.status(), StatusCode::OK);
    assert_eq!(unknown_user.status(), StatusCode::OK);
    assert!(wrong_pw.headers().get(header::SET_COOKIE).is_none());
    assert!(unknown_user.headers().get(header::SET_COOKIE).is_none());

    let wrong_pw_body = body_string(wrong_pw).await;
    let unknown_user_body = body_string(unknown_user).await;
    assert!(wrong_pw_body.contains("Invalid username or password"));
    assert_eq!(
        wrong_pw_body, unknown_user_body,
        "failure pages must not distinguish the cause"
    );

    server.cleanup();
}

#[tokio::test]
async fn page_routes_redirect_anonymous_visitors_to_login() {
    let server = setup("page-anon").await;

    for uri in ["/", "/dashboard"] {
        let resp = server
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("failed to build request"),
            )
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "no redirect for {}", uri);
        assert_eq!(
            resp.headers().get(header::LOCATION).expect("no redirect"),
            "/login"
        );
    }

    server.cleanup();
}

#[tokio::test]
async fn dashboard_shows_the_first_unlabeled_image() {
    let server = setup("dashboard").await;
    add_operator(&server, "admin", "pw123456").await;

    server
        .records
        .insert_image("a.jpg", "cam1", Utc::now())
        .await
        .expect("insert failed");

    let login_resp = server
        .app
        .clone()
        .oneshot(login_request("admin", "pw123456"))
        .await
        .expect("request failed");
    let cookie = login_resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("no session cookie set")
        .to_str()
        .expect("cookie was not ascii")
        .split(';')
        .next()
        .expect("empty cookie header")
        .to_string();

    let resp = server
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_string(resp).await;
    assert!(body.contains("Labeling Dashboard"));
    assert!(body.contains("/uploads/a.jpg"));

    server.cleanup();
}

#[tokio::test]
async fn logout_expires_the_session_cookie() {
    let server = setup("logout").await;

    let resp = server
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/logout")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).expect("no redirect"),
        "/login"
    );
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout set no removal cookie")
        .to_str()
        .expect("cookie was not ascii");
    assert!(cookie.starts_with("snowgate_session="));
    assert!(cookie.contains("Max-Age=0"), "cookie was not expired: {}", cookie);

    server.cleanup();
}

#[tokio::test]
async fn login_page_redirects_an_active_session_to_the_dashboard() {
    let server = setup("login-redirect").await;
    add_operator(&server, "admin", "pw123456").await;

    let login_resp = server
        .app
        .clone()
        .oneshot(login_request("admin", "pw123456"))
        .await
        .expect("request failed");
    let cookie = login_resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("no session cookie set")
        .to_str()
        .expect("cookie was not ascii")
        .split(';')
        .next()
        .expect("empty cookie header")
        .to_string();

    let resp = server
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).expect("no redirect"),
        "/dashboard"
    );

    server.cleanup();
}
