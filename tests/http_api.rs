//! Endpoint behaviour over an in-process router.

use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{write_file, TestService, SCENARIO_CSV};

#[tokio::test]
async fn test_scenario_first_row_wins() {
    let svc = TestService::start(SCENARIO_CSV);

    let (status, body) = svc.get("/lookup?email=a@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"email": "a@example.com", "loginLink": "http://x/1"}));

    let (status, _) = svc.get("/lookup?email=missing@x.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = svc.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["loaded"], 1);
    assert_eq!(
        body["csvPath"],
        svc.path("data/links.csv").display().to_string()
    );
}

#[tokio::test]
async fn test_get_lookup_echoes_trimmed_original_case() {
    let svc = TestService::start(SCENARIO_CSV);
    let (status, body) = svc.get("/lookup?email=%20A@EXAMPLE.com%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "A@EXAMPLE.com");
    assert_eq!(body["loginLink"], "http://x/1");
}

#[tokio::test]
async fn test_get_lookup_requires_email() {
    let svc = TestService::start(SCENARIO_CSV);

    for uri in ["/lookup", "/lookup?email=", "/lookup?email=%20%20"] {
        let (status, body) = svc.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "email is required");
    }
}

#[tokio::test]
async fn test_get_lookup_bad_query_is_json_error() {
    let svc = TestService::start(SCENARIO_CSV);

    let (status, body) = svc.get("/lookup?email=a@example.com&email=b@example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("invalid query string"), "{message}");
}

#[tokio::test]
async fn test_post_lookup_without_auth() {
    let svc = TestService::start(SCENARIO_CSV);

    let (status, body) = svc.post("/lookup", r#"{"email":"A@example.COM"}"#, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loginLink"], "http://x/1");

    let (status, _) = svc.post("/lookup", r#"{"email":""}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = svc.post("/lookup", "", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = svc.post("/lookup", "{not json", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = svc.post("/lookup", r#"{"email":"nobody@x.com"}"#, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_guards_post_routes_only() {
    let svc = TestService::start_with(SCENARIO_CSV, |c| c.auth.api_key = "s3cret".into());

    let (status, body) = svc.post("/lookup", r#"{"email":"a@example.com"}"#, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = svc.post("/lookup", r#"{"email":"a@example.com"}"#, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = svc.post("/reload", "{}", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = svc.post("/lookup", r#"{"email":"a@example.com"}"#, Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = svc.post("/reload", "", Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);

    // GET routes stay open.
    let (status, _) = svc.get("/lookup?email=a@example.com").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = svc.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_auth_rejects_before_validation() {
    let svc = TestService::start_with(SCENARIO_CSV, |c| c.auth.api_key = "s3cret".into());
    let (status, _) = svc.post("/lookup", "{not json", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reload_default_and_relative_paths() {
    let svc = TestService::start(SCENARIO_CSV);
    write_file(
        svc.dir.path(),
        "other.csv",
        "Email,Login Link\nb@x.com,http://x/b\nc@x.com,http://x/c\nB@X.com,http://x/dup\n,http://x/none\n",
    );

    let (status, body) = svc.post("/reload", r#"{"path":"other.csv"}"#, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reloaded"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["path"], svc.path("other.csv").display().to_string());
    assert_eq!(body["duplicatesDropped"], 1);
    assert_eq!(body["rowsSkipped"], 1);

    let (_, body) = svc.get("/lookup?email=b@x.com").await;
    assert_eq!(body["loginLink"], "http://x/b");
    let (status, _) = svc.get("/lookup?email=a@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No path goes back to the configured default.
    let (status, body) = svc.post("/reload", "", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["path"], svc.path("data/links.csv").display().to_string());

    let (_, health) = svc.get("/health").await;
    assert_eq!(health["generation"], 3);
}

#[tokio::test]
async fn test_bad_reload_leaves_health_unchanged() {
    let svc = TestService::start(SCENARIO_CSV);
    let (_, before) = svc.get("/health").await;

    let (status, body) = svc.post("/reload", r#"{"path":"does/not/exist.csv"}"#, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("source not found"));

    let (_, after) = svc.get("/health").await;
    assert_eq!(after["loaded"], before["loaded"]);
    assert_eq!(after["csvPath"], before["csvPath"]);
    assert_eq!(after["generation"], before["generation"]);

    let (status, body) = svc.get("/lookup?email=a@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loginLink"], "http://x/1");
}

#[tokio::test]
async fn test_reload_missing_column_is_server_error() {
    let svc = TestService::start(SCENARIO_CSV);
    write_file(svc.dir.path(), "wrong.csv", "Mail,Link\na@x.com,http://x\n");

    let (status, body) = svc.post("/reload", r#"{"path":"wrong.csv"}"#, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("\"Email\""));
    assert_eq!(svc.reloader.store().snapshot().generation, 1);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let svc = TestService::start(SCENARIO_CSV);

    let res = svc
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(res.headers().get("x-request-id").is_some());

    let res = svc
        .router
        .clone()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "client-id-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "client-id-1");
}
