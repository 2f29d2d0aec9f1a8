use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{add_rule, app, reset, Db, RuleSpec};
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

fn rule(method: Option<&str>, path: &str, status: u16, body: &str) -> RuleSpec {
    RuleSpec {
        method: method.map(str::to_string),
        path: path.to_string(),
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("host", "localhost:8080")
        .body(String::new())
        .unwrap()
}

// --- replies ---

#[tokio::test]
async fn replies_with_configured_status_and_body() {
    let db = Db::default();
    add_rule(&db, rule(Some("GET"), "/widget", 200, "hello world"));

    let resp = app(db).oneshot(get("/widget")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "hello world");
}

#[tokio::test]
async fn replies_with_error_status() {
    let db = Db::default();
    add_rule(&db, rule(Some("GET"), "/missing", 404, r#"{"error":"not found"}"#));

    let resp = app(db).oneshot(get("/missing")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn replies_with_configured_headers() {
    let db = Db::default();
    let mut spec = rule(None, "/typed", 200, "{}");
    spec.headers = vec![("content-type".to_string(), "application/json".to_string())];
    add_rule(&db, spec);

    let resp = app(db).oneshot(get("/typed")).await.unwrap();

    assert_eq!(resp.headers()["content-type"], "application/json");
}

#[tokio::test]
async fn empty_body_reply() {
    let db = Db::default();
    add_rule(&db, rule(Some("GET"), "/empty", 204, ""));

    let resp = app(db).oneshot(get("/empty")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

// --- matching ---

#[tokio::test]
async fn unmatched_request_returns_503() {
    let db = Db::default();
    add_rule(&db, rule(Some("GET"), "/widget", 200, "ok"));

    let resp = app(db).oneshot(get("/other")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_text(resp).await.contains("GET /other"));
}

#[tokio::test]
async fn method_mismatch_is_unmatched() {
    let db = Db::default();
    add_rule(&db, rule(Some("POST"), "/widget", 201, "created"));

    let resp = app(db).oneshot(get("/widget")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn latest_rule_wins() {
    let db = Db::default();
    add_rule(&db, rule(None, "/widget", 200, "first"));
    add_rule(&db, rule(None, "/widget", 200, "second"));

    let resp = app(db).oneshot(get("/widget")).await.unwrap();

    assert_eq!(body_text(resp).await, "second");
}

#[tokio::test]
async fn query_string_does_not_affect_matching() {
    let db = Db::default();
    let endpoint = add_rule(&db, rule(Some("GET"), "/search", 200, "[]"));

    let resp = app(db).oneshot(get("/search?q=rust")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let seen = endpoint.seen_requests();
    assert_eq!(seen[0].path, "/search");
    assert_eq!(seen[0].url, "http://localhost:8080/search?q=rust");
}

// --- recording ---

#[tokio::test]
async fn records_seen_requests() {
    let db = Db::default();
    let endpoint = add_rule(&db, rule(None, "/echo", 200, ""));

    let req = Request::builder()
        .method("POST")
        .uri("/echo")
        .header("host", "localhost:8080")
        .header("content-type", "application/json")
        .body(r#"{"title":"Walk dog"}"#.to_string())
        .unwrap();
    app(db).oneshot(req).await.unwrap();

    let seen = endpoint.seen_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].url, "http://localhost:8080/echo");
    assert_eq!(seen[0].header("Content-Type"), Some("application/json"));
    assert_eq!(seen[0].body, r#"{"title":"Walk dog"}"#);
}

#[tokio::test]
async fn reset_drops_rules_and_history() {
    use tower::Service;

    let db = Db::default();
    let endpoint = add_rule(&db, rule(Some("GET"), "/widget", 200, "ok"));
    let mut svc = app(db.clone()).into_service();

    let resp = ServiceExt::ready(&mut svc)
        .await
        .unwrap()
        .call(get("/widget"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(endpoint.seen_requests().len(), 1);

    reset(&db);
    assert!(endpoint.seen_requests().is_empty());

    let resp = ServiceExt::ready(&mut svc)
        .await
        .unwrap()
        .call(get("/widget"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
